//! The seam between the metadata structures and the SCALE primitives.
//!
//! Tagged unions are decoded by hand so that an out-of-range discriminant can
//! be reported together with the offending byte. Everything else is read
//! through `parity-scale-codec`.

use crate::Result;
use parity_scale_codec::{Compact, Decode, Input};

// Upper bound for allocations driven by an untrusted length prefix.
const MAX_PREALLOCATION: usize = 1024;

/// Decode a metadata structure from SCALE encoded input.
pub trait DecodeMetadata: Sized {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self>;
}

impl<T: DecodeMetadata> DecodeMetadata for Vec<T> {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        let Compact(len) = Compact::<u32>::decode(input)?;
        let len = len as usize;

        let mut items = Vec::with_capacity(len.min(MAX_PREALLOCATION));
        for _ in 0..len {
            items.push(T::decode_metadata(input)?);
        }

        Ok(items)
    }
}

impl<T: DecodeMetadata> DecodeMetadata for Option<T> {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        match input.read_byte()? {
            0 => Ok(None),
            1 => Ok(Some(T::decode_metadata(input)?)),
            tag => Err(crate::Error::UnknownTag { ty: "Option", tag }),
        }
    }
}

/// Implements [`DecodeMetadata`] for types that derive the SCALE `Decode`
/// and carry no tagged unions of their own.
macro_rules! decode_via_scale {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::decode::DecodeMetadata for $ty {
                fn decode_metadata<I: ::parity_scale_codec::Input>(
                    input: &mut I,
                ) -> $crate::Result<Self> {
                    <$ty as ::parity_scale_codec::Decode>::decode(input).map_err(Into::into)
                }
            }
        )*
    };
}

pub(crate) use decode_via_scale;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use parity_scale_codec::Encode;

    #[derive(Debug, PartialEq, Decode)]
    struct Leaf(u16);

    decode_via_scale!(Leaf);

    #[test]
    fn decode_vec_of_leaves() {
        let mut raw = Compact(3u32).encode();
        raw.extend(1u16.encode());
        raw.extend(2u16.encode());
        raw.extend(3u16.encode());

        let decoded = Vec::<Leaf>::decode_metadata(&mut raw.as_slice()).unwrap();
        assert_eq!(decoded, vec![Leaf(1), Leaf(2), Leaf(3)]);
    }

    #[test]
    fn decode_option_flag() {
        let decoded = Option::<Leaf>::decode_metadata(&mut [0u8].as_ref()).unwrap();
        assert_eq!(decoded, None);

        let decoded = Option::<Leaf>::decode_metadata(&mut [1u8, 7, 0].as_ref()).unwrap();
        assert_eq!(decoded, Some(Leaf(7)));

        let err = Option::<Leaf>::decode_metadata(&mut [2u8, 7, 0].as_ref()).unwrap_err();
        assert!(matches!(err, Error::UnknownTag { ty: "Option", tag: 2 }));
    }

    #[test]
    fn truncated_vec_is_malformed() {
        // Claims a million entries but carries a single one.
        let mut raw = Compact(1_000_000u32).encode();
        raw.extend(1u16.encode());

        let err = Vec::<Leaf>::decode_metadata(&mut raw.as_slice()).unwrap_err();
        assert!(matches!(err, Error::ParseRawMetadata(_)));
    }
}
