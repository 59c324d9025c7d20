use crate::decode::DecodeMetadata;
use crate::{Error, Result};
use parity_scale_codec::Input;
use std::fmt;

/// Hash function applied to the SCALE encoded key of a storage map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StorageHasher {
    Blake2_128,
    Blake2_256,
    Blake2_128Concat,
    Twox128,
    Twox256,
    Twox64Concat,
    Identity,
}

impl StorageHasher {
    /// Select the hasher by its wire tag.
    pub fn from_tag(tag: u8) -> Result<Self> {
        use StorageHasher::*;

        Ok(match tag {
            0 => Blake2_128,
            1 => Blake2_256,
            2 => Blake2_128Concat,
            3 => Twox128,
            4 => Twox256,
            5 => Twox64Concat,
            6 => Identity,
            tag => {
                return Err(Error::UnknownTag {
                    ty: "StorageHasher",
                    tag,
                })
            }
        })
    }
    /// The wire tag of the hasher.
    pub fn tag(&self) -> u8 {
        *self as u8
    }
    /// Hash the encoded key. The `*Concat` variants append the key itself
    /// to the digest, `Identity` returns the key unchanged.
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        use sp_crypto_hashing::{blake2_128, blake2_256, twox_128, twox_256, twox_64};

        match self {
            StorageHasher::Blake2_128 => blake2_128(data).to_vec(),
            StorageHasher::Blake2_256 => blake2_256(data).to_vec(),
            StorageHasher::Blake2_128Concat => [&blake2_128(data)[..], data].concat(),
            StorageHasher::Twox128 => twox_128(data).to_vec(),
            StorageHasher::Twox256 => twox_256(data).to_vec(),
            StorageHasher::Twox64Concat => [&twox_64(data)[..], data].concat(),
            StorageHasher::Identity => data.to_vec(),
        }
    }
    /// Whether the original key can be recovered from the hashed output.
    pub fn is_transparent(&self) -> bool {
        matches!(
            self,
            StorageHasher::Blake2_128Concat | StorageHasher::Twox64Concat | StorageHasher::Identity
        )
    }
}

impl fmt::Display for StorageHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl DecodeMetadata for StorageHasher {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Self::from_tag(input.read_byte()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_wire_order() {
        for tag in 0..=6 {
            assert_eq!(StorageHasher::from_tag(tag).unwrap().tag(), tag);
        }

        let err = StorageHasher::from_tag(7).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownTag {
                ty: "StorageHasher",
                tag: 7
            }
        ));
    }

    #[test]
    fn concat_hashers_append_key() {
        let key = [1u8, 2, 3, 4];

        let hashed = StorageHasher::Blake2_128Concat.hash(&key);
        assert_eq!(hashed.len(), 16 + key.len());
        assert_eq!(&hashed[16..], &key);

        let hashed = StorageHasher::Twox64Concat.hash(&key);
        assert_eq!(hashed.len(), 8 + key.len());
        assert_eq!(&hashed[8..], &key);

        assert_eq!(StorageHasher::Identity.hash(&key), key.to_vec());
    }

    #[test]
    fn opaque_hashers_have_fixed_length() {
        let key = b"some key";

        assert_eq!(StorageHasher::Blake2_128.hash(key).len(), 16);
        assert_eq!(StorageHasher::Blake2_256.hash(key).len(), 32);
        assert_eq!(StorageHasher::Twox128.hash(key).len(), 16);
        assert_eq!(StorageHasher::Twox256.hash(key).len(), 32);
        assert!(!StorageHasher::Twox128.is_transparent());
    }

    #[test]
    fn twox128_of_well_known_prefix() {
        // twox_128("System"), the prefix of every System storage key.
        assert_eq!(
            hex::encode(StorageHasher::Twox128.hash(b"System")),
            "26aa394eea5630e07c48ae0c9558cef7"
        );
    }
}
