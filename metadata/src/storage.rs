//! Version independent view on storage entries and the construction of
//! storage keys.

use crate::decode::DecodeMetadata;
use crate::version::{v13, v14};
use crate::{Error, Result, StorageHasher};
use parity_scale_codec::Input;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageEntryModifier {
    Optional,
    Default,
    Required,
}

impl DecodeMetadata for StorageEntryModifier {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        match input.read_byte()? {
            0 => Ok(StorageEntryModifier::Optional),
            1 => Ok(StorageEntryModifier::Default),
            2 => Ok(StorageEntryModifier::Required),
            tag => Err(Error::UnknownTag {
                ty: "StorageEntryModifier",
                tag,
            }),
        }
    }
}

/// The shape of a storage entry, as declared by the respective metadata
/// version.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StorageShape<'a> {
    Legacy(&'a v13::StorageEntryType),
    Registry(&'a v14::StorageEntryType),
}

/// Parameters and other information about an individual storage entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageInfo<'a> {
    pub module_name: &'a str,
    /// The storage prefix of the module, hashed into every key.
    pub prefix: &'a str,
    /// The name of the storage entry.
    pub entry_name: &'a str,
    pub modifier: StorageEntryModifier,
    pub ty: StorageShape<'a>,
    /// Value used when the entry is absent from storage.
    pub default: &'a [u8],
    /// Documentation of the storage entry, as provided by the Substrate metadata.
    pub documentation: &'a [String],
}

impl<'a> StorageInfo<'a> {
    /// The hashers to apply to the map keys, in key order.
    pub fn hashers(&self) -> Vec<StorageHasher> {
        match self.ty {
            StorageShape::Legacy(ty) => ty.hashers(),
            StorageShape::Registry(ty) => ty.hashers(),
        }
    }
    /// Number of map keys the entry takes. Zero for plain values.
    pub fn key_count(&self) -> usize {
        match self.ty {
            StorageShape::Legacy(ty) => ty.key_count(),
            StorageShape::Registry(ty) => ty.key_count(),
        }
    }
    pub fn is_plain(&self) -> bool {
        match self.ty {
            StorageShape::Legacy(ty) => matches!(ty, v13::StorageEntryType::Plain(_)),
            StorageShape::Registry(ty) => matches!(ty, v14::StorageEntryType::Plain(_)),
        }
    }
    pub fn is_map(&self) -> bool {
        matches!(self.ty, StorageShape::Legacy(v13::StorageEntryType::Map { .. }))
    }
    pub fn is_double_map(&self) -> bool {
        matches!(
            self.ty,
            StorageShape::Legacy(v13::StorageEntryType::DoubleMap { .. })
        )
    }
    /// Registry maps always count as n-maps, whatever their key count.
    pub fn is_n_map(&self) -> bool {
        matches!(
            self.ty,
            StorageShape::Legacy(v13::StorageEntryType::NMap { .. })
                | StorageShape::Registry(v14::StorageEntryType::Map { .. })
        )
    }
    /// `twox_128(prefix) ++ twox_128(entry_name)`, shared by all keys of
    /// this entry.
    pub fn prefix_key(&self) -> StorageKey {
        let mut key = StorageHasher::Twox128.hash(self.prefix.as_bytes());
        key.extend(StorageHasher::Twox128.hash(self.entry_name.as_bytes()));
        StorageKey(key)
    }
    /// Build the storage key from the SCALE encoded map keys. Fewer keys than
    /// [`key_count`](Self::key_count) yields a partial key, usable for
    /// iterating over a map.
    pub fn storage_key<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<StorageKey> {
        if keys.len() > self.key_count() {
            return Err(Error::TooManyKeys {
                entry: format!("{}.{}", self.module_name, self.entry_name),
                expected: self.key_count(),
                got: keys.len(),
            });
        }

        let mut storage_key = self.prefix_key();
        for (hasher, key) in self.hashers().iter().zip(keys) {
            storage_key.0.extend(hasher.hash(key.as_ref()));
        }

        debug!(
            "storage key for {}.{} with {} key(s): {}",
            self.module_name,
            self.entry_name,
            keys.len(),
            storage_key
        );

        Ok(storage_key)
    }
}

/// A fully built storage key, ready to be queried.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(pub Vec<u8>);

impl StorageKey {
    /// Hex representation with `0x` prefix, as expected by the JSON-RPC API.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl AsRef<[u8]> for StorageKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl serde::Serialize for StorageKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
