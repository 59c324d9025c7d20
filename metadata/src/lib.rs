//! Utilities to parse and query Substrate runtime metadata, in both the
//! legacy (V13) and the type registry (V14) format.
//!
//! # Example
//!
//! ```no_run
//! use metascope_metadata::*;
//!
//! // Parse runtime metadata
//! let content = std::fs::read_to_string("metadata_polkadot_9110.hex").unwrap();
//! let metadata = parse_hex_metadata(content).unwrap();
//!
//! // Resolve the call index, required when encoding the extrinsic.
//! let call_index = metadata
//!     .find_call_index("Balances", "transfer_keep_alive")
//!     .unwrap();
//!
//! assert_eq!(call_index.to_string(), "0503");
//!
//! // Build the key of an account entry.
//! let entry = metadata.find_storage_entry("System", "Account").unwrap();
//! let key = entry.storage_key(&[[0u8; 32]]).unwrap();
//! println!("{}", key);
//! ```

#[macro_use]
extern crate serde;
#[macro_use]
extern crate parity_scale_codec;
#[macro_use]
extern crate log;

use self::decode::DecodeMetadata;
use self::version::*;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

pub use self::error::Error;
pub use self::hasher::StorageHasher;
pub use self::storage::{StorageEntryModifier, StorageInfo, StorageKey, StorageShape};

pub type Result<T> = std::result::Result<T, Error>;

mod decode;
mod error;
mod hasher;
pub mod registry;
mod storage;
#[cfg(test)]
mod test_utils;
pub mod version;

/// Magic number preceding the metadata, "meta" in plain text.
const META_MAGIC: &[u8; 4] = b"meta";

/// The two byte identifier of a call: the module index followed by the
/// index of the call within that module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct CallIndex {
    pub module_index: u8,
    pub call_index: u8,
}

impl CallIndex {
    pub fn new(module_index: u8, call_index: u8) -> Self {
        CallIndex {
            module_index,
            call_index,
        }
    }
}

/// The two byte identifier of an event, as found in `System.Events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct EventId {
    pub module_index: u8,
    pub event_index: u8,
}

impl EventId {
    pub fn new(module_index: u8, event_index: u8) -> Self {
        EventId {
            module_index,
            event_index,
        }
    }
}

fn parse_index_pair(s: &str) -> Result<(u8, u8)> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    if hex_str.len() != 4 {
        return Err(Error::InvalidIndex(s.to_string()));
    }

    let bytes = hex::decode(hex_str).map_err(|_| Error::InvalidIndex(s.to_string()))?;
    Ok((bytes[0], bytes[1]))
}

impl fmt::Display for CallIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}", self.module_index, self.call_index)
    }
}

impl FromStr for CallIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (module_index, call_index) = parse_index_pair(s)?;
        Ok(CallIndex::new(module_index, call_index))
    }
}

impl serde::Serialize for CallIndex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}", self.module_index, self.event_index)
    }
}

impl FromStr for EventId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (module_index, event_index) = parse_index_pair(s)?;
        Ok(EventId::new(module_index, event_index))
    }
}

impl serde::Serialize for EventId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parameters and other information about an individual extrinsic.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ExtrinsicInfo<'a> {
    /// Required when encoding the final extrinsic.
    pub call_index: CallIndex,
    /// The name of the module.
    pub module_name: &'a str,
    /// The name of the extrinsic.
    pub extrinsic_name: &'a str,
    /// Arguments that must be passed as the extrinsics body. A sequence of
    /// key-value pairs, indicating the name and the type, respectively.
    pub args: Vec<(&'a str, Cow<'a, str>)>,
    /// Documentation of the extrinsic, as provided by the Substrate metadata.
    pub documentation: Vec<&'a str>,
}

/// A module constant and its SCALE encoded value.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ConstantInfo<'a> {
    pub module_name: &'a str,
    pub name: &'a str,
    /// The declared type name for legacy metadata, the name of the resolved
    /// type for registry metadata.
    pub ty: Cow<'a, str>,
    #[serde(serialize_with = "serialize_hex")]
    pub value: &'a [u8],
    pub documentation: &'a [String],
}

fn serialize_hex<T: AsRef<[u8]>, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(value.as_ref())))
}

/// An interface to retrieve information about modules, calls, events and
/// constants on any supported metadata version.
pub trait ModuleMetadataExt {
    fn modules_extrinsics<'a>(&'a self) -> Vec<ExtrinsicInfo<'a>>;
    fn find_call_index(&self, module: &str, call: &str) -> Result<CallIndex>;
    /// Resolve a call given as `"Module.call"`.
    fn find_call(&self, path: &str) -> Result<CallIndex> {
        match path.split_once('.') {
            Some((module, call)) if !module.is_empty() && !call.is_empty() => {
                self.find_call_index(module, call)
            }
            _ => Err(Error::InvalidCallPath(path.to_string())),
        }
    }
    /// Reverse lookup of a call index into the module and call names.
    fn find_call_names(&self, index: CallIndex) -> Result<(&str, &str)>;
    fn find_event_names(&self, event: EventId) -> Result<(&str, &str)>;
    fn exists_module(&self, module: &str) -> bool;
    fn get_constant<'a>(&'a self, module: &str, constant: &str) -> Result<ConstantInfo<'a>>;
}

/// An interface to retrieve information about storage entries on any
/// supported metadata version.
pub trait StorageMetadataExt {
    fn storage_entries<'a>(&'a self) -> Vec<StorageInfo<'a>>;
    fn find_storage_entry<'a>(&'a self, module: &str, name: &str) -> Result<StorageInfo<'a>>;
}

/// Helper type when dealing with the Json RPC response returned by
/// Substrates `state_getMetadata`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub result: String,
}

/// Convenience function for parsing the Json RPC response returned by Substrates
/// `state_getMetadata`.
///
/// Must fit the [`JsonRpcResponse`] structure.
pub fn parse_jsonrpc_metadata<T: AsRef<[u8]>>(json: T) -> Result<MetadataVersion> {
    let resp = serde_json::from_slice::<JsonRpcResponse>(json.as_ref())?;

    parse_hex_metadata(resp.result.as_bytes())
}

/// Convenience function for parsing the metadata from a HEX representation, as
/// returned by `state_getMetadata`.
pub fn parse_hex_metadata<T: AsRef<[u8]>>(hex: T) -> Result<MetadataVersion> {
    let hex = hex.as_ref().trim_ascii();
    let hex = hex.strip_prefix(b"0x").unwrap_or(hex);

    parse_raw_metadata(hex::decode(hex)?)
}

/// Parse the raw Substrate metadata.
pub fn parse_raw_metadata<T: AsRef<[u8]>>(raw: T) -> Result<MetadataVersion> {
    let raw = raw.as_ref();
    let mut slice = raw.strip_prefix(META_MAGIC).unwrap_or(raw);

    let version = parity_scale_codec::Input::read_byte(&mut slice)?;
    debug!("parsing metadata version {} ({} bytes)", version, raw.len());

    match version {
        13 => Ok(MetadataVersion::V13(MetadataV13::decode_metadata(&mut slice)?)),
        14 => Ok(MetadataVersion::V14(MetadataV14::decode_metadata(&mut slice)?)),
        version => Err(Error::UnsupportedVersion(version)),
    }
}

/// The supported Substrate metadata versions.
#[derive(Debug, Clone, Serialize)]
pub enum MetadataVersion {
    V13(MetadataV13),
    V14(MetadataV14),
}

impl MetadataVersion {
    /// Returns the version number as an integer.
    pub fn version_number(&self) -> u8 {
        match self {
            MetadataVersion::V13(_) => 13,
            MetadataVersion::V14(_) => 14,
        }
    }
    pub fn as_v13(&self) -> Option<&MetadataV13> {
        match self {
            MetadataVersion::V13(data) => Some(data),
            _ => None,
        }
    }
    pub fn as_v14(&self) -> Option<&MetadataV14> {
        match self {
            MetadataVersion::V14(data) => Some(data),
            _ => None,
        }
    }
}

impl ModuleMetadataExt for MetadataVersion {
    fn modules_extrinsics<'a>(&'a self) -> Vec<ExtrinsicInfo<'a>> {
        match self {
            MetadataVersion::V13(m) => m.modules_extrinsics(),
            MetadataVersion::V14(m) => m.modules_extrinsics(),
        }
    }
    fn find_call_index(&self, module: &str, call: &str) -> Result<CallIndex> {
        match self {
            MetadataVersion::V13(m) => m.find_call_index(module, call),
            MetadataVersion::V14(m) => m.find_call_index(module, call),
        }
    }
    fn find_call_names(&self, index: CallIndex) -> Result<(&str, &str)> {
        match self {
            MetadataVersion::V13(m) => m.find_call_names(index),
            MetadataVersion::V14(m) => m.find_call_names(index),
        }
    }
    fn find_event_names(&self, event: EventId) -> Result<(&str, &str)> {
        match self {
            MetadataVersion::V13(m) => m.find_event_names(event),
            MetadataVersion::V14(m) => m.find_event_names(event),
        }
    }
    fn exists_module(&self, module: &str) -> bool {
        match self {
            MetadataVersion::V13(m) => m.exists_module(module),
            MetadataVersion::V14(m) => m.exists_module(module),
        }
    }
    fn get_constant<'a>(&'a self, module: &str, constant: &str) -> Result<ConstantInfo<'a>> {
        match self {
            MetadataVersion::V13(m) => m.get_constant(module, constant),
            MetadataVersion::V14(m) => m.get_constant(module, constant),
        }
    }
}

impl StorageMetadataExt for MetadataVersion {
    fn storage_entries<'a>(&'a self) -> Vec<StorageInfo<'a>> {
        match self {
            MetadataVersion::V13(m) => m.storage_entries(),
            MetadataVersion::V14(m) => m.storage_entries(),
        }
    }
    fn find_storage_entry<'a>(&'a self, module: &str, name: &str) -> Result<StorageInfo<'a>> {
        match self {
            MetadataVersion::V13(m) => m.find_storage_entry(module, name),
            MetadataVersion::V14(m) => m.find_storage_entry(module, name),
        }
    }
}
