use crate::decode::{decode_via_scale, DecodeMetadata};
use crate::storage::{StorageEntryModifier, StorageInfo, StorageShape};
use crate::{
    CallIndex, ConstantInfo, Error, EventId, ExtrinsicInfo, ModuleMetadataExt, Result,
    StorageHasher, StorageMetadataExt,
};
use parity_scale_codec::{Decode, Input};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataV13 {
    pub modules: Vec<ModuleMetadata>,
    pub extrinsics: ExtrinsicMetadata,
}

impl MetadataV13 {
    fn module(&self, name: &str) -> Result<&ModuleMetadata> {
        self.modules
            .iter()
            .find(|module| module.name == name)
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))
    }
    fn module_by_index(&self, index: u8) -> Result<&ModuleMetadata> {
        self.modules
            .iter()
            .find(|module| module.index == index)
            .ok_or(Error::ModuleIndexNotFound(index))
    }
}

impl DecodeMetadata for MetadataV13 {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        let modules = Vec::<ModuleMetadata>::decode_metadata(input)?;
        debug!("decoded {} modules of metadata V13", modules.len());

        Ok(MetadataV13 {
            modules,
            extrinsics: ExtrinsicMetadata::decode_metadata(input)?,
        })
    }
}

/// A module of the runtime. Storage, calls and events are each preceded by
/// a presence flag on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub storage: Option<StorageMetadata>,
    pub calls: Option<Vec<FunctionMetadata>>,
    pub events: Option<Vec<EventMetadata>>,
    pub constants: Vec<ModuleConstantMetadata>,
    pub errors: Vec<ErrorMetadata>,
    pub index: u8,
}

impl DecodeMetadata for ModuleMetadata {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(ModuleMetadata {
            name: Decode::decode(input)?,
            storage: DecodeMetadata::decode_metadata(input)?,
            calls: DecodeMetadata::decode_metadata(input)?,
            events: DecodeMetadata::decode_metadata(input)?,
            constants: DecodeMetadata::decode_metadata(input)?,
            errors: DecodeMetadata::decode_metadata(input)?,
            index: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageMetadata {
    pub prefix: String,
    pub entries: Vec<StorageEntryMetadata>,
}

impl DecodeMetadata for StorageMetadata {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(StorageMetadata {
            prefix: Decode::decode(input)?,
            entries: DecodeMetadata::decode_metadata(input)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageEntryMetadata {
    pub name: String,
    pub modifier: StorageEntryModifier,
    pub ty: StorageEntryType,
    pub default: Vec<u8>,
    pub documentation: Vec<String>,
}

impl StorageEntryMetadata {
    fn to_storage_info<'a>(&'a self, module_name: &'a str, prefix: &'a str) -> StorageInfo<'a> {
        StorageInfo {
            module_name,
            prefix,
            entry_name: self.name.as_str(),
            modifier: self.modifier,
            ty: StorageShape::Legacy(&self.ty),
            default: self.default.as_slice(),
            documentation: self.documentation.as_slice(),
        }
    }
}

impl DecodeMetadata for StorageEntryMetadata {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(StorageEntryMetadata {
            name: Decode::decode(input)?,
            modifier: StorageEntryModifier::decode_metadata(input)?,
            ty: StorageEntryType::decode_metadata(input)?,
            default: Decode::decode(input)?,
            documentation: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StorageEntryType {
    Plain(String),
    Map {
        hasher: StorageHasher,
        key: String,
        value: String,
        unused: bool,
    },
    DoubleMap {
        hasher: StorageHasher,
        key1: String,
        key2: String,
        value: String,
        key2_hasher: StorageHasher,
    },
    NMap {
        keys: Vec<String>,
        hashers: Vec<StorageHasher>,
        value: String,
    },
}

impl StorageEntryType {
    /// Plain values fall back to `Twox128`, the hasher used for storage
    /// prefixes. Maps return exactly the hashers they declare.
    pub fn hashers(&self) -> Vec<StorageHasher> {
        match self {
            StorageEntryType::Plain(_) => vec![StorageHasher::Twox128],
            StorageEntryType::Map { hasher, .. } => vec![*hasher],
            StorageEntryType::DoubleMap {
                hasher,
                key2_hasher,
                ..
            } => vec![*hasher, *key2_hasher],
            StorageEntryType::NMap { hashers, .. } => hashers.clone(),
        }
    }
    pub fn key_count(&self) -> usize {
        match self {
            StorageEntryType::Plain(_) => 0,
            StorageEntryType::Map { .. } => 1,
            StorageEntryType::DoubleMap { .. } => 2,
            StorageEntryType::NMap { hashers, .. } => hashers.len(),
        }
    }
}

impl DecodeMetadata for StorageEntryType {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(match input.read_byte()? {
            0 => StorageEntryType::Plain(Decode::decode(input)?),
            1 => StorageEntryType::Map {
                hasher: StorageHasher::decode_metadata(input)?,
                key: Decode::decode(input)?,
                value: Decode::decode(input)?,
                unused: Decode::decode(input)?,
            },
            2 => StorageEntryType::DoubleMap {
                hasher: StorageHasher::decode_metadata(input)?,
                key1: Decode::decode(input)?,
                key2: Decode::decode(input)?,
                value: Decode::decode(input)?,
                key2_hasher: StorageHasher::decode_metadata(input)?,
            },
            3 => StorageEntryType::NMap {
                keys: Decode::decode(input)?,
                hashers: DecodeMetadata::decode_metadata(input)?,
                value: Decode::decode(input)?,
            },
            tag => {
                return Err(Error::UnknownTag {
                    ty: "StorageEntryType",
                    tag,
                })
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct FunctionMetadata {
    pub name: String,
    pub arguments: Vec<FunctionArgumentMetadata>,
    pub documentation: Vec<String>,
}

impl FunctionMetadata {
    pub fn to_extrinsic_info<'a>(
        &'a self,
        call_index: CallIndex,
        module_name: &'a str,
    ) -> ExtrinsicInfo<'a> {
        ExtrinsicInfo {
            call_index,
            module_name,
            extrinsic_name: self.name.as_str(),
            args: self
                .arguments
                .iter()
                .map(|arg_meta| (arg_meta.name.as_str(), Cow::Borrowed(arg_meta.ty.as_str())))
                .collect(),
            documentation: self.documentation.iter().map(|s| s.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct FunctionArgumentMetadata {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct EventMetadata {
    pub name: String,
    pub arguments: Vec<String>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct ModuleConstantMetadata {
    pub name: String,
    pub ty: String,
    pub value: Vec<u8>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct ErrorMetadata {
    pub name: String,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct ExtrinsicMetadata {
    pub version: u8,
    pub signed_extensions: Vec<String>,
}

decode_via_scale!(
    FunctionMetadata,
    EventMetadata,
    ModuleConstantMetadata,
    ErrorMetadata,
    ExtrinsicMetadata,
);

impl ModuleMetadataExt for MetadataV13 {
    fn modules_extrinsics<'a>(&'a self) -> Vec<ExtrinsicInfo<'a>> {
        self.modules
            .iter()
            .flat_map(|mod_meta| {
                mod_meta
                    .calls
                    .iter()
                    .flatten()
                    .enumerate()
                    .map(move |(dispatch_id, func_meta)| {
                        func_meta.to_extrinsic_info(
                            CallIndex::new(mod_meta.index, dispatch_id as u8),
                            mod_meta.name.as_str(),
                        )
                    })
            })
            .collect()
    }
    // Legacy calls are identified by their position within the module.
    fn find_call_index(&self, module: &str, call: &str) -> Result<CallIndex> {
        let mod_meta = self.module(module)?;
        let calls = mod_meta
            .calls
            .as_ref()
            .ok_or_else(|| Error::NoCalls(module.to_string()))?;

        calls
            .iter()
            .position(|func_meta| func_meta.name == call)
            .map(|dispatch_id| CallIndex::new(mod_meta.index, dispatch_id as u8))
            .ok_or_else(|| Error::CallNotFound {
                module: module.to_string(),
                call: call.to_string(),
            })
    }
    fn find_call_names(&self, index: CallIndex) -> Result<(&str, &str)> {
        let mod_meta = self.module_by_index(index.module_index)?;
        let calls = mod_meta
            .calls
            .as_ref()
            .ok_or_else(|| Error::NoCalls(mod_meta.name.clone()))?;

        calls
            .get(index.call_index as usize)
            .map(|func_meta| (mod_meta.name.as_str(), func_meta.name.as_str()))
            .ok_or_else(|| Error::CallIndexNotFound {
                module: mod_meta.name.clone(),
                index: index.call_index,
            })
    }
    fn find_event_names(&self, event: EventId) -> Result<(&str, &str)> {
        let mod_meta = self.module_by_index(event.module_index)?;
        let events = mod_meta
            .events
            .as_ref()
            .ok_or_else(|| Error::NoEvents(mod_meta.name.clone()))?;

        events
            .get(event.event_index as usize)
            .map(|event_meta| (mod_meta.name.as_str(), event_meta.name.as_str()))
            .ok_or_else(|| Error::EventNotFound {
                module: mod_meta.name.clone(),
                index: event.event_index,
            })
    }
    fn exists_module(&self, module: &str) -> bool {
        self.modules.iter().any(|mod_meta| mod_meta.name == module)
    }
    fn get_constant<'a>(&'a self, module: &str, constant: &str) -> Result<ConstantInfo<'a>> {
        let mod_meta = self.module(module)?;

        mod_meta
            .constants
            .iter()
            .find(|const_meta| const_meta.name == constant)
            .map(|const_meta| ConstantInfo {
                module_name: mod_meta.name.as_str(),
                name: const_meta.name.as_str(),
                ty: Cow::Borrowed(const_meta.ty.as_str()),
                value: const_meta.value.as_slice(),
                documentation: const_meta.documentation.as_slice(),
            })
            .ok_or_else(|| Error::ConstantNotFound {
                module: module.to_string(),
                constant: constant.to_string(),
            })
    }
}

impl StorageMetadataExt for MetadataV13 {
    fn storage_entries<'a>(&'a self) -> Vec<StorageInfo<'a>> {
        self.modules
            .iter()
            .flat_map(|module| {
                module.storage.iter().flat_map(move |storage| {
                    storage
                        .entries
                        .iter()
                        .map(move |entry| entry.to_storage_info(&module.name, &storage.prefix))
                })
            })
            .collect()
    }
    fn find_storage_entry<'a>(&'a self, module: &str, name: &str) -> Result<StorageInfo<'a>> {
        let mod_meta = self.module(module)?;
        let storage = mod_meta
            .storage
            .as_ref()
            .ok_or_else(|| Error::NoStorage(module.to_string()))?;

        storage
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.to_storage_info(&mod_meta.name, &storage.prefix))
            .ok_or_else(|| Error::StorageNotFound {
                module: module.to_string(),
                entry: name.to_string(),
            })
    }
}
