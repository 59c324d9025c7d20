use crate::decode::{decode_via_scale, DecodeMetadata};
use crate::registry::{Field, PortableRegistry, TypeId};
use crate::storage::{StorageEntryModifier, StorageInfo, StorageShape};
use crate::{
    CallIndex, ConstantInfo, Error, EventId, ExtrinsicInfo, ModuleMetadataExt, Result,
    StorageHasher, StorageMetadataExt,
};
use parity_scale_codec::{Decode, Input};
use std::borrow::Cow;

/// Metadata V14. Pallets no longer embed their call, event and error
/// definitions but point into the portable type registry.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataV14 {
    pub types: PortableRegistry,
    pub pallets: Vec<PalletMetadata>,
    pub extrinsic: ExtrinsicMetadata,
    /// The type of the runtime itself.
    pub ty: TypeId,
}

impl MetadataV14 {
    fn pallet(&self, name: &str) -> Result<&PalletMetadata> {
        self.pallets
            .iter()
            .find(|pallet| pallet.name == name)
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))
    }
    // Pallet indices are a single byte on the wire, matching the first byte
    // of call indices and event ids.
    fn pallet_by_index(&self, index: u8) -> Result<&PalletMetadata> {
        self.pallets
            .iter()
            .find(|pallet| pallet.index == index)
            .ok_or(Error::ModuleIndexNotFound(index))
    }
    /// Render the fields of a call as (name, type name) pairs. The type name
    /// annotation is preferred, the registry is consulted when it is absent
    /// or empty.
    fn render_fields<'a>(&'a self, fields: &'a [Field]) -> Vec<(&'a str, Cow<'a, str>)> {
        fields
            .iter()
            .map(|field| {
                let ty = match field.type_name.as_deref() {
                    Some(type_name) if !type_name.is_empty() => Cow::Borrowed(type_name),
                    _ => Cow::Owned(
                        self.types
                            .type_name(field.ty)
                            .unwrap_or_else(|_| format!("<{}>", field.ty)),
                    ),
                };

                (field.name.as_deref().unwrap_or_default(), ty)
            })
            .collect()
    }
}

impl DecodeMetadata for MetadataV14 {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        // The registry is complete before any pallet refers into it.
        let types = PortableRegistry::decode_metadata(input)?;
        let pallets = Vec::<PalletMetadata>::decode_metadata(input)?;
        debug!("decoded {} pallets of metadata V14", pallets.len());

        Ok(MetadataV14 {
            types,
            pallets,
            extrinsic: ExtrinsicMetadata::decode_metadata(input)?,
            ty: TypeId::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PalletMetadata {
    pub name: String,
    pub storage: Option<PalletStorageMetadata>,
    pub calls: Option<PalletCallMetadata>,
    pub event: Option<PalletEventMetadata>,
    pub constants: Vec<PalletConstantMetadata>,
    pub error: Option<PalletErrorMetadata>,
    pub index: u8,
}

impl DecodeMetadata for PalletMetadata {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(PalletMetadata {
            name: Decode::decode(input)?,
            storage: DecodeMetadata::decode_metadata(input)?,
            calls: DecodeMetadata::decode_metadata(input)?,
            event: DecodeMetadata::decode_metadata(input)?,
            constants: DecodeMetadata::decode_metadata(input)?,
            error: DecodeMetadata::decode_metadata(input)?,
            index: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PalletStorageMetadata {
    pub prefix: String,
    pub entries: Vec<StorageEntryMetadata>,
}

impl DecodeMetadata for PalletStorageMetadata {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(PalletStorageMetadata {
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
    pub docs: Vec<String>,
}

impl StorageEntryMetadata {
    fn to_storage_info<'a>(&'a self, module_name: &'a str, prefix: &'a str) -> StorageInfo<'a> {
        StorageInfo {
            module_name,
            prefix,
            entry_name: self.name.as_str(),
            modifier: self.modifier,
            ty: StorageShape::Registry(&self.ty),
            default: self.default.as_slice(),
            documentation: self.docs.as_slice(),
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
            docs: Decode::decode(input)?,
        })
    }
}

/// Maps carry one hasher per key, whatever the number of keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StorageEntryType {
    Plain(TypeId),
    Map {
        hashers: Vec<StorageHasher>,
        key: TypeId,
        value: TypeId,
    },
}

impl StorageEntryType {
    pub fn hashers(&self) -> Vec<StorageHasher> {
        match self {
            StorageEntryType::Plain(_) => vec![],
            StorageEntryType::Map { hashers, .. } => hashers.clone(),
        }
    }
    pub fn key_count(&self) -> usize {
        match self {
            StorageEntryType::Plain(_) => 0,
            StorageEntryType::Map { hashers, .. } => hashers.len(),
        }
    }
}

impl DecodeMetadata for StorageEntryType {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(match input.read_byte()? {
            0 => StorageEntryType::Plain(TypeId::decode(input)?),
            1 => StorageEntryType::Map {
                hashers: DecodeMetadata::decode_metadata(input)?,
                key: TypeId::decode(input)?,
                value: TypeId::decode(input)?,
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
pub struct PalletCallMetadata {
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct PalletEventMetadata {
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct PalletErrorMetadata {
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct PalletConstantMetadata {
    pub name: String,
    pub ty: TypeId,
    pub value: Vec<u8>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct ExtrinsicMetadata {
    pub ty: TypeId,
    pub version: u8,
    pub signed_extensions: Vec<SignedExtensionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct SignedExtensionMetadata {
    pub identifier: String,
    pub ty: TypeId,
    pub additional_signed: TypeId,
}

decode_via_scale!(
    PalletCallMetadata,
    PalletEventMetadata,
    PalletErrorMetadata,
    PalletConstantMetadata,
    ExtrinsicMetadata,
);

impl ModuleMetadataExt for MetadataV14 {
    fn modules_extrinsics<'a>(&'a self) -> Vec<ExtrinsicInfo<'a>> {
        let mut extrinsics = vec![];

        for pallet in &self.pallets {
            let calls = match pallet
                .calls
                .as_ref()
                .map(|calls| self.types.resolve_variant(calls.ty))
            {
                Some(Ok(calls)) => calls,
                Some(Err(err)) => {
                    warn!("skipping calls of pallet {}: {}", pallet.name, err);
                    continue;
                }
                None => continue,
            };

            extrinsics.extend(calls.variants.iter().map(|variant| ExtrinsicInfo {
                call_index: CallIndex::new(pallet.index, variant.index),
                module_name: pallet.name.as_str(),
                extrinsic_name: variant.name.as_str(),
                args: self.render_fields(&variant.fields),
                documentation: variant.docs.iter().map(|s| s.as_str()).collect(),
            }));
        }

        extrinsics
    }
    // Pallet -> call type id -> variant arm. The arm's declared index is the
    // call index, not its position.
    fn find_call_index(&self, module: &str, call: &str) -> Result<CallIndex> {
        let pallet = self.pallet(module)?;
        let calls = pallet
            .calls
            .as_ref()
            .ok_or_else(|| Error::NoCalls(module.to_string()))?;

        self.types
            .resolve_variant(calls.ty)?
            .find_by_name(call)
            .map(|variant| CallIndex::new(pallet.index, variant.index))
            .ok_or_else(|| Error::CallNotFound {
                module: module.to_string(),
                call: call.to_string(),
            })
    }
    fn find_call_names(&self, index: CallIndex) -> Result<(&str, &str)> {
        let pallet = self.pallet_by_index(index.module_index)?;
        let calls = pallet
            .calls
            .as_ref()
            .ok_or_else(|| Error::NoCalls(pallet.name.clone()))?;

        self.types
            .resolve_variant(calls.ty)?
            .find_by_index(index.call_index)
            .map(|variant| (pallet.name.as_str(), variant.name.as_str()))
            .ok_or_else(|| Error::CallIndexNotFound {
                module: pallet.name.clone(),
                index: index.call_index,
            })
    }
    fn find_event_names(&self, event: EventId) -> Result<(&str, &str)> {
        let pallet = self.pallet_by_index(event.module_index)?;
        let events = pallet
            .event
            .as_ref()
            .ok_or_else(|| Error::NoEvents(pallet.name.clone()))?;

        self.types
            .resolve_variant(events.ty)?
            .find_by_index(event.event_index)
            .map(|variant| (pallet.name.as_str(), variant.name.as_str()))
            .ok_or_else(|| Error::EventNotFound {
                module: pallet.name.clone(),
                index: event.event_index,
            })
    }
    fn exists_module(&self, module: &str) -> bool {
        self.pallets.iter().any(|pallet| pallet.name == module)
    }
    fn get_constant<'a>(&'a self, module: &str, constant: &str) -> Result<ConstantInfo<'a>> {
        let pallet = self.pallet(module)?;
        let const_meta = pallet
            .constants
            .iter()
            .find(|const_meta| const_meta.name == constant)
            .ok_or_else(|| Error::ConstantNotFound {
                module: module.to_string(),
                constant: constant.to_string(),
            })?;

        Ok(ConstantInfo {
            module_name: pallet.name.as_str(),
            name: const_meta.name.as_str(),
            ty: Cow::Owned(self.types.constant_type_name(const_meta.ty)?),
            value: const_meta.value.as_slice(),
            documentation: const_meta.docs.as_slice(),
        })
    }
}

impl StorageMetadataExt for MetadataV14 {
    fn storage_entries<'a>(&'a self) -> Vec<StorageInfo<'a>> {
        self.pallets
            .iter()
            .flat_map(|pallet| {
                pallet.storage.iter().flat_map(move |storage| {
                    storage
                        .entries
                        .iter()
                        .map(move |entry| entry.to_storage_info(&pallet.name, &storage.prefix))
                })
            })
            .collect()
    }
    fn find_storage_entry<'a>(&'a self, module: &str, name: &str) -> Result<StorageInfo<'a>> {
        let pallet = self.pallet(module)?;
        let storage = pallet
            .storage
            .as_ref()
            .ok_or_else(|| Error::NoStorage(module.to_string()))?;

        storage
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.to_storage_info(&pallet.name, &storage.prefix))
            .ok_or_else(|| Error::StorageNotFound {
                module: module.to_string(),
                entry: name.to_string(),
            })
    }
}
