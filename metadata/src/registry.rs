//! The portable type registry used from metadata V14 onwards.
//!
//! Every type is stored once under a numeric id. Fields, variant arms and
//! container types refer to other types by that id, so resolving a type
//! usually means hopping through the registry several times.

use crate::decode::{decode_via_scale, DecodeMetadata};
use crate::{Error, Result};
use parity_scale_codec::{Decode, Input};
use std::collections::hash_map::{Entry, HashMap};
use std::fmt;

/// Maximum number of registry hops when resolving a single type. Metadata
/// comes from a network peer, so a cyclic registry must not recurse forever.
pub const MAX_TYPE_DEPTH: usize = 64;

/// Reference to a type in the [`PortableRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode, Serialize)]
#[serde(transparent)]
pub struct TypeId(#[codec(compact)] pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortableRegistry {
    pub types: Vec<PortableType>,
    // Built once while decoding and never touched again.
    #[serde(skip)]
    lookup: HashMap<u32, usize>,
}

impl PortableRegistry {
    pub fn new(types: Vec<PortableType>) -> Self {
        let mut lookup = HashMap::with_capacity(types.len());

        for (position, ty) in types.iter().enumerate() {
            match lookup.entry(ty.id.0) {
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
                Entry::Occupied(_) => {
                    warn!("duplicate type id {} in registry, keeping the first", ty.id)
                }
            }
        }

        PortableRegistry { types, lookup }
    }
    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
    /// Look up a type by its id.
    pub fn resolve(&self, id: TypeId) -> Result<&Type> {
        self.lookup
            .get(&id.0)
            .map(|&position| &self.types[position].ty)
            .ok_or(Error::TypeNotFound(id.0))
    }
    /// Look up a type by its id, expecting an enum.
    pub fn resolve_variant(&self, id: TypeId) -> Result<&TypeDefVariant> {
        match &self.resolve(id)?.type_def {
            TypeDef::Variant(variant) => Ok(variant),
            _ => Err(Error::ShapeMismatch {
                id: id.0,
                expected: "variant",
            }),
        }
    }
    /// Render a human readable name for the type, e.g. `Vec<U8>` or
    /// `sp_arithmetic::per_things::Perbill`.
    pub fn type_name(&self, id: TypeId) -> Result<String> {
        self.type_name_at(id, 0)
    }
    /// Like [`type_name`](Self::type_name), but looks through single-field
    /// wrappers first. Their encoding is identical to the wrapped type, so a
    /// constant of type `Perbill(u32)` reports `U32`.
    pub fn constant_type_name(&self, mut id: TypeId) -> Result<String> {
        for _ in 0..MAX_TYPE_DEPTH {
            match &self.resolve(id)?.type_def {
                TypeDef::Composite(composite) if composite.fields.len() == 1 => {
                    id = composite.fields[0].ty;
                }
                _ => return self.type_name(id),
            }
        }

        Err(Error::TypeDepthExceeded(id.0))
    }
    fn type_name_at(&self, id: TypeId, depth: usize) -> Result<String> {
        if depth >= MAX_TYPE_DEPTH {
            return Err(Error::TypeDepthExceeded(id.0));
        }

        let ty = self.resolve(id)?;
        let name = |inner: TypeId| self.type_name_at(inner, depth + 1);

        Ok(match &ty.type_def {
            TypeDef::Composite(_) | TypeDef::Variant(_) if !ty.path.is_empty() => ty.path.join("::"),
            TypeDef::Composite(composite) => {
                let fields = composite
                    .fields
                    .iter()
                    .map(|field| name(field.ty))
                    .collect::<Result<Vec<_>>>()?;

                format!("({})", fields.join(", "))
            }
            TypeDef::Variant(_) => "Variant".to_string(),
            TypeDef::Sequence(seq) => format!("Vec<{}>", name(seq.type_param)?),
            TypeDef::Array(array) => format!("[{}; {}]", name(array.type_param)?, array.len),
            TypeDef::Tuple(tuple) => {
                let fields = tuple
                    .fields
                    .iter()
                    .map(|&field| name(field))
                    .collect::<Result<Vec<_>>>()?;

                format!("({})", fields.join(", "))
            }
            TypeDef::Primitive(primitive) => primitive.as_str().to_string(),
            TypeDef::Compact(compact) => format!("Compact<{}>", name(compact.type_param)?),
            TypeDef::BitSequence(bits) => format!(
                "BitVec<{}, {}>",
                name(bits.bit_store_type)?,
                name(bits.bit_order_type)?
            ),
            TypeDef::HistoricMetaCompat(legacy) => legacy.clone(),
        })
    }
}

impl DecodeMetadata for PortableRegistry {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        let types = Vec::<PortableType>::decode_metadata(input)?;
        debug!("decoded portable registry with {} types", types.len());

        Ok(PortableRegistry::new(types))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortableType {
    pub id: TypeId,
    pub ty: Type,
}

impl DecodeMetadata for PortableType {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(PortableType {
            id: TypeId::decode(input)?,
            ty: Type::decode_metadata(input)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    pub path: Vec<String>,
    pub type_params: Vec<TypeParameter>,
    pub type_def: TypeDef,
    pub docs: Vec<String>,
}

impl DecodeMetadata for Type {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(Type {
            path: Decode::decode(input)?,
            type_params: Decode::decode(input)?,
            type_def: TypeDef::decode_metadata(input)?,
            docs: Decode::decode(input)?,
        })
    }
}

/// A generic parameter of a type. The concrete type may be absent, e.g. for
/// phantom parameters.
#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeParameter {
    pub name: String,
    pub ty: Option<TypeId>,
}

/// The shape of a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeDef {
    Composite(TypeDefComposite),
    Variant(TypeDefVariant),
    Sequence(TypeDefSequence),
    Array(TypeDefArray),
    Tuple(TypeDefTuple),
    Primitive(TypeDefPrimitive),
    Compact(TypeDefCompact),
    BitSequence(TypeDefBitSequence),
    HistoricMetaCompat(String),
}

impl DecodeMetadata for TypeDef {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Ok(match input.read_byte()? {
            0 => TypeDef::Composite(Decode::decode(input)?),
            1 => TypeDef::Variant(Decode::decode(input)?),
            2 => TypeDef::Sequence(Decode::decode(input)?),
            3 => TypeDef::Array(Decode::decode(input)?),
            4 => TypeDef::Tuple(Decode::decode(input)?),
            5 => TypeDef::Primitive(TypeDefPrimitive::decode_metadata(input)?),
            6 => TypeDef::Compact(Decode::decode(input)?),
            7 => TypeDef::BitSequence(Decode::decode(input)?),
            8 => TypeDef::HistoricMetaCompat(Decode::decode(input)?),
            tag => return Err(Error::UnknownTag { ty: "TypeDef", tag }),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeDefComposite {
    pub fields: Vec<Field>,
}

/// A struct field or the field of an enum variant. Tuple-like structs have
/// no field names; the name and the type name annotation are `None` when
/// absent on the wire, which is distinct from an empty string.
#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeId,
    pub type_name: Option<String>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeDefVariant {
    pub variants: Vec<Variant>,
}

impl TypeDefVariant {
    /// Find an arm by its name. The first match wins.
    pub fn find_by_name(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.name == name)
    }
    /// Find an arm by its declared index, which is not necessarily its
    /// position.
    pub fn find_by_index(&self, index: u8) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.index == index)
    }
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct Variant {
    pub name: String,
    pub fields: Vec<Field>,
    pub index: u8,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeDefSequence {
    pub type_param: TypeId,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeDefArray {
    pub len: u32,
    pub type_param: TypeId,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeDefTuple {
    pub fields: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeDefCompact {
    pub type_param: TypeId,
}

#[derive(Debug, Clone, PartialEq, Decode, Serialize)]
pub struct TypeDefBitSequence {
    pub bit_store_type: TypeId,
    pub bit_order_type: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeDefPrimitive {
    Bool,
    Char,
    Str,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    I8,
    I16,
    I32,
    I64,
    I128,
    I256,
}

impl TypeDefPrimitive {
    pub fn from_tag(tag: u8) -> Result<Self> {
        use TypeDefPrimitive::*;

        Ok(match tag {
            0 => Bool,
            1 => Char,
            2 => Str,
            3 => U8,
            4 => U16,
            5 => U32,
            6 => U64,
            7 => U128,
            8 => U256,
            9 => I8,
            10 => I16,
            11 => I32,
            12 => I64,
            13 => I128,
            14 => I256,
            tag => {
                return Err(Error::UnknownTag {
                    ty: "TypeDefPrimitive",
                    tag,
                })
            }
        })
    }
    /// The name of the primitive kind, as handed out for constants.
    pub fn as_str(&self) -> &'static str {
        use TypeDefPrimitive::*;

        match self {
            Bool => "Bool",
            Char => "Char",
            Str => "Str",
            U8 => "U8",
            U16 => "U16",
            U32 => "U32",
            U64 => "U64",
            U128 => "U128",
            U256 => "U256",
            I8 => "I8",
            I16 => "I16",
            I32 => "I32",
            I64 => "I64",
            I128 => "I128",
            I256 => "I256",
        }
    }
}

impl DecodeMetadata for TypeDefPrimitive {
    fn decode_metadata<I: Input>(input: &mut I) -> Result<Self> {
        Self::from_tag(input.read_byte()?)
    }
}

decode_via_scale!(TypeParameter);
