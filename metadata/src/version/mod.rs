//! Decoders for the supported metadata versions.

pub mod v13;
pub mod v14;

pub use v13::MetadataV13;
pub use v14::MetadataV14;
