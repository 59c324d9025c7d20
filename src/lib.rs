//! Runtime metadata resolution for Substrate based chains.
//!
//! The heavy lifting happens in the [`metadata`] module, which decodes both
//! the legacy and the type registry metadata formats and answers questions
//! like "what is the call index of `Balances.transfer`" or "what is the
//! storage key of `System.Account` for this account". On top of that, this
//! crate decodes the account information returned by a node and defines the
//! [`StateApi`](state::StateApi) boundary used to fetch storage.

#[macro_use]
extern crate serde;
#[macro_use]
extern crate parity_scale_codec;
#[macro_use]
extern crate log;

/// Utilities for parsing substrate runtime metadata.
pub mod metadata {
    pub use metascope_metadata::*;
}

pub mod common;
pub mod state;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Metadata(#[from] metascope_metadata::Error),
    #[error("invalid hex in storage response: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("failed to decode storage value: {0}")]
    Scale(#[from] parity_scale_codec::Error),
    #[error("unrecognized account info length {0}, expected 80, 76 or 72 bytes")]
    UnrecognizedAccountInfoLength(usize),
    #[error("no value stored under key {0}")]
    EmptyStorage(String),
    #[error("storage request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}
