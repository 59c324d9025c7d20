use parity_scale_codec::Error as ScaleError;
use serde_json::Error as SerdeJsonError;

/// Errors that can occur when parsing Substrate metadata or resolving names
/// against it.
///
/// Decoding errors abort the whole parse. Resolution errors only concern the
/// single query and leave the metadata usable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse JSON-RPC metadata response: {0}")]
    ParseJsonRpcMetadata(#[from] SerdeJsonError),
    #[error("failed to parse hex metadata: {0}")]
    ParseHexMetadata(#[from] hex::FromHexError),
    #[error("malformed metadata encoding: {0}")]
    ParseRawMetadata(#[from] ScaleError),
    #[error("unsupported metadata version {0}")]
    UnsupportedVersion(u8),
    #[error("unknown {ty} discriminant {tag}")]
    UnknownTag { ty: &'static str, tag: u8 },
    #[error("module {0} not found in metadata")]
    ModuleNotFound(String),
    #[error("no module with index {0} in metadata")]
    ModuleIndexNotFound(u8),
    #[error("module {0} declares no calls")]
    NoCalls(String),
    #[error("module {0} declares no events")]
    NoEvents(String),
    #[error("module {0} declares no storage")]
    NoStorage(String),
    #[error("call {call} not found within module {module}")]
    CallNotFound { module: String, call: String },
    #[error("call index {index} not found within module {module}")]
    CallIndexNotFound { module: String, index: u8 },
    #[error("event index {index} not found within module {module}")]
    EventNotFound { module: String, index: u8 },
    #[error("storage {entry} not found within module {module}")]
    StorageNotFound { module: String, entry: String },
    #[error("constant {constant} not found within module {module}")]
    ConstantNotFound { module: String, constant: String },
    #[error("type {0} not found in the registry")]
    TypeNotFound(u32),
    #[error("type {id} is not a {expected} type")]
    ShapeMismatch { id: u32, expected: &'static str },
    #[error("type {0} exceeds the maximum nesting depth")]
    TypeDepthExceeded(u32),
    #[error("invalid call path {0:?}, expected `Module.call`")]
    InvalidCallPath(String),
    #[error("invalid index {0:?}, expected 4 hex characters")]
    InvalidIndex(String),
    #[error("storage {entry} takes at most {expected} keys, got {got}")]
    TooManyKeys {
        entry: String,
        expected: usize,
        got: usize,
    },
}
