//! Error types for ONNX to Nova conversion.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting a model.
///
/// A failing node, initializer, or annotation aborts the whole conversion;
/// the wrapping variants carry the name of the offending graph object.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("model has no graph")]
    MissingGraph,

    #[error("node '{node}': {source}")]
    Node {
        node: String,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("initializer '{name}': {source}")]
    Initializer {
        name: String,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("quantization for tensor '{tensor}': {source}")]
    Quantization {
        tensor: String,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("quantization parameter tensor '{param}' not found for '{tensor}'")]
    MissingQuantParam { tensor: String, param: String },

    #[error("transpose node has no inputs to infer a permutation from")]
    NoTransposeInput,

    #[error("no value info for '{0}' to infer a permutation from")]
    MissingValueInfo(String),

    #[error("parameter '{param}' not found for {op}")]
    MissingParameter { op: String, param: String },

    #[error("missing attribute '{attr}' for {op}")]
    MissingAttribute { op: String, attr: &'static str },

    #[error("declared output '{0}' is not produced by any node")]
    MissingOutput(String),

    #[error("unsupported attribute type {0}")]
    UnsupportedAttributeType(i32),

    #[error("unsupported tensor data type {0}")]
    UnsupportedDataType(i32),

    #[error("no layer constructor for op type '{0}'")]
    UnsupportedOp(String),

    #[error("tensor data type {0} is not INT32 or INT64")]
    NotIntegerTensor(i32),

    #[error("raw data length {len} is not a multiple of {width}")]
    RawDataLength { len: usize, width: usize },

    #[error("expected a scalar tensor, got shape {0:?}")]
    NotScalar(Vec<i64>),

    #[error("expected scalar data type {expected}, got {actual}")]
    ScalarDtype { expected: i32, actual: i32 },

    #[error("expected {expected} raw bytes for scalar, got {actual}")]
    ScalarWidth { expected: usize, actual: usize },

    #[error("external data location not specified")]
    MissingExternalLocation,

    #[error("invalid external data {key} value '{value}'")]
    InvalidExternalField { key: &'static str, value: String },

    #[error("failed to open external data file {path}: {source}")]
    ExternalOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read external data file {path}: {source}")]
    ExternalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external data offset {offset} exceeds file size {size}")]
    ExternalOffset { offset: u64, size: u64 },
}
