//! nova-converter: compiles ONNX models into the Nova graph format.
//!
//! The core is a single conversion pass over the source graph: initializers
//! and value infos are re-indexed, selected operators' constant inputs are
//! rewritten into declarative attributes, integer constants are inlined,
//! binary payloads (embedded or external) are decoded, and a lean target
//! graph is assembled for the execution engine. Thin collaborators handle
//! loading, serialization, inspection, reverse export, and hub downloads.
//!
//! # Example
//!
//! ```no_run
//! use nova_converter::{convert_model, nova, onnx};
//!
//! let model = onnx::load_model("model.onnx").unwrap();
//! let converted = convert_model(&model, Some("model.onnx".as_ref())).unwrap();
//! nova::save(&converted, "model.nova").unwrap();
//! ```

pub mod convert;
pub mod download;
pub mod error;
pub mod export;
pub mod external;
pub mod graph_builder;
pub mod inspect;
pub mod nova;
pub mod onnx;
pub mod quant;
pub mod tensor;

pub use convert::convert_model;
pub use download::{DownloadResult, HubClient, HubError};
pub use error::{ConvertError, Result};
pub use export::export_model;
pub use graph_builder::ExecutionGraph;
