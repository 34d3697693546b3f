//! Tensor conversion.
//!
//! Maps a source tensor's dtype and payload into the Nova representation.
//! Payload bytes pass through verbatim; consumers decode per-dtype,
//! little-endian throughout.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::external;
use crate::nova;
use crate::onnx::{DataType, TensorProto};

/// Convert one source tensor into a Nova tensor.
///
/// Externally-stored payloads are resolved against `model_path`; the
/// quantization map supplies a record when one was annotated for this
/// tensor's name.
pub fn convert_tensor(
    t: &TensorProto,
    model_path: Option<&Path>,
    quant: &HashMap<String, nova::Quantization>,
) -> Result<nova::Tensor> {
    let dtype = match DataType::from_i32(t.data_type) {
        DataType::Float => nova::DataType::Float32,
        DataType::Float16 => nova::DataType::Float16,
        DataType::Bfloat16 => nova::DataType::Bfloat16,
        DataType::Double => nova::DataType::Float64,
        DataType::Int32 => nova::DataType::Int32,
        DataType::Int64 => nova::DataType::Int64,
        _ => return Err(ConvertError::UnsupportedDataType(t.data_type)),
    };

    let data = if !t.external_data.is_empty() {
        external::load_external_data(t, model_path)?
    } else {
        t.raw_data.clone()
    };

    Ok(nova::Tensor {
        dtype: dtype as i32,
        shape: t.dims.clone(),
        data,
        quant: quant.get(t.name.as_str()).cloned(),
    })
}
