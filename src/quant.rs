//! Quantization annotation processing.
//!
//! Source graphs may annotate tensors with references to scale and zero-point
//! parameter tensors. Those parameters are 0-dimensional scalars; this module
//! resolves and decodes them into per-tensor quantization records before
//! tensor conversion runs.

use std::collections::HashMap;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{ConvertError, Result};
use crate::nova;
use crate::onnx::{DataType, GraphProto, TensorProto};

/// Annotation role naming the scale parameter tensor.
pub const SCALE_TENSOR: &str = "SCALE_TENSOR";
/// Annotation role naming the zero-point parameter tensor.
pub const ZERO_POINT_TENSOR: &str = "ZERO_POINT_TENSOR";

/// Resolve every quantization annotation into a record keyed by the annotated
/// tensor's name.
///
/// Each referenced parameter tensor must exist; a missing one is a hard
/// error. A record is only materialized when the decoded scale or zero-point
/// is non-zero - an all-zero pair is indistinguishable from "no
/// quantization".
pub fn collect(
    graph: &GraphProto,
    initializers: &HashMap<&str, &TensorProto>,
) -> Result<HashMap<String, nova::Quantization>> {
    let mut records = HashMap::new();

    for annotation in &graph.quantization_annotation {
        let tensor_name = annotation.tensor_name.as_str();
        let mut scale = 0f32;
        let mut zero_point = 0i64;

        for param in &annotation.quant_parameter_tensor_names {
            let param_tensor = initializers.get(param.value.as_str()).copied().ok_or_else(|| {
                ConvertError::MissingQuantParam {
                    tensor: tensor_name.to_string(),
                    param: param.value.clone(),
                }
            })?;

            let wrap = |e| ConvertError::Quantization {
                tensor: tensor_name.to_string(),
                source: Box::new(e),
            };
            match param.key.as_str() {
                SCALE_TENSOR => scale = scalar_f32(param_tensor).map_err(wrap)?,
                ZERO_POINT_TENSOR => zero_point = scalar_i64(param_tensor).map_err(wrap)?,
                _ => {}
            }
        }

        if scale != 0.0 || zero_point != 0 {
            tracing::debug!(
                "tensor '{}' quantized: scale {}, zero point {}",
                tensor_name,
                scale,
                zero_point
            );
            records.insert(
                tensor_name.to_string(),
                nova::Quantization { scale, zero_point },
            );
        }
    }

    Ok(records)
}

/// Decode a 0-dimensional float32 tensor with exactly 4 raw bytes.
fn scalar_f32(t: &TensorProto) -> Result<f32> {
    if !t.dims.is_empty() {
        return Err(ConvertError::NotScalar(t.dims.clone()));
    }
    if DataType::from_i32(t.data_type) != DataType::Float {
        return Err(ConvertError::ScalarDtype {
            expected: DataType::Float as i32,
            actual: t.data_type,
        });
    }
    if t.raw_data.len() != 4 {
        return Err(ConvertError::ScalarWidth {
            expected: 4,
            actual: t.raw_data.len(),
        });
    }
    Ok(Cursor::new(t.raw_data.as_slice()).read_f32::<LittleEndian>()?)
}

/// Decode a 0-dimensional int64 tensor with exactly 8 raw bytes.
fn scalar_i64(t: &TensorProto) -> Result<i64> {
    if !t.dims.is_empty() {
        return Err(ConvertError::NotScalar(t.dims.clone()));
    }
    if DataType::from_i32(t.data_type) != DataType::Int64 {
        return Err(ConvertError::ScalarDtype {
            expected: DataType::Int64 as i32,
            actual: t.data_type,
        });
    }
    if t.raw_data.len() != 8 {
        return Err(ConvertError::ScalarWidth {
            expected: 8,
            actual: t.raw_data.len(),
        });
    }
    Ok(Cursor::new(t.raw_data.as_slice()).read_i64::<LittleEndian>()?)
}
