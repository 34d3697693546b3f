//! ONNX protobuf schema and loader.
//!
//! Hand-written prost structs matching onnx.proto3, limited to the fields the
//! converter reads. Uses pre-defined message structs instead of compiling the
//! proto at build time, so protoc is not required.

use prost::Message;
use std::fs;
use std::path::Path;

use crate::error::Result;

// ============================================================================
// Enums
// ============================================================================

/// ONNX tensor data types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum DataType {
    Undefined = 0,
    Float = 1,
    Uint8 = 2,
    Int8 = 3,
    Uint16 = 4,
    Int16 = 5,
    Int32 = 6,
    Int64 = 7,
    String = 8,
    Bool = 9,
    Float16 = 10,
    Double = 11,
    Uint32 = 12,
    Uint64 = 13,
    Bfloat16 = 16,
}

impl DataType {
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Float,
            2 => Self::Uint8,
            3 => Self::Int8,
            4 => Self::Uint16,
            5 => Self::Int16,
            6 => Self::Int32,
            7 => Self::Int64,
            8 => Self::String,
            9 => Self::Bool,
            10 => Self::Float16,
            11 => Self::Double,
            12 => Self::Uint32,
            13 => Self::Uint64,
            16 => Self::Bfloat16,
            _ => Self::Undefined,
        }
    }
}

/// Attribute type tags. The tensor/graph/sparse/type-proto kinds (and their
/// list forms) are recognized but never converted; their payload fields are
/// not modeled and prost skips them at decode time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum AttributeType {
    Undefined = 0,
    Float = 1,
    Int = 2,
    String = 3,
    Tensor = 4,
    Graph = 5,
    Floats = 6,
    Ints = 7,
    Strings = 8,
    Tensors = 9,
    Graphs = 10,
    SparseTensor = 11,
    SparseTensors = 12,
    TypeProto = 13,
    TypeProtos = 14,
}

impl AttributeType {
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Float,
            2 => Self::Int,
            3 => Self::String,
            4 => Self::Tensor,
            5 => Self::Graph,
            6 => Self::Floats,
            7 => Self::Ints,
            8 => Self::Strings,
            9 => Self::Tensors,
            10 => Self::Graphs,
            11 => Self::SparseTensor,
            12 => Self::SparseTensors,
            13 => Self::TypeProto,
            14 => Self::TypeProtos,
            _ => Self::Undefined,
        }
    }
}

// ============================================================================
// ONNX Protobuf Structures (matching onnx.proto3)
// ============================================================================

/// Key/value entry used for external-data metadata and quantization
/// annotations.
#[derive(Clone, Message)]
pub struct StringStringEntryProto {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// ONNX TensorProto
#[derive(Clone, Message)]
pub struct TensorProto {
    #[prost(int64, repeated, tag = "1")]
    pub dims: Vec<i64>,
    #[prost(int32, tag = "2")]
    pub data_type: i32,
    #[prost(float, repeated, tag = "4")]
    pub float_data: Vec<f32>,
    #[prost(int32, repeated, tag = "5")]
    pub int32_data: Vec<i32>,
    #[prost(int64, repeated, tag = "7")]
    pub int64_data: Vec<i64>,
    #[prost(string, tag = "8")]
    pub name: String,
    #[prost(bytes = "vec", tag = "9")]
    pub raw_data: Vec<u8>,
    #[prost(message, repeated, tag = "13")]
    pub external_data: Vec<StringStringEntryProto>,
    #[prost(int32, tag = "14")]
    pub data_location: i32,
}

/// ONNX AttributeProto
#[derive(Clone, Message)]
pub struct AttributeProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(float, optional, tag = "2")]
    pub f: Option<f32>,
    #[prost(int64, optional, tag = "3")]
    pub i: Option<i64>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub s: Option<Vec<u8>>,
    #[prost(message, optional, tag = "5")]
    pub t: Option<TensorProto>,
    #[prost(float, repeated, tag = "7")]
    pub floats: Vec<f32>,
    #[prost(int64, repeated, tag = "8")]
    pub ints: Vec<i64>,
    #[prost(bytes = "vec", repeated, tag = "9")]
    pub strings: Vec<Vec<u8>>,
    #[prost(int32, tag = "20")]
    pub r#type: i32,
}

/// ONNX TensorShapeProto.Dimension
#[derive(Clone, Message)]
pub struct Dimension {
    #[prost(int64, optional, tag = "1")]
    pub dim_value: Option<i64>,
    #[prost(string, optional, tag = "2")]
    pub dim_param: Option<String>,
}

/// ONNX TensorShapeProto
#[derive(Clone, Message)]
pub struct TensorShapeProto {
    #[prost(message, repeated, tag = "1")]
    pub dim: Vec<Dimension>,
}

/// ONNX TypeProto.Tensor
#[derive(Clone, Message)]
pub struct TypeProtoTensor {
    #[prost(int32, tag = "1")]
    pub elem_type: i32,
    #[prost(message, optional, tag = "2")]
    pub shape: Option<TensorShapeProto>,
}

/// ONNX TypeProto
#[derive(Clone, Message)]
pub struct TypeProto {
    #[prost(message, optional, tag = "1")]
    pub tensor_type: Option<TypeProtoTensor>,
}

/// ONNX ValueInfoProto
#[derive(Clone, Message)]
pub struct ValueInfoProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub r#type: Option<TypeProto>,
    #[prost(string, tag = "3")]
    pub doc_string: String,
}

impl ValueInfoProto {
    /// Declared element type, or 0 when the type descriptor is absent.
    pub fn elem_type(&self) -> i32 {
        self.r#type
            .as_ref()
            .and_then(|t| t.tensor_type.as_ref())
            .map(|t| t.elem_type)
            .unwrap_or(0)
    }

    /// Dimension values; symbolic or unset dimensions resolve to zero.
    pub fn shape(&self) -> Vec<i64> {
        self.r#type
            .as_ref()
            .and_then(|t| t.tensor_type.as_ref())
            .and_then(|t| t.shape.as_ref())
            .map(|s| s.dim.iter().map(|d| d.dim_value.unwrap_or(0)).collect())
            .unwrap_or_default()
    }
}

/// ONNX NodeProto
#[derive(Clone, Message)]
pub struct NodeProto {
    #[prost(string, repeated, tag = "1")]
    pub input: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub output: Vec<String>,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub op_type: String,
    #[prost(message, repeated, tag = "5")]
    pub attribute: Vec<AttributeProto>,
    #[prost(string, tag = "6")]
    pub doc_string: String,
    #[prost(string, tag = "7")]
    pub domain: String,
}

/// ONNX TensorAnnotation, linking a tensor to its quantization parameters.
#[derive(Clone, Message)]
pub struct TensorAnnotation {
    #[prost(string, tag = "1")]
    pub tensor_name: String,
    #[prost(message, repeated, tag = "2")]
    pub quant_parameter_tensor_names: Vec<StringStringEntryProto>,
}

/// ONNX GraphProto
#[derive(Clone, Message)]
pub struct GraphProto {
    #[prost(message, repeated, tag = "1")]
    pub node: Vec<NodeProto>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "5")]
    pub initializer: Vec<TensorProto>,
    #[prost(string, tag = "10")]
    pub doc_string: String,
    #[prost(message, repeated, tag = "11")]
    pub input: Vec<ValueInfoProto>,
    #[prost(message, repeated, tag = "12")]
    pub output: Vec<ValueInfoProto>,
    #[prost(message, repeated, tag = "13")]
    pub value_info: Vec<ValueInfoProto>,
    #[prost(message, repeated, tag = "14")]
    pub quantization_annotation: Vec<TensorAnnotation>,
}

/// ONNX OperatorSetIdProto
#[derive(Clone, Message)]
pub struct OperatorSetIdProto {
    #[prost(string, tag = "1")]
    pub domain: String,
    #[prost(int64, tag = "2")]
    pub version: i64,
}

/// ONNX ModelProto - the root message
#[derive(Clone, Message)]
pub struct ModelProto {
    #[prost(int64, tag = "1")]
    pub ir_version: i64,
    #[prost(string, tag = "2")]
    pub producer_name: String,
    #[prost(string, tag = "3")]
    pub producer_version: String,
    #[prost(string, tag = "4")]
    pub domain: String,
    #[prost(int64, tag = "5")]
    pub model_version: i64,
    #[prost(string, tag = "6")]
    pub doc_string: String,
    #[prost(message, optional, tag = "7")]
    pub graph: Option<GraphProto>,
    #[prost(message, repeated, tag = "8")]
    pub opset_import: Vec<OperatorSetIdProto>,
}

// ============================================================================
// Loading / saving
// ============================================================================

/// Load an ONNX model from a file.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ModelProto> {
    let data = fs::read(path.as_ref())?;
    Ok(ModelProto::decode(data.as_slice())?)
}

/// Write an ONNX model to a file.
pub fn save_model<P: AsRef<Path>>(model: &ModelProto, path: P) -> Result<()> {
    fs::write(path.as_ref(), model.encode_to_vec())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_round_trips_known_tags() {
        assert_eq!(DataType::from_i32(1), DataType::Float);
        assert_eq!(DataType::from_i32(7), DataType::Int64);
        assert_eq!(DataType::from_i32(16), DataType::Bfloat16);
        assert_eq!(DataType::from_i32(99), DataType::Undefined);
    }

    #[test]
    fn value_info_shape_resolves_symbolic_dims_to_zero() {
        let vi = ValueInfoProto {
            name: "x".to_string(),
            r#type: Some(TypeProto {
                tensor_type: Some(TypeProtoTensor {
                    elem_type: DataType::Float as i32,
                    shape: Some(TensorShapeProto {
                        dim: vec![
                            Dimension {
                                dim_value: None,
                                dim_param: Some("batch".to_string()),
                            },
                            Dimension {
                                dim_value: Some(128),
                                dim_param: None,
                            },
                        ],
                    }),
                }),
            }),
            doc_string: String::new(),
        };
        assert_eq!(vi.shape(), vec![0, 128]);
        assert_eq!(vi.elem_type(), DataType::Float as i32);
    }

    #[test]
    fn value_info_without_type_has_empty_shape() {
        let vi = ValueInfoProto::default();
        assert!(vi.shape().is_empty());
        assert_eq!(vi.elem_type(), 0);
    }

    #[test]
    fn model_proto_encodes_and_decodes() {
        let model = ModelProto {
            ir_version: 9,
            graph: Some(GraphProto {
                name: "g".to_string(),
                ..Default::default()
            }),
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 17,
            }],
            ..Default::default()
        };
        let bytes = model.encode_to_vec();
        let decoded = ModelProto::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.ir_version, 9);
        assert_eq!(decoded.opset_import[0].version, 17);
        assert_eq!(decoded.graph.unwrap().name, "g");
    }
}
