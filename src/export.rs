//! Nova to ONNX export.
//!
//! Minimal reverse conversion: nodes and their attributes map back to tagged
//! protos, parameters become embedded initializers, and boundary value infos
//! regain a type descriptor. Quantization records and external-data
//! references do not survive the trip; payloads are always re-embedded.

use crate::error::{ConvertError, Result};
use crate::nova::{self, attribute};
use crate::onnx::{
    AttributeProto, AttributeType, DataType, Dimension, GraphProto, ModelProto, NodeProto,
    OperatorSetIdProto, TensorProto, TensorShapeProto, TypeProto, TypeProtoTensor, ValueInfoProto,
};

/// ONNX IR version written by the exporter.
const ONNX_IR_VERSION: i64 = 9;
/// Opset written when the source model recorded none.
const DEFAULT_OPSET_VERSION: i64 = 13;

/// Convert a Nova model back into an ONNX model.
pub fn export_model(model: &nova::Model) -> Result<ModelProto> {
    let graph = model.graph.as_ref().ok_or(ConvertError::MissingGraph)?;

    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let mut attr_names: Vec<_> = node.attributes.keys().collect();
        attr_names.sort();
        let attribute = attr_names
            .into_iter()
            .map(|name| export_attribute(name, &node.attributes[name]))
            .collect();
        nodes.push(NodeProto {
            input: node.inputs.clone(),
            output: node.outputs.clone(),
            name: node.name.clone(),
            op_type: node.op_type.clone(),
            attribute,
            ..Default::default()
        });
    }

    let mut param_names: Vec<_> = graph.parameters.keys().collect();
    param_names.sort();
    let initializer = param_names
        .into_iter()
        .map(|name| {
            let t = &graph.parameters[name];
            TensorProto {
                name: name.clone(),
                dims: t.shape.clone(),
                data_type: export_dtype(t.dtype) as i32,
                raw_data: t.data.clone(),
                ..Default::default()
            }
        })
        .collect();

    let onnx_graph = GraphProto {
        node: nodes,
        name: "nova_export".to_string(),
        initializer,
        input: graph.inputs.iter().map(export_value_info).collect(),
        output: graph.outputs.iter().map(export_value_info).collect(),
        ..Default::default()
    };

    let (producer_name, producer_version, opset_version) = match model.metadata.as_ref() {
        Some(m) => (
            m.producer_name.clone(),
            m.producer_version.clone(),
            if m.opset_version > 0 {
                m.opset_version
            } else {
                DEFAULT_OPSET_VERSION
            },
        ),
        None => (String::new(), String::new(), DEFAULT_OPSET_VERSION),
    };

    Ok(ModelProto {
        ir_version: ONNX_IR_VERSION,
        producer_name,
        producer_version,
        graph: Some(onnx_graph),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: opset_version,
        }],
        ..Default::default()
    })
}

fn export_attribute(name: &str, attr: &nova::Attribute) -> AttributeProto {
    let mut out = AttributeProto {
        name: name.to_string(),
        ..Default::default()
    };
    match attr.value.as_ref() {
        Some(attribute::Value::F(v)) => {
            out.f = Some(*v);
            out.r#type = AttributeType::Float as i32;
        }
        Some(attribute::Value::I(v)) => {
            out.i = Some(*v);
            out.r#type = AttributeType::Int as i32;
        }
        Some(attribute::Value::S(v)) => {
            out.s = Some(v.as_bytes().to_vec());
            out.r#type = AttributeType::String as i32;
        }
        Some(attribute::Value::Floats(list)) => {
            out.floats = list.val.clone();
            out.r#type = AttributeType::Floats as i32;
        }
        Some(attribute::Value::Ints(list)) => {
            out.ints = list.val.clone();
            out.r#type = AttributeType::Ints as i32;
        }
        Some(attribute::Value::Strings(list)) => {
            out.strings = list.val.iter().map(|s| s.as_bytes().to_vec()).collect();
            out.r#type = AttributeType::Strings as i32;
        }
        None => {
            out.r#type = AttributeType::Undefined as i32;
        }
    }
    out
}

fn export_value_info(vi: &nova::ValueInfo) -> ValueInfoProto {
    ValueInfoProto {
        name: vi.name.clone(),
        r#type: Some(TypeProto {
            tensor_type: Some(TypeProtoTensor {
                elem_type: export_dtype(vi.dtype) as i32,
                shape: Some(TensorShapeProto {
                    dim: vi
                        .shape
                        .iter()
                        .map(|&d| Dimension {
                            dim_value: Some(d),
                            dim_param: None,
                        })
                        .collect(),
                }),
            }),
        }),
        doc_string: String::new(),
    }
}

fn export_dtype(dtype: i32) -> DataType {
    match nova::DataType::from_i32(dtype) {
        nova::DataType::Float32 => DataType::Float,
        nova::DataType::Float16 => DataType::Float16,
        nova::DataType::Bfloat16 => DataType::Bfloat16,
        nova::DataType::Float64 => DataType::Double,
        nova::DataType::Int32 => DataType::Int32,
        nova::DataType::Int64 => DataType::Int64,
        nova::DataType::Int8 => DataType::Int8,
        nova::DataType::Uint8 => DataType::Uint8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn exported_node_keeps_attributes_and_io() {
        let mut attributes = HashMap::new();
        attributes.insert(
            "shape".to_string(),
            nova::Attribute {
                value: Some(attribute::Value::Ints(nova::IntList { val: vec![1, -1] })),
            },
        );
        attributes.insert(
            "mode".to_string(),
            nova::Attribute {
                value: Some(attribute::Value::S("linear".to_string())),
            },
        );
        let model = nova::Model {
            graph: Some(nova::Graph {
                nodes: vec![nova::Node {
                    name: "r0".to_string(),
                    op_type: "Reshape".to_string(),
                    inputs: vec!["x".to_string()],
                    outputs: vec!["y".to_string()],
                    attributes,
                }],
                parameters: HashMap::new(),
                inputs: vec![],
                outputs: vec![],
            }),
            metadata: Some(nova::Metadata {
                producer_name: "nova-converter".to_string(),
                producer_version: "0.1.0".to_string(),
                opset_version: 17,
            }),
        };

        let exported = export_model(&model).unwrap();
        assert_eq!(exported.opset_import[0].version, 17);
        let graph = exported.graph.unwrap();
        let node = &graph.node[0];
        assert_eq!(node.op_type, "Reshape");
        assert_eq!(node.input, vec!["x".to_string()]);

        let shape_attr = node
            .attribute
            .iter()
            .find(|a| a.name == "shape")
            .unwrap();
        assert_eq!(shape_attr.r#type, AttributeType::Ints as i32);
        assert_eq!(shape_attr.ints, vec![1, -1]);

        let mode_attr = node.attribute.iter().find(|a| a.name == "mode").unwrap();
        assert_eq!(mode_attr.r#type, AttributeType::String as i32);
        assert_eq!(mode_attr.s.as_deref(), Some(b"linear".as_slice()));
    }

    #[test]
    fn parameters_become_embedded_initializers() {
        let mut parameters = HashMap::new();
        parameters.insert(
            "weight".to_string(),
            nova::Tensor {
                dtype: nova::DataType::Float32 as i32,
                shape: vec![2],
                data: vec![0, 0, 128, 63, 0, 0, 0, 64], // [1.0, 2.0]
                quant: None,
            },
        );
        let model = nova::Model {
            graph: Some(nova::Graph {
                nodes: vec![],
                parameters,
                inputs: vec![],
                outputs: vec![],
            }),
            metadata: None,
        };

        let exported = export_model(&model).unwrap();
        let graph = exported.graph.unwrap();
        assert_eq!(graph.initializer.len(), 1);
        let init = &graph.initializer[0];
        assert_eq!(init.name, "weight");
        assert_eq!(init.data_type, DataType::Float as i32);
        assert_eq!(init.dims, vec![2]);
        assert_eq!(init.raw_data.len(), 8);
        assert_eq!(exported.opset_import[0].version, DEFAULT_OPSET_VERSION);
    }
}
