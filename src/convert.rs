//! ONNX to Nova conversion pass.
//!
//! Walks the source graph once: indexes initializers and declared value
//! shapes, rewrites selected operators' constant inputs into declarative
//! attributes, promotes the remaining integer constants to attributes keyed
//! by their own names, and collects floating-point initializers into the
//! parameter map. The source graph is read-only throughout; a single failing
//! node or tensor aborts the whole conversion.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{ConvertError, Result};
use crate::nova::{self, attribute};
use crate::onnx::{AttributeProto, AttributeType, DataType, GraphProto, ModelProto, NodeProto, TensorProto};
use crate::{quant, tensor};

/// Producer identity stamped into converted models.
pub const PRODUCER_NAME: &str = "nova-converter";

/// Dtype and dimensions for a named value, taken from a declared value info
/// or synthesized from an initializer.
#[derive(Debug, Clone)]
pub struct ValueShape {
    pub dtype: i32,
    pub dims: Vec<i64>,
}

/// Graph-level lookup indices shared by the per-node and per-tensor passes.
pub struct GraphIndex<'a> {
    pub initializers: HashMap<&'a str, &'a TensorProto>,
    pub value_shapes: HashMap<&'a str, ValueShape>,
    pub quant: HashMap<String, nova::Quantization>,
}

/// Convert an ONNX model into a Nova model.
///
/// `model_path` is only needed when tensors reference external data files;
/// relative locations resolve against the model file's directory.
pub fn convert_model(model: &ModelProto, model_path: Option<&Path>) -> Result<nova::Model> {
    let graph = model.graph.as_ref().ok_or(ConvertError::MissingGraph)?;
    let index = build_index(graph)?;

    let mut nodes = Vec::with_capacity(graph.node.len());
    for onnx_node in &graph.node {
        tracing::debug!("converting node '{}' ({})", onnx_node.name, onnx_node.op_type);
        let node = convert_node(onnx_node, &index).map_err(|e| ConvertError::Node {
            node: onnx_node.name.clone(),
            source: Box::new(e),
        })?;
        nodes.push(node);
    }

    // Only floating-point initializers become parameters. Integer initializers
    // are compile-time configuration and were inlined by node conversion.
    let mut parameters = HashMap::new();
    for (name, init) in &index.initializers {
        if !is_float_family(init.data_type) {
            continue;
        }
        let converted = tensor::convert_tensor(init, model_path, &index.quant).map_err(|e| {
            ConvertError::Initializer {
                name: (*name).to_string(),
                source: Box::new(e),
            }
        })?;
        parameters.insert((*name).to_string(), converted);
    }

    let inputs = graph.input.iter().map(boundary_value_info).collect();
    let outputs = graph.output.iter().map(boundary_value_info).collect();
    let opset_version = model.opset_import.first().map(|op| op.version).unwrap_or(0);

    tracing::info!(
        "converted graph '{}': {} nodes, {} parameters, opset {}",
        graph.name,
        graph.node.len(),
        parameters.len(),
        opset_version
    );

    Ok(nova::Model {
        graph: Some(nova::Graph {
            nodes,
            parameters,
            inputs,
            outputs,
        }),
        metadata: Some(nova::Metadata {
            producer_name: PRODUCER_NAME.to_string(),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
            opset_version,
        }),
    })
}

/// Build the lookup indices: initializers by name, value shapes by name, and
/// quantization records by annotated tensor name.
pub(crate) fn build_index(graph: &GraphProto) -> Result<GraphIndex<'_>> {
    let mut initializers: HashMap<&str, &TensorProto> = HashMap::new();
    for init in &graph.initializer {
        if initializers.insert(init.name.as_str(), init).is_some() {
            tracing::warn!(
                "duplicate initializer '{}', keeping the last occurrence",
                init.name
            );
        }
    }

    let mut value_shapes: HashMap<&str, ValueShape> = HashMap::new();
    for vi in graph
        .input
        .iter()
        .chain(graph.output.iter())
        .chain(graph.value_info.iter())
    {
        value_shapes.insert(
            vi.name.as_str(),
            ValueShape {
                dtype: vi.elem_type(),
                dims: vi.shape(),
            },
        );
    }
    // Initializers behave as typed inputs; their own dtype and dims win over
    // any declared value info of the same name.
    for (name, init) in &initializers {
        value_shapes.insert(
            name,
            ValueShape {
                dtype: init.data_type,
                dims: init.dims.clone(),
            },
        );
    }

    let quant = quant::collect(graph, &initializers)?;

    Ok(GraphIndex {
        initializers,
        value_shapes,
        quant,
    })
}

/// Translate one node: native attributes first, then the operator-specific
/// input rewrites, then generic promotion of integer constant inputs.
pub fn convert_node(node: &NodeProto, index: &GraphIndex) -> Result<nova::Node> {
    let mut out = nova::Node {
        name: node.name.clone(),
        op_type: node.op_type.clone(),
        inputs: Vec::new(),
        outputs: node.output.clone(),
        attributes: HashMap::new(),
    };

    for attr in &node.attribute {
        match convert_attribute(attr) {
            Some(value) => {
                out.attributes.insert(attr.name.clone(), value);
            }
            None => {
                tracing::debug!(
                    "dropping unsupported attribute '{}' (type {}) on '{}'",
                    attr.name,
                    attr.r#type,
                    node.name
                );
            }
        }
    }

    let mut consumed: HashSet<String> = HashSet::new();
    if let Some(rewrite) = input_rewrite(node.op_type.as_str()) {
        rewrite(node, index, &mut out, &mut consumed)?;
    }

    for input in &node.input {
        if consumed.contains(input) {
            continue;
        }
        match index.initializers.get(input.as_str()) {
            Some(init) if is_int_family(init.data_type) => {
                // A constant integer input is configuration, not data flow:
                // inline it as an attribute keyed by its own name.
                let ints = int64_data(init).map_err(|e| ConvertError::Initializer {
                    name: input.clone(),
                    source: Box::new(e),
                })?;
                out.attributes.insert(input.clone(), ints_attribute(&ints));
            }
            _ => out.inputs.push(input.clone()),
        }
    }

    Ok(out)
}

// ============================================================================
// Operator-specific input rewrites
// ============================================================================

type InputRewrite =
    fn(&NodeProto, &GraphIndex, &mut nova::Node, &mut HashSet<String>) -> Result<()>;

/// Operator-keyed rewrite table. A static match rather than a mutable
/// registry: no registration order, no hidden state.
fn input_rewrite(op_type: &str) -> Option<InputRewrite> {
    match op_type {
        "ReduceSum" => Some(rewrite_reduce_sum),
        "Transpose" => Some(rewrite_transpose),
        "Reshape" => Some(rewrite_reshape),
        _ => None,
    }
}

/// ReduceSum carries its reduction axes as a second constant input.
fn rewrite_reduce_sum(
    node: &NodeProto,
    index: &GraphIndex,
    out: &mut nova::Node,
    consumed: &mut HashSet<String>,
) -> Result<()> {
    if let Some(axes_input) = node.input.get(1) {
        if let Some(init) = index.initializers.get(axes_input.as_str()) {
            let axes = int64_data(init)?;
            out.attributes.insert("axes".to_string(), ints_attribute(&axes));
            consumed.insert(axes_input.clone());
        }
    }
    Ok(())
}

/// Transpose takes its permutation from an explicit attribute, a constant
/// input, or falls back to reversing the axes of the first input.
fn rewrite_transpose(
    node: &NodeProto,
    index: &GraphIndex,
    out: &mut nova::Node,
    consumed: &mut HashSet<String>,
) -> Result<()> {
    if out.attributes.contains_key("perm") {
        return Ok(());
    }

    if let Some(perm_input) = node.input.get(1) {
        if let Some(init) = index.initializers.get(perm_input.as_str()) {
            let perm = int64_data(init)?;
            out.attributes.insert("perm".to_string(), ints_attribute(&perm));
            consumed.insert(perm_input.clone());
            return Ok(());
        }
    }

    let data_input = node.input.first().ok_or(ConvertError::NoTransposeInput)?;
    let shape = index
        .value_shapes
        .get(data_input.as_str())
        .ok_or_else(|| ConvertError::MissingValueInfo(data_input.clone()))?;
    let rank = shape.dims.len() as i64;
    let perm: Vec<i64> = (0..rank).rev().collect();
    out.attributes.insert("perm".to_string(), ints_attribute(&perm));
    Ok(())
}

/// Reshape carries its target shape as a second constant input.
fn rewrite_reshape(
    node: &NodeProto,
    index: &GraphIndex,
    out: &mut nova::Node,
    consumed: &mut HashSet<String>,
) -> Result<()> {
    if let Some(shape_input) = node.input.get(1) {
        if let Some(init) = index.initializers.get(shape_input.as_str()) {
            let mut shape = int64_data(init)?;
            normalize_reshape(&mut shape);
            out.attributes.insert("shape".to_string(), ints_attribute(&shape));
            consumed.insert(shape_input.clone());
        }
    }
    Ok(())
}

/// Two reshape idioms from transformer exports use a leading 0 to mean "same
/// as input". The execution engine has no such convention: pin the batch
/// dimension to 1 and keep -1 for runtime inference. Nothing else is
/// rewritten.
fn normalize_reshape(shape: &mut [i64]) {
    if shape.len() == 3 && shape[0] == 0 && shape[1] == -1 && shape[2] > 0 {
        shape[0] = 1;
    } else if shape.len() == 2 && shape[0] == 0 && shape[1] == -1 {
        shape[0] = 1;
    }
}

// ============================================================================
// Attribute conversion
// ============================================================================

/// Map one source attribute into the target representation. Tensor-, graph-,
/// sparse- and type-valued attributes (and their list forms) yield `None`;
/// node translation drops them.
pub fn convert_attribute(attr: &AttributeProto) -> Option<nova::Attribute> {
    let value = match AttributeType::from_i32(attr.r#type) {
        AttributeType::Float => attribute::Value::F(attr.f.unwrap_or_default()),
        AttributeType::Int => attribute::Value::I(attr.i.unwrap_or_default()),
        AttributeType::String => attribute::Value::S(
            String::from_utf8_lossy(attr.s.as_deref().unwrap_or_default()).into_owned(),
        ),
        AttributeType::Floats => attribute::Value::Floats(nova::FloatList {
            val: attr.floats.clone(),
        }),
        AttributeType::Ints => attribute::Value::Ints(nova::IntList {
            val: attr.ints.clone(),
        }),
        AttributeType::Strings => attribute::Value::Strings(nova::StringList {
            val: attr
                .strings
                .iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect(),
        }),
        _ => return None,
    };
    Some(nova::Attribute { value: Some(value) })
}

/// Strict form of [`convert_attribute`]: unsupported kinds are an error
/// instead of a dropped value. The execution-graph builder uses this; it
/// instantiates layers and cannot afford silently-lost attributes.
pub fn convert_attribute_strict(attr: &AttributeProto) -> Result<nova::Attribute> {
    convert_attribute(attr).ok_or(ConvertError::UnsupportedAttributeType(attr.r#type))
}

// ============================================================================
// Integer payload extraction
// ============================================================================

/// Decode an integer tensor's payload into 64-bit values.
///
/// Pre-decoded typed fields win over the raw byte payload; raw bytes decode
/// little-endian at 8 bytes per element for INT64 and 4 for INT32.
pub fn int64_data(t: &TensorProto) -> Result<Vec<i64>> {
    let dtype = DataType::from_i32(t.data_type);
    if dtype != DataType::Int64 && dtype != DataType::Int32 {
        return Err(ConvertError::NotIntegerTensor(t.data_type));
    }
    if !t.int64_data.is_empty() {
        return Ok(t.int64_data.clone());
    }
    if !t.int32_data.is_empty() {
        return Ok(t.int32_data.iter().map(|&v| i64::from(v)).collect());
    }
    if t.raw_data.is_empty() {
        return Ok(Vec::new());
    }

    let width = if dtype == DataType::Int64 { 8 } else { 4 };
    if t.raw_data.len() % width != 0 {
        return Err(ConvertError::RawDataLength {
            len: t.raw_data.len(),
            width,
        });
    }
    let mut cursor = Cursor::new(t.raw_data.as_slice());
    let mut vals = Vec::with_capacity(t.raw_data.len() / width);
    for _ in 0..t.raw_data.len() / width {
        let v = if width == 8 {
            cursor.read_i64::<LittleEndian>()?
        } else {
            i64::from(cursor.read_i32::<LittleEndian>()?)
        };
        vals.push(v);
    }
    Ok(vals)
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn is_float_family(data_type: i32) -> bool {
    matches!(
        DataType::from_i32(data_type),
        DataType::Float | DataType::Float16 | DataType::Bfloat16 | DataType::Double
    )
}

pub(crate) fn is_int_family(data_type: i32) -> bool {
    matches!(
        DataType::from_i32(data_type),
        DataType::Int32 | DataType::Int64
    )
}

fn ints_attribute(vals: &[i64]) -> nova::Attribute {
    nova::Attribute {
        value: Some(attribute::Value::Ints(nova::IntList { val: vals.to_vec() })),
    }
}

/// Boundary value infos carry name and resolved shape only.
fn boundary_value_info(vi: &crate::onnx::ValueInfoProto) -> nova::ValueInfo {
    nova::ValueInfo {
        name: vi.name.clone(),
        dtype: 0,
        shape: vi.shape(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onnx::{
        Dimension, OperatorSetIdProto, TensorShapeProto, TypeProto, TypeProtoTensor,
        ValueInfoProto,
    };

    fn int64_tensor(name: &str, vals: &[i64]) -> TensorProto {
        TensorProto {
            name: name.to_string(),
            dims: vec![vals.len() as i64],
            data_type: DataType::Int64 as i32,
            raw_data: vals.iter().flat_map(|v| v.to_le_bytes()).collect(),
            ..Default::default()
        }
    }

    fn float_tensor(name: &str, dims: &[i64], vals: &[f32]) -> TensorProto {
        TensorProto {
            name: name.to_string(),
            dims: dims.to_vec(),
            data_type: DataType::Float as i32,
            raw_data: vals.iter().flat_map(|v| v.to_le_bytes()).collect(),
            ..Default::default()
        }
    }

    fn value_info(name: &str, dims: &[i64]) -> ValueInfoProto {
        ValueInfoProto {
            name: name.to_string(),
            r#type: Some(TypeProto {
                tensor_type: Some(TypeProtoTensor {
                    elem_type: DataType::Float as i32,
                    shape: Some(TensorShapeProto {
                        dim: dims
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

    fn node(op_type: &str, name: &str, inputs: &[&str], outputs: &[&str]) -> NodeProto {
        NodeProto {
            op_type: op_type.to_string(),
            name: name.to_string(),
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: outputs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn index_for(graph: &GraphProto) -> GraphIndex<'_> {
        build_index(graph).unwrap()
    }

    #[test]
    fn int64_data_prefers_typed_fields_over_raw() {
        let t = TensorProto {
            data_type: DataType::Int64 as i32,
            int64_data: vec![7, 8],
            raw_data: vec![0xFF; 16],
            ..Default::default()
        };
        assert_eq!(int64_data(&t).unwrap(), vec![7, 8]);

        let t = TensorProto {
            data_type: DataType::Int32 as i32,
            int32_data: vec![-1, 5],
            ..Default::default()
        };
        assert_eq!(int64_data(&t).unwrap(), vec![-1, 5]);
    }

    #[test]
    fn int64_data_decodes_raw_little_endian() {
        let t = int64_tensor("axes", &[3, -2]);
        assert_eq!(int64_data(&t).unwrap(), vec![3, -2]);

        let t = TensorProto {
            data_type: DataType::Int32 as i32,
            raw_data: (-4i32)
                .to_le_bytes()
                .iter()
                .chain(9i32.to_le_bytes().iter())
                .copied()
                .collect(),
            ..Default::default()
        };
        assert_eq!(int64_data(&t).unwrap(), vec![-4, 9]);
    }

    #[test]
    fn int64_data_rejects_non_integer_and_ragged_payloads() {
        let t = TensorProto {
            data_type: DataType::Float as i32,
            ..Default::default()
        };
        assert!(matches!(
            int64_data(&t),
            Err(ConvertError::NotIntegerTensor(_))
        ));

        let t = TensorProto {
            data_type: DataType::Int64 as i32,
            raw_data: vec![0; 10],
            ..Default::default()
        };
        assert!(matches!(
            int64_data(&t),
            Err(ConvertError::RawDataLength { len: 10, width: 8 })
        ));
    }

    #[test]
    fn int64_data_empty_raw_payload_is_empty_not_error() {
        let t = TensorProto {
            data_type: DataType::Int64 as i32,
            ..Default::default()
        };
        assert!(int64_data(&t).unwrap().is_empty());
    }

    #[test]
    fn attribute_conversion_covers_supported_kinds() {
        let attr = AttributeProto {
            name: "alpha".to_string(),
            f: Some(0.2),
            r#type: AttributeType::Float as i32,
            ..Default::default()
        };
        let converted = convert_attribute(&attr).unwrap();
        assert_eq!(converted.value, Some(attribute::Value::F(0.2)));

        let attr = AttributeProto {
            name: "mode".to_string(),
            s: Some(b"nearest".to_vec()),
            r#type: AttributeType::String as i32,
            ..Default::default()
        };
        let converted = convert_attribute(&attr).unwrap();
        assert_eq!(
            converted.value,
            Some(attribute::Value::S("nearest".to_string()))
        );

        let attr = AttributeProto {
            name: "pads".to_string(),
            ints: vec![0, 1, 0, 1],
            r#type: AttributeType::Ints as i32,
            ..Default::default()
        };
        let converted = convert_attribute(&attr).unwrap();
        match converted.value {
            Some(attribute::Value::Ints(list)) => assert_eq!(list.val, vec![0, 1, 0, 1]),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn unsupported_attribute_kinds_drop_or_error_per_call_site() {
        let attr = AttributeProto {
            name: "body".to_string(),
            r#type: AttributeType::Graph as i32,
            ..Default::default()
        };
        assert!(convert_attribute(&attr).is_none());
        assert!(matches!(
            convert_attribute_strict(&attr),
            Err(ConvertError::UnsupportedAttributeType(5))
        ));
    }

    #[test]
    fn reduce_sum_axes_input_becomes_attribute() {
        let graph = GraphProto {
            initializer: vec![int64_tensor("axes0", &[1])],
            node: vec![node("ReduceSum", "rs", &["data", "axes0"], &["out"])],
            ..Default::default()
        };
        let index = index_for(&graph);
        let converted = convert_node(&graph.node[0], &index).unwrap();
        assert_eq!(converted.attr_ints("axes"), Some(&[1][..]));
        assert_eq!(converted.inputs, vec!["data".to_string()]);
    }

    #[test]
    fn transpose_keeps_explicit_perm_attribute() {
        let mut n = node("Transpose", "t", &["data"], &["out"]);
        n.attribute.push(AttributeProto {
            name: "perm".to_string(),
            ints: vec![1, 0],
            r#type: AttributeType::Ints as i32,
            ..Default::default()
        });
        let graph = GraphProto {
            node: vec![n],
            ..Default::default()
        };
        let index = index_for(&graph);
        let converted = convert_node(&graph.node[0], &index).unwrap();
        assert_eq!(converted.attr_ints("perm"), Some(&[1, 0][..]));
    }

    #[test]
    fn transpose_default_perm_reverses_axes() {
        let graph = GraphProto {
            input: vec![value_info("data", &[2, 3, 4])],
            node: vec![node("Transpose", "t", &["data"], &["out"])],
            ..Default::default()
        };
        let index = index_for(&graph);
        let converted = convert_node(&graph.node[0], &index).unwrap();
        assert_eq!(converted.attr_ints("perm"), Some(&[2, 1, 0][..]));
    }

    #[test]
    fn transpose_without_inputs_or_value_info_errors() {
        let graph = GraphProto {
            node: vec![
                node("Transpose", "t0", &[], &["out"]),
                node("Transpose", "t1", &["mystery"], &["out2"]),
            ],
            ..Default::default()
        };
        let index = index_for(&graph);
        assert!(matches!(
            convert_node(&graph.node[0], &index),
            Err(ConvertError::NoTransposeInput)
        ));
        assert!(matches!(
            convert_node(&graph.node[1], &index),
            Err(ConvertError::MissingValueInfo(ref n)) if n == "mystery"
        ));
    }

    #[test]
    fn reshape_normalizes_batch_idioms_only() {
        let mut shape = vec![0, -1, 256];
        normalize_reshape(&mut shape);
        assert_eq!(shape, vec![1, -1, 256]);

        let mut shape = vec![0, -1];
        normalize_reshape(&mut shape);
        assert_eq!(shape, vec![1, -1]);

        let mut shape = vec![4, 8];
        normalize_reshape(&mut shape);
        assert_eq!(shape, vec![4, 8]);

        // A negative trailing dimension does not match the 3-element idiom.
        let mut shape = vec![0, -1, -1];
        normalize_reshape(&mut shape);
        assert_eq!(shape, vec![0, -1, -1]);
    }

    #[test]
    fn reshape_shape_input_becomes_normalized_attribute() {
        let graph = GraphProto {
            initializer: vec![int64_tensor("shape0", &[0, -1, 256])],
            node: vec![node("Reshape", "r", &["data", "shape0"], &["out"])],
            ..Default::default()
        };
        let index = index_for(&graph);
        let converted = convert_node(&graph.node[0], &index).unwrap();
        assert_eq!(converted.attr_ints("shape"), Some(&[1, -1, 256][..]));
        assert_eq!(converted.inputs, vec!["data".to_string()]);
    }

    #[test]
    fn generic_integer_inputs_promote_under_their_own_name() {
        let graph = GraphProto {
            initializer: vec![
                int64_tensor("split_sizes", &[64, 64]),
                float_tensor("weight", &[2, 2], &[1.0, 2.0, 3.0, 4.0]),
            ],
            node: vec![node(
                "Split",
                "s",
                &["data", "weight", "split_sizes"],
                &["a", "b"],
            )],
            ..Default::default()
        };
        let index = index_for(&graph);
        let converted = convert_node(&graph.node[0], &index).unwrap();
        // The float initializer and the dynamic input stay, in order.
        assert_eq!(
            converted.inputs,
            vec!["data".to_string(), "weight".to_string()]
        );
        assert_eq!(converted.attr_ints("split_sizes"), Some(&[64, 64][..]));
        assert_eq!(converted.outputs, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn convert_model_requires_a_graph() {
        let model = ModelProto::default();
        assert!(matches!(
            convert_model(&model, None),
            Err(ConvertError::MissingGraph)
        ));
    }

    #[test]
    fn convert_model_collects_only_float_parameters() {
        let model = ModelProto {
            graph: Some(GraphProto {
                initializer: vec![
                    float_tensor("weight", &[2], &[0.5, 1.5]),
                    int64_tensor("unreferenced_config", &[3]),
                ],
                input: vec![value_info("x", &[1, 2])],
                output: vec![value_info("y", &[1, 2])],
                ..Default::default()
            }),
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 17,
            }],
            ..Default::default()
        };
        let converted = convert_model(&model, None).unwrap();
        let graph = converted.graph.unwrap();
        assert_eq!(graph.parameters.len(), 1);
        assert!(graph.parameters.contains_key("weight"));
        assert_eq!(graph.inputs[0].name, "x");
        assert_eq!(graph.inputs[0].shape, vec![1, 2]);

        let metadata = converted.metadata.unwrap();
        assert_eq!(metadata.producer_name, PRODUCER_NAME);
        assert_eq!(metadata.opset_version, 17);
    }

    #[test]
    fn duplicate_initializer_names_keep_the_last_occurrence() {
        let graph = GraphProto {
            initializer: vec![int64_tensor("dup", &[1]), int64_tensor("dup", &[2])],
            ..Default::default()
        };
        let index = index_for(&graph);
        assert_eq!(int64_data(index.initializers["dup"]).unwrap(), vec![2]);
    }

    #[test]
    fn node_failure_is_wrapped_with_the_node_name() {
        let model = ModelProto {
            graph: Some(GraphProto {
                node: vec![node("Transpose", "bad_transpose", &[], &["out"])],
                ..Default::default()
            }),
            ..Default::default()
        };
        match convert_model(&model, None) {
            Err(ConvertError::Node { node, source }) => {
                assert_eq!(node, "bad_transpose");
                assert!(matches!(*source, ConvertError::NoTransposeInput));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
