//! Experimental execution-graph construction.
//!
//! Instantiates layer descriptions from a converted model via a statically
//! built operator table: a match from op-type to a pure constructor function,
//! with no registration side effects and no mutable state. Covers a handful
//! of layer kinds and produces descriptions only; binding them to a compute
//! backend is the execution engine's job.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::convert;
use crate::error::{ConvertError, Result};
use crate::nova;
use crate::onnx;

/// An instantiated layer description.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Relu,
    Sigmoid,
    Tanh,
    Reshape { shape: Vec<i64> },
    Transpose { perm: Vec<i64> },
    Dense { weights: String, bias: Option<String> },
}

/// A layer bound to its node's name and data flow.
#[derive(Debug, Clone)]
pub struct BuiltLayer {
    pub name: String,
    pub op_type: String,
    pub layer: Layer,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// The instantiated graph: layers in node order plus the boundary names.
#[derive(Debug)]
pub struct ExecutionGraph {
    pub layers: Vec<BuiltLayer>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

type Constructor = fn(&nova::Node, &HashMap<String, nova::Tensor>) -> Result<Layer>;

/// Static operator table. A match rather than a registry: dispatch is fixed
/// at compile time and shared freely across conversions.
fn constructor_for(op_type: &str) -> Option<Constructor> {
    match op_type {
        "Relu" | "ReLU" => Some(new_relu),
        "Sigmoid" => Some(new_sigmoid),
        "Tanh" => Some(new_tanh),
        "Reshape" => Some(new_reshape),
        "Transpose" => Some(new_transpose),
        "Dense" | "Gemm" => Some(new_dense),
        _ => None,
    }
}

impl ExecutionGraph {
    /// Instantiate layers from a converted model.
    pub fn build(model: &nova::Model) -> Result<Self> {
        let graph = model.graph.as_ref().ok_or(ConvertError::MissingGraph)?;

        let mut layers = Vec::with_capacity(graph.nodes.len());
        let mut produced: HashSet<&str> =
            graph.inputs.iter().map(|vi| vi.name.as_str()).collect();

        for node in &graph.nodes {
            let constructor = constructor_for(node.op_type.as_str())
                .ok_or_else(|| ConvertError::UnsupportedOp(node.op_type.clone()))?;
            let layer = constructor(node, &graph.parameters).map_err(|e| ConvertError::Node {
                node: node.name.clone(),
                source: Box::new(e),
            })?;
            for output in &node.outputs {
                produced.insert(output.as_str());
            }
            layers.push(BuiltLayer {
                name: node.name.clone(),
                op_type: node.op_type.clone(),
                layer,
                inputs: node.inputs.clone(),
                outputs: node.outputs.clone(),
            });
        }

        let outputs: Vec<String> = graph.outputs.iter().map(|vi| vi.name.clone()).collect();
        for output in &outputs {
            if !produced.contains(output.as_str()) {
                return Err(ConvertError::MissingOutput(output.clone()));
            }
        }

        Ok(Self {
            layers,
            inputs: graph.inputs.iter().map(|vi| vi.name.clone()).collect(),
            outputs,
        })
    }

    /// Convert a source model and instantiate it in one step.
    ///
    /// Layer instantiation cannot afford the silent attribute drops plain
    /// conversion tolerates, so source attributes are checked strictly first.
    pub fn build_from_onnx(model: &onnx::ModelProto, model_path: Option<&Path>) -> Result<Self> {
        validate_source_attributes(model)?;
        let converted = convert::convert_model(model, model_path)?;
        Self::build(&converted)
    }
}

/// Reject any node attribute the converter would silently drop.
pub fn validate_source_attributes(model: &onnx::ModelProto) -> Result<()> {
    let Some(graph) = model.graph.as_ref() else {
        return Ok(());
    };
    for node in &graph.node {
        for attr in &node.attribute {
            convert::convert_attribute_strict(attr).map_err(|e| ConvertError::Node {
                node: node.name.clone(),
                source: Box::new(e),
            })?;
        }
    }
    Ok(())
}

fn new_relu(_node: &nova::Node, _params: &HashMap<String, nova::Tensor>) -> Result<Layer> {
    Ok(Layer::Relu)
}

fn new_sigmoid(_node: &nova::Node, _params: &HashMap<String, nova::Tensor>) -> Result<Layer> {
    Ok(Layer::Sigmoid)
}

fn new_tanh(_node: &nova::Node, _params: &HashMap<String, nova::Tensor>) -> Result<Layer> {
    Ok(Layer::Tanh)
}

fn new_reshape(node: &nova::Node, _params: &HashMap<String, nova::Tensor>) -> Result<Layer> {
    let shape = node
        .attr_ints("shape")
        .ok_or_else(|| ConvertError::MissingAttribute {
            op: node.op_type.clone(),
            attr: "shape",
        })?;
    Ok(Layer::Reshape {
        shape: shape.to_vec(),
    })
}

fn new_transpose(node: &nova::Node, _params: &HashMap<String, nova::Tensor>) -> Result<Layer> {
    let perm = node
        .attr_ints("perm")
        .ok_or_else(|| ConvertError::MissingAttribute {
            op: node.op_type.clone(),
            attr: "perm",
        })?;
    Ok(Layer::Transpose {
        perm: perm.to_vec(),
    })
}

/// Dense expects its weight (and optional bias) inputs to reference entries
/// in the parameter map.
fn new_dense(node: &nova::Node, params: &HashMap<String, nova::Tensor>) -> Result<Layer> {
    let weights = node
        .inputs
        .first()
        .ok_or_else(|| ConvertError::MissingParameter {
            op: node.op_type.clone(),
            param: "weights".to_string(),
        })?;
    if !params.contains_key(weights) {
        return Err(ConvertError::MissingParameter {
            op: node.op_type.clone(),
            param: weights.clone(),
        });
    }
    let bias = match node.inputs.get(1) {
        Some(name) => {
            if !params.contains_key(name) {
                return Err(ConvertError::MissingParameter {
                    op: node.op_type.clone(),
                    param: name.clone(),
                });
            }
            Some(name.clone())
        }
        None => None,
    };
    Ok(Layer::Dense {
        weights: weights.clone(),
        bias,
    })
}
