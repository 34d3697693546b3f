//! Human-readable model summaries.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::nova;
use crate::onnx::{self, DataType};

/// Print a summary of an ONNX model file.
pub fn inspect_onnx(path: &Path) -> Result<()> {
    let model = onnx::load_model(path)?;
    print_onnx_summary(&model);
    Ok(())
}

/// Print a summary of a Nova model file.
pub fn inspect_nova(path: &Path) -> Result<()> {
    let model = nova::load(path)?;
    print_nova_summary(&model);
    Ok(())
}

pub fn print_onnx_summary(model: &onnx::ModelProto) {
    println!("IR version: {}", model.ir_version);
    println!("Producer: {} {}", model.producer_name, model.producer_version);
    if let Some(opset) = model.opset_import.first() {
        println!("Opset: {}", opset.version);
    }

    let Some(graph) = model.graph.as_ref() else {
        println!("Model has no graph.");
        return;
    };

    println!("Graph: {}", graph.name);
    println!("\nInputs:");
    for input in &graph.input {
        println!(
            "  {} {:?} ({:?})",
            input.name,
            input.shape(),
            DataType::from_i32(input.elem_type())
        );
    }
    println!("\nOutputs:");
    for output in &graph.output {
        println!(
            "  {} {:?} ({:?})",
            output.name,
            output.shape(),
            DataType::from_i32(output.elem_type())
        );
    }

    println!("\nNodes: {}", graph.node.len());
    let mut op_counts: HashMap<&str, usize> = HashMap::new();
    for node in &graph.node {
        *op_counts.entry(node.op_type.as_str()).or_insert(0) += 1;
    }
    let mut ops: Vec<_> = op_counts.into_iter().collect();
    ops.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (op, count) in ops {
        println!("  {}: {}", op, count);
    }

    println!("\nInitializers: {}", graph.initializer.len());
    let total_bytes: usize = graph.initializer.iter().map(|t| t.raw_data.len()).sum();
    println!(
        "  Total embedded weight bytes: {} ({:.2} MB)",
        total_bytes,
        total_bytes as f64 / 1024.0 / 1024.0
    );
    if !graph.quantization_annotation.is_empty() {
        println!(
            "  Quantization annotations: {}",
            graph.quantization_annotation.len()
        );
    }
}

pub fn print_nova_summary(model: &nova::Model) {
    if let Some(metadata) = model.metadata.as_ref() {
        println!(
            "Producer: {} {}",
            metadata.producer_name, metadata.producer_version
        );
        println!("Opset: {}", metadata.opset_version);
    }

    let Some(graph) = model.graph.as_ref() else {
        println!("Model has no graph.");
        return;
    };

    println!("Nodes: {}", graph.nodes.len());
    println!("Parameters: {}", graph.parameters.len());

    println!("\nNodes:");
    for node in &graph.nodes {
        println!("- {} ({})", node.name, node.op_type);
        println!("  Inputs: {:?}", node.inputs);
        println!("  Outputs: {:?}", node.outputs);
        if !node.attributes.is_empty() {
            let mut names: Vec<_> = node.attributes.keys().collect();
            names.sort();
            println!("  Attributes:");
            for name in names {
                if let Some(value) = node.attributes[name].value.as_ref() {
                    println!("    - {}: {:?}", name, value);
                }
            }
        }
    }

    let mut names: Vec<_> = graph.parameters.keys().collect();
    names.sort();
    println!("\nParameters:");
    for name in names {
        let t = &graph.parameters[name];
        let quant = if t.quant.is_some() { " (quantized)" } else { "" };
        println!(
            "  {} {:?} ({:?}, {} bytes){}",
            name,
            t.shape,
            nova::DataType::from_i32(t.dtype),
            t.data.len(),
            quant
        );
    }
}
