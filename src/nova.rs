//! Nova graph format definitions.
//!
//! The lean protobuf representation consumed by the execution engine: a node
//! list, a name-keyed parameter map holding floating-point weights, value
//! infos for the graph boundary, and producer metadata. Integer constants do
//! not appear here; the converter inlines them into node attributes.

use prost::Message;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// File extension for serialized Nova models.
pub const NOVA_EXTENSION: &str = "nova";

/// Nova tensor data types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum DataType {
    Float32 = 0,
    Float16 = 1,
    Bfloat16 = 2,
    Float64 = 3,
    Int32 = 4,
    Int64 = 5,
    Int8 = 6,
    Uint8 = 7,
}

impl DataType {
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Float16,
            2 => Self::Bfloat16,
            3 => Self::Float64,
            4 => Self::Int32,
            5 => Self::Int64,
            6 => Self::Int8,
            7 => Self::Uint8,
            _ => Self::Float32,
        }
    }
}

/// Per-tensor quantization parameters.
#[derive(Clone, PartialEq, Message)]
pub struct Quantization {
    #[prost(float, tag = "1")]
    pub scale: f32,
    #[prost(int64, tag = "2")]
    pub zero_point: i64,
}

/// A constant tensor: dtype tag, shape, little-endian payload, and optional
/// quantization parameters.
#[derive(Clone, PartialEq, Message)]
pub struct Tensor {
    #[prost(int32, tag = "1")]
    pub dtype: i32,
    #[prost(int64, repeated, tag = "2")]
    pub shape: Vec<i64>,
    #[prost(bytes = "vec", tag = "3")]
    pub data: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub quant: Option<Quantization>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FloatList {
    #[prost(float, repeated, tag = "1")]
    pub val: Vec<f32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct IntList {
    #[prost(int64, repeated, tag = "1")]
    pub val: Vec<i64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct StringList {
    #[prost(string, repeated, tag = "1")]
    pub val: Vec<String>,
}

/// A node attribute: scalar or list value.
#[derive(Clone, PartialEq, Message)]
pub struct Attribute {
    #[prost(oneof = "attribute::Value", tags = "1, 2, 3, 4, 5, 6")]
    pub value: Option<attribute::Value>,
}

pub mod attribute {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Value {
        #[prost(float, tag = "1")]
        F(f32),
        #[prost(int64, tag = "2")]
        I(i64),
        #[prost(string, tag = "3")]
        S(String),
        #[prost(message, tag = "4")]
        Floats(super::FloatList),
        #[prost(message, tag = "5")]
        Ints(super::IntList),
        #[prost(message, tag = "6")]
        Strings(super::StringList),
    }
}

/// Name, dtype, and shape for a graph input or output.
#[derive(Clone, Message)]
pub struct ValueInfo {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub dtype: i32,
    #[prost(int64, repeated, tag = "3")]
    pub shape: Vec<i64>,
}

/// One operation in the graph.
#[derive(Clone, Message)]
pub struct Node {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub op_type: String,
    #[prost(string, repeated, tag = "3")]
    pub inputs: Vec<String>,
    #[prost(string, repeated, tag = "4")]
    pub outputs: Vec<String>,
    #[prost(map = "string, message", tag = "5")]
    pub attributes: HashMap<String, Attribute>,
}

impl Node {
    pub fn attr_i(&self, name: &str) -> Option<i64> {
        match self.attributes.get(name)?.value.as_ref()? {
            attribute::Value::I(v) => Some(*v),
            _ => None,
        }
    }

    pub fn attr_f(&self, name: &str) -> Option<f32> {
        match self.attributes.get(name)?.value.as_ref()? {
            attribute::Value::F(v) => Some(*v),
            _ => None,
        }
    }

    pub fn attr_s(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name)?.value.as_ref()? {
            attribute::Value::S(v) => Some(v),
            _ => None,
        }
    }

    pub fn attr_ints(&self, name: &str) -> Option<&[i64]> {
        match self.attributes.get(name)?.value.as_ref()? {
            attribute::Value::Ints(v) => Some(&v.val),
            _ => None,
        }
    }

    pub fn attr_floats(&self, name: &str) -> Option<&[f32]> {
        match self.attributes.get(name)?.value.as_ref()? {
            attribute::Value::Floats(v) => Some(&v.val),
            _ => None,
        }
    }
}

/// The converted graph: node list, float parameters, boundary value infos.
#[derive(Clone, Message)]
pub struct Graph {
    #[prost(message, repeated, tag = "1")]
    pub nodes: Vec<Node>,
    #[prost(map = "string, message", tag = "2")]
    pub parameters: HashMap<String, Tensor>,
    #[prost(message, repeated, tag = "3")]
    pub inputs: Vec<ValueInfo>,
    #[prost(message, repeated, tag = "4")]
    pub outputs: Vec<ValueInfo>,
}

/// Producer identity and source opset.
#[derive(Clone, Message)]
pub struct Metadata {
    #[prost(string, tag = "1")]
    pub producer_name: String,
    #[prost(string, tag = "2")]
    pub producer_version: String,
    #[prost(int64, tag = "3")]
    pub opset_version: i64,
}

/// A complete Nova model - the root message.
#[derive(Clone, Message)]
pub struct Model {
    #[prost(message, optional, tag = "1")]
    pub graph: Option<Graph>,
    #[prost(message, optional, tag = "2")]
    pub metadata: Option<Metadata>,
}

/// Load a Nova model from a file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Model> {
    let data = fs::read(path.as_ref())?;
    Ok(Model::decode(data.as_slice())?)
}

/// Write a Nova model to a file.
pub fn save<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
    fs::write(path.as_ref(), model.encode_to_vec())?;
    Ok(())
}
