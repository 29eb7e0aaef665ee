//! Core type definitions shared by the framework-side model, the IR and the harness.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Logical element type of a tensor.
///
/// The names match the ones used by the frameworks the harness mirrors
/// (`float32`, `int32`, `bool`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit floating point.
    #[serde(rename = "float32")]
    F32,
    /// 16-bit floating point.
    #[serde(rename = "float16")]
    F16,
    /// Brain floating point.
    #[serde(rename = "bfloat16")]
    BF16,
    /// 64-bit floating point.
    #[serde(rename = "float64")]
    F64,
    /// 16-bit signed integer.
    #[serde(rename = "int16")]
    I16,
    /// 32-bit signed integer.
    #[serde(rename = "int32")]
    I32,
    /// 64-bit signed integer.
    #[serde(rename = "int64")]
    I64,
    /// 8-bit unsigned integer.
    #[serde(rename = "uint8")]
    U8,
    /// Boolean.
    #[serde(rename = "bool")]
    Bool,
}

impl DataType {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            DataType::F32 => "float32",
            DataType::F16 => "float16",
            DataType::BF16 => "bfloat16",
            DataType::F64 => "float64",
            DataType::I16 => "int16",
            DataType::I32 => "int32",
            DataType::I64 => "int64",
            DataType::U8 => "uint8",
            DataType::Bool => "bool",
        }
    }

    /// Whether this is a floating point type.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::F32 | DataType::F16 | DataType::BF16 | DataType::F64
        )
    }

    /// Whether this is a signed or unsigned integer type.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::I16 | DataType::I32 | DataType::I64 | DataType::U8
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float32" | "f32" => Ok(DataType::F32),
            "float16" | "f16" => Ok(DataType::F16),
            "bfloat16" | "bf16" => Ok(DataType::BF16),
            "float64" | "f64" => Ok(DataType::F64),
            "int16" | "i16" => Ok(DataType::I16),
            "int32" | "i32" => Ok(DataType::I32),
            "int64" | "i64" => Ok(DataType::I64),
            "uint8" | "u8" => Ok(DataType::U8),
            "bool" => Ok(DataType::Bool),
            other => Err(CoreError::UnsupportedDataType(other.to_string())),
        }
    }
}

/// Shape and element type of a value, without data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    /// Element type.
    pub dtype: DataType,
    /// Dimensions.
    pub shape: Vec<usize>,
}

impl TensorSpec {
    /// Create a new spec.
    pub fn new(dtype: DataType, shape: Vec<usize>) -> Self {
        Self { dtype, shape }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// Serializable tensor payload used for constants and initializers.
///
/// Values are stored widened to `f64`, which is exact for every integer the
/// harness produces and for all supported float types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorData {
    /// Element type.
    pub dtype: DataType,
    /// Dimensions.
    pub shape: Vec<usize>,
    /// Flattened row-major values.
    pub values: Vec<f64>,
}

/// Node attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NodeAttribute {
    /// Integer attribute.
    Int(i64),
    /// Float attribute.
    Float(f64),
    /// String attribute.
    String(String),
    /// Integer array attribute.
    IntArray(Vec<i64>),
    /// Float array attribute.
    FloatArray(Vec<f64>),
    /// Boolean attribute.
    Bool(bool),
}

impl NodeAttribute {
    /// Integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            NodeAttribute::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            NodeAttribute::Float(v) => Some(*v),
            NodeAttribute::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// String value, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeAttribute::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer array, if this is an `IntArray`.
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            NodeAttribute::IntArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

/// Unique identifier for graph nodes.
pub type NodeId = usize;

/// A node in a model graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique node identifier.
    pub id: NodeId,
    /// Operation type (an operator tag such as `aten::pad`, or an IR op such as `Pad`).
    pub op_type: String,
    /// Node attributes.
    #[serde(default)]
    pub attributes: HashMap<String, NodeAttribute>,
    /// Input tensor names.
    pub inputs: Vec<String>,
    /// Output tensor names.
    pub outputs: Vec<String>,
    /// Optional node name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An edge connecting two nodes through a named tensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Producing node.
    pub from_node: NodeId,
    /// Consuming node.
    pub to_node: NodeId,
    /// Name of the tensor carried by the edge.
    pub tensor_name: String,
}

/// A model graph: nodes, edges and the graph's boundary tensors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelGraph {
    /// Nodes in insertion order.
    pub nodes: Vec<GraphNode>,
    /// Edges derived from tensor names.
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    /// Graph input tensor names.
    pub inputs: Vec<String>,
    /// Graph output tensor names.
    pub outputs: Vec<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
