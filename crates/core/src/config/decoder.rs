use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{OptimizerError, OptimizerResult};

/// Generic configuration tree. Object member order follows the input.
pub type ConfigNode = Value;

/// Parse raw bytes into an untyped tree.
pub fn decode(raw: &[u8]) -> OptimizerResult<ConfigNode> {
    serde_json::from_slice(raw)
        .map_err(|e| OptimizerError::decode_error(format!("JSON解析失败: {e}")))
}

/// Parse raw bytes against a declared target type.
///
/// A field that decodes to the wrong JSON type (for example a numeric
/// `strategy`) fails the whole decode; nothing is returned partially.
pub fn decode_as<T: DeserializeOwned>(raw: &[u8]) -> OptimizerResult<T> {
    serde_json::from_slice(raw)
        .map_err(|e| OptimizerError::decode_error(format!("配置结构不匹配: {e}")))
}

/// Re-serialize a node into the byte form a provider parser consumes.
pub fn encode(node: &ConfigNode) -> OptimizerResult<Vec<u8>> {
    serde_json::to_vec(node)
        .map_err(|e| OptimizerError::decode_error(format!("JSON序列化失败: {e}")))
}

pub fn node_kind(node: &ConfigNode) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
