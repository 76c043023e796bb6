use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{encode, node_kind, ConfigNode};
use crate::{OptimizerError, OptimizerResult};

/// 已注册的传输提供者（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Shadow,
    Replicant,
    Starbridge,
    Optimizer,
}

impl ProviderKind {
    /// Registration order, which is also the order `transports()` reports.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Shadow,
        ProviderKind::Replicant,
        ProviderKind::Starbridge,
        ProviderKind::Optimizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Shadow => "shadow",
            ProviderKind::Replicant => "Replicant",
            ProviderKind::Starbridge => "Starbridge",
            ProviderKind::Optimizer => "Optimizer",
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, ProviderKind::Optimizer)
    }
}

impl FromStr for ProviderKind {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or(())
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 组合传输的配置：顶层输入与嵌套的 `Optimizer` 条目共用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub transports: Vec<ConfigNode>,
    pub strategy: String,
}

/// 单个传输条目：`{"name": <provider>, "config": {...}}`
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSpec {
    pub kind: ProviderKind,
    /// Always a JSON object; opaque to everything but the named provider.
    pub config: ConfigNode,
}

impl TransportSpec {
    /// Interpret the entry at `index` of a transport list.
    pub fn from_node(index: usize, node: &ConfigNode) -> OptimizerResult<Self> {
        let entry = node
            .as_object()
            .ok_or(OptimizerError::UnsupportedEntryType {
                index,
                found: node_kind(node),
            })?;

        let kind = match entry.get("name") {
            Some(Value::String(name)) => {
                name.parse::<ProviderKind>()
                    .map_err(|_| OptimizerError::UnknownProvider {
                        index,
                        name: Some(name.clone()),
                    })?
            }
            Some(other) => {
                return Err(OptimizerError::UnknownProvider {
                    index,
                    name: Some(other.to_string()),
                })
            }
            None => return Err(OptimizerError::UnknownProvider { index, name: None }),
        };

        let config = match entry.get("config") {
            Some(config @ Value::Object(_)) => config.clone(),
            _ => {
                return Err(OptimizerError::MissingConfig {
                    index,
                    provider: kind.as_str().to_string(),
                })
            }
        };

        Ok(Self { kind, config })
    }

    /// The `config` object in the byte form a provider parser consumes.
    pub fn config_bytes(&self) -> OptimizerResult<Vec<u8>> {
        encode(&self.config)
    }
}
