use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use transports_core::{ProviderError, ProviderKind};

use crate::carrier::{require_non_empty, ClientConfig, LeafProvider};
use crate::server::ServerConfig;

/// Replicant的外层JSON：`{"config": <base64编码的配置>}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicantClientJsonConfig {
    #[serde(alias = "Config")]
    pub config: String,
}

/// Replicant客户端配置
///
/// `toneburst` and `polish` are carried opaquely for the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicantClientConfig {
    pub server_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toneburst: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polish: Option<Value>,
}

fn invalid(message: String) -> ProviderError {
    ProviderError::invalid_config(ProviderKind::Replicant.as_str(), message)
}

/// Wrap a config in the `{"config": <base64 JSON>}` form.
fn wrap<T: Serialize>(config: &T) -> Result<String, ProviderError> {
    let inner = serde_json::to_vec(config)?;
    let outer = ReplicantClientJsonConfig {
        config: STANDARD.encode(inner),
    };
    Ok(serde_json::to_string(&outer)?)
}

/// Undo [`wrap`]: read the outer object, then decode and parse the payload.
fn unwrap_payload<T: DeserializeOwned>(raw: &[u8]) -> Result<T, ProviderError> {
    let outer: ReplicantClientJsonConfig = serde_json::from_slice(raw)
        .map_err(|e| invalid(format!("could not unmarshal Replicant args: {e}")))?;
    let inner = STANDARD
        .decode(outer.config.trim())
        .map_err(|e| invalid(format!("config不是合法的base64: {e}")))?;
    serde_json::from_slice(&inner).map_err(|e| invalid(format!("could not parse config: {e}")))
}

fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(u8::is_ascii_whitespace)
}

impl ReplicantClientConfig {
    /// Produce the `{"config": ...}` wrapper this provider parses.
    pub fn encode(&self) -> Result<String, ProviderError> {
        wrap(self)
    }
}

impl ClientConfig for ReplicantClientConfig {
    const KIND: ProviderKind = ProviderKind::Replicant;

    fn parse(raw: &[u8]) -> Result<Self, ProviderError> {
        if is_blank(raw) {
            return Err(invalid(
                "must specify transport options when using replicant".to_string(),
            ));
        }

        let config: ReplicantClientConfig = unwrap_payload(raw)?;
        require_non_empty(Self::KIND, "serverAddress", &config.server_address)?;
        Ok(config)
    }

    fn server_address(&self) -> &str {
        &self.server_address
    }
}

pub type ReplicantProvider = LeafProvider<ReplicantClientConfig>;

/// Replicant服务端配置
///
/// Empty input yields the default server: no toneburst, no polish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicantServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toneburst: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polish: Option<Value>,
}

impl ReplicantServerConfig {
    pub fn encode(&self) -> Result<String, ProviderError> {
        wrap(self)
    }
}

impl ServerConfig for ReplicantServerConfig {
    const KIND: ProviderKind = ProviderKind::Replicant;

    fn parse(raw: &[u8]) -> Result<Self, ProviderError> {
        if is_blank(raw) {
            return Ok(Self::default());
        }
        unwrap_payload(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::parse_server_config;
    use serde_json::json;

    fn sample() -> ReplicantClientConfig {
        ReplicantClientConfig {
            server_address: "127.0.0.1:2222".to_string(),
            toneburst: Some(json!({"addSequences": [], "removeSequences": []})),
            polish: None,
        }
    }

    #[test]
    fn test_parse_encoded_config() {
        let encoded = sample().encode().unwrap();
        let parsed = ReplicantClientConfig::parse(encoded.as_bytes()).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_parse_rejects_empty_args() {
        let err = ReplicantClientConfig::parse(b"").unwrap_err();
        assert!(err.to_string().contains("must specify transport options"));
    }

    #[test]
    fn test_parse_rejects_bad_base64() {
        let err = ReplicantClientConfig::parse(br#"{"config": "not base64!"}"#).unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_empty_server_args_give_default_server() {
        let config: ReplicantServerConfig = parse_server_config(b"").unwrap();
        assert_eq!(config, ReplicantServerConfig::default());
        assert!(config.toneburst.is_none() && config.polish.is_none());
    }

    #[test]
    fn test_parse_encoded_server_config() {
        let server = ReplicantServerConfig {
            toneburst: Some(json!({"addSequences": [], "removeSequences": []})),
            polish: Some(json!({"serverKey": "abc"})),
        };
        let encoded = server.encode().unwrap();
        let parsed: ReplicantServerConfig = parse_server_config(encoded.as_bytes()).unwrap();
        assert_eq!(parsed, server);

        let err = parse_server_config::<ReplicantServerConfig>(b"{").unwrap_err();
        assert!(err.to_string().contains("could not unmarshal Replicant args"));
    }

    #[test]
    fn test_parse_rejects_missing_wrapper() {
        assert!(ReplicantClientConfig::parse(br#"{"serverAddress": "127.0.0.1:2222"}"#).is_err());
    }
}
