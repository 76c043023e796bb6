use serde::{Deserialize, Serialize};

use transports_core::{ProviderError, ProviderKind};

use crate::carrier::{require_non_empty, ClientConfig, LeafProvider};
use crate::server::ServerConfig;

/// Starbridge客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarbridgeClientConfig {
    pub server_address: String,
    pub server_persistent_public_key: String,
}

impl ClientConfig for StarbridgeClientConfig {
    const KIND: ProviderKind = ProviderKind::Starbridge;

    fn parse(raw: &[u8]) -> Result<Self, ProviderError> {
        let config: StarbridgeClientConfig = serde_json::from_slice(raw).map_err(|e| {
            ProviderError::invalid_config(
                Self::KIND.as_str(),
                format!("options json decoding error: {e}"),
            )
        })?;

        require_non_empty(Self::KIND, "serverAddress", &config.server_address)?;
        require_non_empty(
            Self::KIND,
            "serverPersistentPublicKey",
            &config.server_persistent_public_key,
        )?;
        Ok(config)
    }

    fn server_address(&self) -> &str {
        &self.server_address
    }
}

pub type StarbridgeProvider = LeafProvider<StarbridgeClientConfig>;

/// Starbridge服务端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarbridgeServerConfig {
    pub server_address: String,
    pub server_private_key: String,
}

impl ServerConfig for StarbridgeServerConfig {
    const KIND: ProviderKind = ProviderKind::Starbridge;

    fn parse(raw: &[u8]) -> Result<Self, ProviderError> {
        let config: StarbridgeServerConfig = serde_json::from_slice(raw).map_err(|e| {
            ProviderError::invalid_config(
                Self::KIND.as_str(),
                format!("server options json decoding error: {e}"),
            )
        })?;

        require_non_empty(Self::KIND, "serverAddress", &config.server_address)?;
        require_non_empty(Self::KIND, "serverPrivateKey", &config.server_private_key)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::parse_server_config;

    #[test]
    fn test_parse_valid_config() {
        let config = StarbridgeClientConfig::parse(
            br#"{"serverAddress": "10.0.0.1:1234", "serverPersistentPublicKey": "d089c225"}"#,
        )
        .unwrap();
        assert_eq!(config.server_persistent_public_key, "d089c225");
    }

    #[test]
    fn test_parse_requires_public_key() {
        let err =
            StarbridgeClientConfig::parse(br#"{"serverAddress": "10.0.0.1:1234"}"#).unwrap_err();
        assert!(err.to_string().contains("Starbridge"));
    }

    #[test]
    fn test_parse_server_config() {
        let config: StarbridgeServerConfig = parse_server_config(
            br#"{"serverAddress": "0.0.0.0:1234", "serverPrivateKey": "3077020101"}"#,
        )
        .unwrap();
        assert_eq!(config.server_private_key, "3077020101");

        let missing_key = br#"{"serverAddress": "0.0.0.0:1"}"#;
        let err = parse_server_config::<StarbridgeServerConfig>(missing_key).unwrap_err();
        assert!(err.to_string().contains("server options json decoding error"));
    }
}
