use serde::{Deserialize, Serialize};

use transports_core::{ProviderError, ProviderKind};

use crate::carrier::{require_non_empty, ClientConfig, LeafProvider};
use crate::server::ServerConfig;

pub const SHADOW_CIPHERS: [&str; 4] = [
    "chacha20-ietf-poly1305",
    "aes-128-gcm",
    "aes-256-gcm",
    "DarkStar",
];

/// shadow客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowClientConfig {
    pub password: String,
    pub cipher_name: String,
    pub server_address: String,
}

fn check_fields(
    password: &str,
    cipher_name: &str,
    server_address: &str,
) -> Result<(), ProviderError> {
    require_non_empty(ProviderKind::Shadow, "password", password)?;
    require_non_empty(ProviderKind::Shadow, "serverAddress", server_address)?;
    if !SHADOW_CIPHERS.contains(&cipher_name) {
        return Err(ProviderError::invalid_config(
            ProviderKind::Shadow.as_str(),
            format!("不支持的cipherName: {cipher_name}"),
        ));
    }
    Ok(())
}

impl ClientConfig for ShadowClientConfig {
    const KIND: ProviderKind = ProviderKind::Shadow;

    fn parse(raw: &[u8]) -> Result<Self, ProviderError> {
        let config: ShadowClientConfig = serde_json::from_slice(raw).map_err(|e| {
            ProviderError::invalid_config(
                Self::KIND.as_str(),
                format!("options json decoding error: {e}"),
            )
        })?;
        check_fields(&config.password, &config.cipher_name, &config.server_address)?;
        Ok(config)
    }

    fn server_address(&self) -> &str {
        &self.server_address
    }
}

pub type ShadowProvider = LeafProvider<ShadowClientConfig>;

/// shadow服务端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowServerConfig {
    pub password: String,
    pub cipher_name: String,
    pub server_address: String,
}

impl ServerConfig for ShadowServerConfig {
    const KIND: ProviderKind = ProviderKind::Shadow;

    fn parse(raw: &[u8]) -> Result<Self, ProviderError> {
        let config: ShadowServerConfig = serde_json::from_slice(raw).map_err(|e| {
            ProviderError::invalid_config(
                Self::KIND.as_str(),
                format!("server options json decoding error: {e}"),
            )
        })?;
        check_fields(&config.password, &config.cipher_name, &config.server_address)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::parse_server_config;

    #[test]
    fn test_parse_valid_config() {
        let config = ShadowClientConfig::parse(
            br#"{"password": "1234", "cipherName": "DarkStar", "serverAddress": "127.0.0.1:1234"}"#,
        )
        .unwrap();
        assert_eq!(config.cipher_name, "DarkStar");
        assert_eq!(config.server_address(), "127.0.0.1:1234");
    }

    #[test]
    fn test_parse_rejects_unknown_cipher() {
        let err = ShadowClientConfig::parse(
            br#"{"password": "1234", "cipherName": "rot13", "serverAddress": "127.0.0.1:1234"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("rot13"));
    }

    #[test]
    fn test_parse_server_config() {
        let config: ShadowServerConfig = parse_server_config(
            br#"{"password": "p", "cipherName": "aes-128-gcm", "serverAddress": "0.0.0.0:1"}"#,
        )
        .unwrap();
        assert_eq!(config.server_address, "0.0.0.0:1");

        let err = parse_server_config::<ShadowServerConfig>(b"password=1234").unwrap_err();
        assert!(err.to_string().contains("server options json decoding error"));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(ShadowClientConfig::parse(br#"{"password": "1234"}"#).is_err());
        assert!(ShadowClientConfig::parse(
            br#"{"password": "", "cipherName": "aes-128-gcm", "serverAddress": "127.0.0.1:1"}"#
        )
        .is_err());
    }
}
