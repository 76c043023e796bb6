use std::fmt;

use tracing::{debug, warn};

use transports_core::{ProviderError, ProviderKind};

/// A leaf protocol's server-side configuration.
pub trait ServerConfig: fmt::Debug + Sized {
    const KIND: ProviderKind;

    fn parse(raw: &[u8]) -> Result<Self, ProviderError>;
}

/// 解析服务端配置
pub fn parse_server_config<S: ServerConfig>(raw: &[u8]) -> Result<S, ProviderError> {
    let config = S::parse(raw).inspect_err(|e| {
        warn!("{} 服务端配置解析失败: {}", S::KIND, e);
    })?;
    debug!("{} 服务端配置解析成功", S::KIND);
    Ok(config)
}
