use std::sync::Arc;

use crate::traits::{DialContext, Dialer};
use crate::ProviderError;

/// 传输提供者：把协议自己的客户端配置解析为拨号器
pub trait TransportProvider: Send + Sync {
    fn name(&self) -> &str;

    fn parse_client_config(
        &self,
        config: &[u8],
        dial_context: Arc<dyn DialContext>,
    ) -> Result<Arc<dyn Dialer>, ProviderError>;
}
