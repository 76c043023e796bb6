use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use transports_core::{
    Connection, DialContext, DialError, DialResult, Dialer, ProviderError, ProviderKind,
    TransportProvider,
};

/// A leaf protocol's parsed client configuration.
pub trait ClientConfig: fmt::Debug + Send + Sync + Sized + 'static {
    const KIND: ProviderKind;

    /// Parse and validate the protocol's own JSON config.
    fn parse(raw: &[u8]) -> Result<Self, ProviderError>;

    /// Endpoint the carrier connection is opened to.
    fn server_address(&self) -> &str;
}

/// 协议握手接缝
///
/// 在载体连接建立之后执行协议自身的握手/混淆，
/// 并返回可供调用方使用的连接。混淆协议本身由外部实现提供。
#[async_trait]
pub trait Handshake<C: ClientConfig>: Send + Sync {
    async fn establish(
        &self,
        config: &C,
        carrier: Connection,
        target: &str,
    ) -> DialResult<Connection>;
}

/// Hands the carrier connection back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHandshake;

#[async_trait]
impl<C: ClientConfig> Handshake<C> for PlainHandshake {
    async fn establish(
        &self,
        _config: &C,
        carrier: Connection,
        _target: &str,
    ) -> DialResult<Connection> {
        Ok(carrier)
    }
}

/// 叶子拨号器：通过拨号上下文连接服务端，再交给协议握手
pub struct CarrierDialer<C: ClientConfig> {
    name: String,
    config: C,
    dial_context: Arc<dyn DialContext>,
    handshake: Arc<dyn Handshake<C>>,
}

impl<C: ClientConfig> CarrierDialer<C> {
    pub fn new(
        config: C,
        dial_context: Arc<dyn DialContext>,
        handshake: Arc<dyn Handshake<C>>,
    ) -> Self {
        Self {
            name: format!("{}@{}", C::KIND, config.server_address()),
            config,
            dial_context,
            handshake,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait]
impl<C: ClientConfig> Dialer for CarrierDialer<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn dial(&self, address: &str) -> DialResult<Connection> {
        let start = Instant::now();
        let carrier = self
            .dial_context
            .connect(self.config.server_address())
            .await?;
        let connection = self.handshake.establish(&self.config, carrier, address).await?;

        debug!(
            "{} 建立连接: target={}, 耗时={:?}",
            self.name,
            address,
            start.elapsed()
        );
        Ok(connection)
    }
}

/// 通用叶子提供者：解析协议配置并构建 [`CarrierDialer`]
pub struct LeafProvider<C: ClientConfig> {
    handshake: Arc<dyn Handshake<C>>,
    _config: PhantomData<fn() -> C>,
}

impl<C: ClientConfig> LeafProvider<C> {
    pub fn new() -> Self {
        Self::with_handshake(Arc::new(PlainHandshake))
    }

    pub fn with_handshake(handshake: Arc<dyn Handshake<C>>) -> Self {
        Self {
            handshake,
            _config: PhantomData,
        }
    }
}

impl<C: ClientConfig> Default for LeafProvider<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClientConfig> TransportProvider for LeafProvider<C> {
    fn name(&self) -> &str {
        C::KIND.as_str()
    }

    fn parse_client_config(
        &self,
        config: &[u8],
        dial_context: Arc<dyn DialContext>,
    ) -> Result<Arc<dyn Dialer>, ProviderError> {
        let config = C::parse(config).inspect_err(|e| {
            warn!("{} 配置解析失败: {}", C::KIND, e);
        })?;
        debug!("{} 配置解析成功: server={}", C::KIND, config.server_address());
        Ok(Arc::new(CarrierDialer::new(
            config,
            dial_context,
            self.handshake.clone(),
        )))
    }
}

/// Plain TCP carrier connections.
#[derive(Debug, Clone)]
pub struct TcpDialContext {
    connect_timeout: Duration,
}

impl TcpDialContext {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpDialContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl DialContext for TcpDialContext {
    async fn connect(&self, address: &str) -> DialResult<Connection> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| DialError::Timeout {
                dialer: format!("tcp@{address}"),
                after: self.connect_timeout,
            })??;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

/// Shared check for required string fields.
pub(crate) fn require_non_empty(
    kind: ProviderKind,
    field: &str,
    value: &str,
) -> Result<(), ProviderError> {
    if value.trim().is_empty() {
        return Err(ProviderError::invalid_config(
            kind.as_str(),
            format!("{field} 不能为空"),
        ));
    }
    Ok(())
}
