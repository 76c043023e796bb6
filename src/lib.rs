//! Configuration-driven transport selection.
//!
//! A document of the form
//!
//! ```text
//! {"transports": [{"name": "shadow", "config": {...}}, ...], "strategy": "rotate"}
//! ```
//!
//! is resolved into a single [`CompositeDialer`] that picks among the
//! configured transports on every dial.

use std::sync::Arc;

pub use transports_core::{
    init_logging, ConfigNode, Connection, DialContext, DialError, DialOutcome, DialStrategy,
    Dialer, LogConfig, OptimizerError, OptimizerResult, OptimizerSettings, ProviderError,
    ProviderKind, ResolverSettings, StrategyKind, TransportProvider,
};
pub use transports_dispatcher::{
    build_strategy, CompositeDialer, ProviderRegistry, TransportResolver,
};
pub use transports_providers::{
    parse_server_config, Handshake, PlainHandshake, ReplicantClientConfig, ReplicantProvider,
    ReplicantServerConfig, ServerConfig, ShadowClientConfig, ShadowProvider, ShadowServerConfig,
    StarbridgeClientConfig, StarbridgeProvider, StarbridgeServerConfig, TcpDialContext,
};

/// Names of the registered transport protocols, in registration order.
pub fn transports() -> Vec<&'static str> {
    ProviderKind::ALL.iter().map(ProviderKind::as_str).collect()
}

/// Build a composite dialer from a JSON document with the built-in
/// providers and default settings.
pub fn parse_optimizer(
    json: &str,
    dial_context: Arc<dyn DialContext>,
) -> OptimizerResult<Arc<CompositeDialer>> {
    TransportResolver::default().parse_client_config(json.as_bytes(), dial_context)
}

/// Like [`parse_optimizer`], with settings loaded by the caller.
pub fn parse_optimizer_with(
    json: &str,
    dial_context: Arc<dyn DialContext>,
    settings: &OptimizerSettings,
) -> OptimizerResult<Arc<CompositeDialer>> {
    TransportResolver::new(ProviderRegistry::default(), settings.resolver.clone())
        .parse_client_config(json.as_bytes(), dial_context)
}
