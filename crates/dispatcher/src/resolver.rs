use std::sync::Arc;

use tracing::{debug, info};

use transports_core::{
    decode_as, ConfigNode, DialContext, Dialer, OptimizerConfig, OptimizerError, OptimizerResult,
    ProviderError, ProviderKind, ResolverSettings, TransportProvider, TransportSpec,
};
use transports_providers::{ReplicantProvider, ShadowProvider, StarbridgeProvider};

use crate::composite::CompositeDialer;
use crate::strategies::build_strategy;

/// 叶子提供者注册表
///
/// One field per leaf [`ProviderKind`]; `Optimizer` entries are resolved by
/// [`TransportResolver`] itself.
#[derive(Clone)]
pub struct ProviderRegistry {
    shadow: Arc<dyn TransportProvider>,
    replicant: Arc<dyn TransportProvider>,
    starbridge: Arc<dyn TransportProvider>,
}

impl ProviderRegistry {
    pub fn new(
        shadow: Arc<dyn TransportProvider>,
        replicant: Arc<dyn TransportProvider>,
        starbridge: Arc<dyn TransportProvider>,
    ) -> Self {
        Self {
            shadow,
            replicant,
            starbridge,
        }
    }

    pub fn with_shadow(mut self, provider: Arc<dyn TransportProvider>) -> Self {
        self.shadow = provider;
        self
    }

    pub fn with_replicant(mut self, provider: Arc<dyn TransportProvider>) -> Self {
        self.replicant = provider;
        self
    }

    pub fn with_starbridge(mut self, provider: Arc<dyn TransportProvider>) -> Self {
        self.starbridge = provider;
        self
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(
            Arc::new(ShadowProvider::new()),
            Arc::new(ReplicantProvider::new()),
            Arc::new(StarbridgeProvider::new()),
        )
    }
}

/// 传输解析器：把传输列表解析为有序的拨号器列表，并构建组合拨号器
#[derive(Clone, Default)]
pub struct TransportResolver {
    registry: ProviderRegistry,
    settings: ResolverSettings,
}

impl TransportResolver {
    pub fn new(registry: ProviderRegistry, settings: ResolverSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Build a composite dialer from a `{"transports": [...], "strategy": "..."}` document.
    ///
    /// Settings are checked before anything is resolved.
    pub fn parse_client_config(
        &self,
        raw: &[u8],
        dial_context: Arc<dyn DialContext>,
    ) -> OptimizerResult<Arc<CompositeDialer>> {
        self.settings.check()?;
        self.parse_at_depth(raw, dial_context, 1)
    }

    /// Resolve a transport list in order. Fails on the first bad entry.
    pub fn resolve_all(
        &self,
        entries: &[ConfigNode],
        dial_context: Arc<dyn DialContext>,
    ) -> OptimizerResult<Vec<Arc<dyn Dialer>>> {
        self.settings.check()?;
        self.resolve_at_depth(entries, dial_context, 1)
    }

    fn parse_at_depth(
        &self,
        raw: &[u8],
        dial_context: Arc<dyn DialContext>,
        depth: usize,
    ) -> OptimizerResult<Arc<CompositeDialer>> {
        if depth > self.settings.max_nesting_depth {
            return Err(OptimizerError::NestingTooDeep {
                limit: self.settings.max_nesting_depth,
            });
        }

        let config: OptimizerConfig = decode_as(raw)?;
        if config.transports.is_empty() {
            return Err(OptimizerError::EmptyTransportList);
        }

        let dialers = self.resolve_at_depth(&config.transports, dial_context, depth)?;
        let strategy = build_strategy(&config.strategy, dialers.len(), &self.settings)?;
        let composite = CompositeDialer::new(dialers, strategy, &self.settings)?;

        info!(
            "组合传输构建完成: 策略={}, 传输数量={}, 嵌套深度={}",
            composite.strategy_name(),
            composite.len(),
            depth
        );
        Ok(Arc::new(composite))
    }

    fn resolve_at_depth(
        &self,
        entries: &[ConfigNode],
        dial_context: Arc<dyn DialContext>,
        depth: usize,
    ) -> OptimizerResult<Vec<Arc<dyn Dialer>>> {
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let spec = TransportSpec::from_node(index, entry)?;
                self.resolve_entry(index, &spec, dial_context.clone(), depth)
            })
            .collect()
    }

    fn resolve_entry(
        &self,
        index: usize,
        spec: &TransportSpec,
        dial_context: Arc<dyn DialContext>,
        depth: usize,
    ) -> OptimizerResult<Arc<dyn Dialer>> {
        let config = spec.config_bytes()?;
        debug!("解析传输条目 {}: {}", index, spec.kind);

        let dialer = match spec.kind {
            ProviderKind::Shadow => self.registry.shadow.parse_client_config(&config, dial_context),
            ProviderKind::Replicant => {
                self.registry.replicant.parse_client_config(&config, dial_context)
            }
            ProviderKind::Starbridge => {
                self.registry.starbridge.parse_client_config(&config, dial_context)
            }
            ProviderKind::Optimizer => self
                .parse_at_depth(&config, dial_context, depth + 1)
                .map(|composite| composite as Arc<dyn Dialer>)
                .map_err(ProviderError::from),
        };

        dialer.map_err(|cause| OptimizerError::provider_construction(spec.kind.as_str(), cause))
    }
}
