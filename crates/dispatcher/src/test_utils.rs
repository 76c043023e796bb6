//! In-memory dialers, dial contexts and providers for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use transports_core::{
    Connection, DialContext, DialError, DialResult, Dialer, ProviderError, TransportProvider,
};

use crate::resolver::ProviderRegistry;

/// A dialer that succeeds or fails on demand and counts its attempts.
pub struct MockDialer {
    name: String,
    failing: AtomicBool,
    delay: Duration,
    dial_count: AtomicUsize,
}

impl MockDialer {
    pub fn succeeding<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            failing: AtomicBool::new(false),
            delay: Duration::ZERO,
            dial_count: AtomicUsize::new(0),
        }
    }

    pub fn failing<S: Into<String>>(name: S) -> Self {
        let dialer = Self::succeeding(name);
        dialer.set_failing(true);
        dialer
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn dial_count(&self) -> usize {
        self.dial_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dialer for MockDialer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn dial(&self, _address: &str) -> DialResult<Connection> {
        self.dial_count.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into());
        }
        let (near, _far) = tokio::io::duplex(64);
        Ok(Box::new(near))
    }
}

/// Hands out in-memory pipes and counts carrier connections.
#[derive(Default)]
pub struct MockDialContext {
    connects: AtomicUsize,
}

impl MockDialContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DialContext for MockDialContext {
    async fn connect(&self, _address: &str) -> DialResult<Connection> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let (near, _far) = tokio::io::duplex(64);
        Ok(Box::new(near))
    }
}

#[derive(Deserialize)]
struct MockConfig {
    label: String,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    failing: bool,
}

/// Provider whose config is `{"label": "...", "invalid"?: bool, "failing"?: bool}`.
///
/// Dialers it builds are named `<provider>:<label>` and dial through the
/// supplied context.
pub struct MockProvider {
    name: String,
    built: AtomicUsize,
}

impl MockProvider {
    pub fn new<S: Into<String>>(name: S) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            built: AtomicUsize::new(0),
        })
    }

    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

struct ContextDialer {
    name: String,
    failing: bool,
    dial_context: Arc<dyn DialContext>,
}

#[async_trait]
impl Dialer for ContextDialer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn dial(&self, address: &str) -> DialResult<Connection> {
        if self.failing {
            return Err(DialError::handshake(&self.name, "scripted failure"));
        }
        self.dial_context.connect(address).await
    }
}

impl TransportProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse_client_config(
        &self,
        config: &[u8],
        dial_context: Arc<dyn DialContext>,
    ) -> Result<Arc<dyn Dialer>, ProviderError> {
        let config: MockConfig = serde_json::from_slice(config)?;
        if config.invalid {
            return Err(ProviderError::invalid_config(&self.name, "marked invalid"));
        }
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ContextDialer {
            name: format!("{}:{}", self.name, config.label),
            failing: config.failing,
            dial_context,
        }))
    }
}

/// Registry of [`MockProvider`]s, one per leaf kind.
pub struct MockProviders {
    pub shadow: Arc<MockProvider>,
    pub replicant: Arc<MockProvider>,
    pub starbridge: Arc<MockProvider>,
}

impl MockProviders {
    pub fn new() -> Self {
        Self {
            shadow: MockProvider::new("shadow"),
            replicant: MockProvider::new("Replicant"),
            starbridge: MockProvider::new("Starbridge"),
        }
    }

    pub fn registry(&self) -> ProviderRegistry {
        ProviderRegistry::new(
            self.shadow.clone(),
            self.replicant.clone(),
            self.starbridge.clone(),
        )
    }

    pub fn total_built(&self) -> usize {
        self.shadow.built() + self.replicant.built() + self.starbridge.built()
    }
}

impl Default for MockProviders {
    fn default() -> Self {
        Self::new()
    }
}
