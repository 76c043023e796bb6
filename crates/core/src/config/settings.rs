use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;
use crate::{OptimizerError, OptimizerResult};

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 8;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_FAILURE_PENALTY_MS: u64 = 60_000;
pub const DEFAULT_LATENCY_SMOOTHING: f64 = 0.5;

/// Knobs for resolution and composite dialing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Maximum depth of `Optimizer` entries nested inside each other
    pub max_nesting_depth: usize,
    /// Distinct candidates a composite tries per dial before giving up
    pub max_attempts: usize,
    /// Upper bound on a single candidate's dial
    pub attempt_timeout_ms: u64,
    /// Latency charged to a failed attempt by `minimizeDialDuration`
    pub failure_penalty_ms: u64,
    /// Weight of the newest sample in the latency estimate, in (0, 1]
    pub latency_smoothing: f64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            failure_penalty_ms: DEFAULT_FAILURE_PENALTY_MS,
            latency_smoothing: DEFAULT_LATENCY_SMOOTHING,
        }
    }
}

impl ResolverSettings {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn failure_penalty(&self) -> Duration {
        Duration::from_millis(self.failure_penalty_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(anyhow::anyhow!("max_nesting_depth必须大于0"));
        }
        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!("max_attempts必须大于0"));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(anyhow::anyhow!("attempt_timeout_ms必须大于0"));
        }
        if !(self.latency_smoothing > 0.0 && self.latency_smoothing <= 1.0) {
            return Err(anyhow::anyhow!(
                "latency_smoothing必须在(0, 1]范围内: {}",
                self.latency_smoothing
            ));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) as a construction-time error.
    pub fn check(&self) -> OptimizerResult<()> {
        self.validate()
            .map_err(|e| OptimizerError::config_error(format!("解析器配置无效: {e}")))
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizerSettings {
    pub resolver: ResolverSettings,
    pub logging: LogConfig,
}

impl OptimizerSettings {
    /// Load settings from an optional TOML file and environment variables
    ///
    /// Load order:
    /// 1. Built-in defaults
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: TRANSPORTS_, nesting separator: __)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = ResolverSettings::default();
        let log_defaults = LogConfig::default();

        let mut builder = ConfigBuilder::builder()
            .set_default("resolver.max_nesting_depth", defaults.max_nesting_depth as u64)?
            .set_default("resolver.max_attempts", defaults.max_attempts as u64)?
            .set_default("resolver.attempt_timeout_ms", defaults.attempt_timeout_ms)?
            .set_default("resolver.failure_penalty_ms", defaults.failure_penalty_ms)?
            .set_default("resolver.latency_smoothing", defaults.latency_smoothing)?
            .set_default("logging.level", log_defaults.level.clone())?
            .set_default("logging.format", log_defaults.format.as_str())?
            .set_default("logging.include_location", log_defaults.include_location)?;

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("TRANSPORTS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: OptimizerSettings = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let settings: OptimizerSettings = toml::from_str(toml_str).context("解析TOML配置失败")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.resolver.validate().context("解析器配置验证失败")?;
        self.logging.validate().context("日志配置验证失败")?;
        Ok(())
    }
}
