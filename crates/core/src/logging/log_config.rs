use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,transports_dispatcher=debug`
    pub level: String,
    /// Output format for logs
    pub format: LogFormat,
    /// Whether to include file and line of the event
    pub include_location: bool,
}

/// Output format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
        }
    }
}

impl LogConfig {
    pub fn with_level<S: Into<String>>(level: S) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<()> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map_err(|e| anyhow::anyhow!("无效的日志级别 '{}': {}", self.level, e))?;
        Ok(())
    }
}
