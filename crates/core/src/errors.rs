use std::time::Duration;

use thiserror::Error;

/// 组合拨号器构建期错误
///
/// 所有变体在构建期都是致命的：不重试，不产生部分组合结果。
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("配置解码错误: {0}")]
    Decode(String),

    #[error("不支持的传输条目类型: 索引 {index} 处为 {found}，需要对象")]
    UnsupportedEntryType { index: usize, found: &'static str },

    #[error("未知的传输提供者: 索引 {index} 处的名称 {name:?}")]
    UnknownProvider { index: usize, name: Option<String> },

    #[error("传输条目缺少config对象: 索引 {index} ({provider})")]
    MissingConfig { index: usize, provider: String },

    #[error("传输提供者 {provider} 构建失败: {cause}")]
    ProviderConstruction {
        provider: String,
        #[source]
        cause: ProviderError,
    },

    #[error("未知的选择策略: {name}")]
    UnknownStrategy { name: String },

    #[error("传输列表为空")]
    EmptyTransportList,

    #[error("组合传输嵌套超过上限 {limit}")]
    NestingTooDeep { limit: usize },

    #[error("配置错误: {0}")]
    Configuration(String),
}

pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;

impl OptimizerError {
    pub fn decode_error<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn unknown_strategy<S: Into<String>>(name: S) -> Self {
        Self::UnknownStrategy { name: name.into() }
    }
    pub fn provider_construction<S: Into<String>>(provider: S, cause: ProviderError) -> Self {
        Self::ProviderConstruction {
            provider: provider.into(),
            cause,
        }
    }
    /// Follow nested `Optimizer` construction failures down to the error
    /// that started them.
    pub fn root_cause(&self) -> &OptimizerError {
        match self {
            OptimizerError::ProviderConstruction {
                cause: ProviderError::Nested(inner),
                ..
            } => inner.root_cause(),
            other => other,
        }
    }
    pub fn user_message(&self) -> &str {
        match self {
            OptimizerError::Decode(_) => "传输配置不是合法的JSON",
            OptimizerError::UnsupportedEntryType { .. } => "传输列表中的条目必须是对象",
            OptimizerError::UnknownProvider { .. } => "传输名称未注册",
            OptimizerError::MissingConfig { .. } => "传输条目缺少config对象",
            OptimizerError::ProviderConstruction { .. } => "传输配置无法被对应协议解析",
            OptimizerError::UnknownStrategy { .. } => "选择策略名称无效",
            OptimizerError::EmptyTransportList => "至少需要配置一个传输",
            OptimizerError::NestingTooDeep { .. } => "组合传输嵌套层数过多",
            OptimizerError::Configuration(_) => "配置有误",
        }
    }
}

impl From<serde_json::Error> for OptimizerError {
    fn from(err: serde_json::Error) -> Self {
        OptimizerError::Decode(err.to_string())
    }
}

/// 传输提供者解析客户端配置时的错误
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} 配置无效: {message}")]
    InvalidConfig { provider: String, message: String },

    #[error("配置解码错误: {0}")]
    Decode(String),

    #[error(transparent)]
    Nested(Box<OptimizerError>),
}

impl ProviderError {
    pub fn invalid_config<P: Into<String>, S: Into<String>>(provider: P, msg: S) -> Self {
        Self::InvalidConfig {
            provider: provider.into(),
            message: msg.into(),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

impl From<OptimizerError> for ProviderError {
    fn from(err: OptimizerError) -> Self {
        ProviderError::Nested(Box::new(err))
    }
}

/// 单次拨号尝试的错误
#[derive(Debug, Error)]
pub enum DialError {
    #[error("网络错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("拨号超时: {dialer} 在 {after:?} 内未完成")]
    Timeout { dialer: String, after: Duration },

    #[error("握手失败: {dialer} - {message}")]
    Handshake { dialer: String, message: String },

    #[error("没有可用的传输")]
    NoCandidates,

    #[error("{attempts} 次拨号尝试全部失败, 最后一次: {last}")]
    Exhausted {
        attempts: usize,
        #[source]
        last: Box<DialError>,
    },
}

pub type DialResult<T> = std::result::Result<T, DialError>;

impl DialError {
    pub fn handshake<D: Into<String>, S: Into<String>>(dialer: D, msg: S) -> Self {
        Self::Handshake {
            dialer: dialer.into(),
            message: msg.into(),
        }
    }
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DialError::Io(_) | DialError::Timeout { .. } | DialError::Handshake { .. }
        )
    }
}
