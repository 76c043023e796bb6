pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::{decode, decode_as, encode, ConfigNode, OptimizerSettings, ResolverSettings};
pub use errors::*;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use models::{DialOutcome, OptimizerConfig, ProviderKind, StrategyKind, TransportSpec};
pub use traits::{AsyncStream, Connection, DialContext, DialStrategy, Dialer, TransportProvider};
