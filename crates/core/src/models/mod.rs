//! # 数据模型
//!
//! 定义组合拨号器的核心数据结构：传输条目、提供者标识、策略标识和拨号结果。
//!
//! ## 核心模型
//!
//! ### TransportSpec - 传输条目
//! 从配置树中解析出的单个传输：`name` 鉴别字段被解析为封闭的
//! [`ProviderKind`] 枚举，`config` 保留为原始对象，仅由对应提供者解释。
//!
//! ### OptimizerConfig - 组合配置
//! `{"transports": [...], "strategy": "..."}`，顶层输入和嵌套的
//! `Optimizer` 条目使用同一结构。
//!
//! ### StrategyKind - 选择策略
//! `first`、`random`、`rotate`、`track`、`minimizeDialDuration` 五种策略的封闭集合。
//!
//! ### DialOutcome - 拨号结果
//! 每次尝试完成后回报给策略的成功/失败与耗时。
//!
//! ## 输入格式
//!
//! ```text
//! {
//!   "transports": [
//!     {"name": "shadow", "config": {
//!       "password": "...", "cipherName": "...", "serverAddress": "..."
//!     }},
//!     {"name": "Optimizer", "config": {"transports": [...], "strategy": "rotate"}}
//!   ],
//!   "strategy": "first"
//! }
//! ```

pub mod outcome;
pub mod strategy_kind;
pub mod transport_spec;

pub use outcome::*;
pub use strategy_kind::*;
pub use transport_spec::*;
