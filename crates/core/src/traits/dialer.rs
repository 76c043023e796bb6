//! 拨号器接口定义
//!
//! ## 核心概念
//!
//! ### Dialer
//! 能够尝试建立连接的能力。叶子提供者和组合拨号器都实现该接口，
//! 因此组合拨号器可以作为普通传输嵌套在另一个组合之中。
//!
//! ### DialContext
//! 由使用方提供的底层连接能力，原样传递给每个提供者，
//! 也原样传入嵌套的组合解析。

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::DialResult;

/// A bidirectional byte stream.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> AsyncStream for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// An established connection.
pub type Connection = Box<dyn AsyncStream>;

#[async_trait]
pub trait Dialer: Send + Sync {
    /// Diagnostic label; not required to be unique.
    fn name(&self) -> &str;

    /// Total time one `dial` may take when the dialer bounds itself, as a
    /// composite with its own per-attempt timeouts does. `None` leaves the
    /// bound to the caller.
    fn dial_budget(&self) -> Option<Duration> {
        None
    }

    /// Attempt a connection to `address`.
    ///
    /// Dropping the returned future cancels the attempt.
    async fn dial(&self, address: &str) -> DialResult<Connection>;
}

/// Low-level connection establishment used by providers for the carrier stream.
#[async_trait]
pub trait DialContext: Send + Sync {
    async fn connect(&self, address: &str) -> DialResult<Connection>;
}
