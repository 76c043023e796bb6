//! Transport resolution and composite dialing.
//!
//! [`TransportResolver`] turns a transport list into ordered dialers,
//! [`build_strategy`] maps a strategy name onto a selection policy, and
//! [`CompositeDialer`] ties the two together behind the `Dialer` interface.

pub mod composite;
pub mod resolver;
pub mod strategies;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use composite::CompositeDialer;
pub use resolver::{ProviderRegistry, TransportResolver};
pub use strategies::*;
