pub mod dialer;
pub mod provider;
pub mod strategy;

pub use dialer::*;
pub use provider::*;
pub use strategy::*;
