pub mod decoder;
pub mod settings;

pub use decoder::{decode, decode_as, encode, node_kind, ConfigNode};
pub use settings::{OptimizerSettings, ResolverSettings};
