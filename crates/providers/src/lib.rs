//! Built-in leaf providers.
//!
//! Each provider parses its protocol's client configuration and produces a
//! [`CarrierDialer`] that opens the carrier connection through the supplied
//! [`transports_core::DialContext`] and then runs the protocol [`Handshake`].
//! Server-side configs are read with [`parse_server_config`].

pub mod carrier;
pub mod replicant;
pub mod server;
pub mod shadow;
pub mod starbridge;

pub use carrier::{
    CarrierDialer, ClientConfig, Handshake, LeafProvider, PlainHandshake, TcpDialContext,
};
pub use replicant::{
    ReplicantClientConfig, ReplicantClientJsonConfig, ReplicantProvider, ReplicantServerConfig,
};
pub use server::{parse_server_config, ServerConfig};
pub use shadow::{ShadowClientConfig, ShadowProvider, ShadowServerConfig, SHADOW_CIPHERS};
pub use starbridge::{StarbridgeClientConfig, StarbridgeProvider, StarbridgeServerConfig};
