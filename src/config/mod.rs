//! Configuration module

pub mod sentinel_config;
pub mod tls_config;

pub use sentinel_config::{AuthConfig, SentinelConfig, ServerAddress};
pub use tls_config::TlsConfig;
