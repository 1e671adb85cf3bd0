//! TLS configuration

use std::path::PathBuf;

/// TLS settings applied to every dial attempt.
///
/// Only effective when the crate is built with the `native-tls-backend`
/// feature; dialing with TLS configured but the backend compiled out is a
/// connection error.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Accept invalid certificates and hostnames (testing only)
    pub skip_verify: bool,
    /// CA certificate for server verification (PEM)
    pub ca_cert: Option<PathBuf>,
    /// Client certificate for mutual TLS (PEM)
    pub client_cert: Option<PathBuf>,
    /// Client private key for mutual TLS (PKCS8 PEM)
    pub client_key: Option<PathBuf>,
    /// Server name override for SNI; defaults to the dialed host
    pub sni: Option<String>,
}
