//! Sentinel client configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::SentinelError;

use super::tls_config::TlsConfig;

/// Resolved server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ServerAddress {
    type Err = SentinelError;

    /// Parse `"host:port"`. The split is on the last colon so bare IPv6
    /// addresses keep their colons in the host part.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(2, ':');
        let port = parts
            .next()
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(|| SentinelError::Config(format!("invalid server address {:?}", s)))?;
        let host = parts
            .next()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SentinelError::Config(format!("invalid server address {:?}", s)))?;

        Ok(Self::new(host, port))
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub password: String,
    /// ACL username; legacy requirepass auth when absent
    pub username: Option<String>,
}

/// Complete sentinel client configuration
///
/// Everything except `addresses` applies uniformly to every dial attempt.
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    /// Sentinel addresses, tried in order on failure
    pub addresses: Vec<ServerAddress>,
    pub auth: Option<AuthConfig>,
    pub tls: Option<TlsConfig>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            auth: None,
            tls: None,
            // Sentinel client guidelines call for short per-operation
            // timeouts: the worst case for one logical request is
            // (number of addresses) x (per-attempt timeout).
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_millis(500),
            write_timeout: Duration::from_millis(500),
        }
    }
}

impl SentinelConfig {
    /// Configuration with default timeouts for the given addresses.
    pub fn new(addresses: Vec<ServerAddress>) -> Self {
        Self {
            addresses,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// An empty address list is rejected here so the retry loop never has
    /// to handle a zero-attempt request.
    pub fn validate(&self) -> Result<(), SentinelError> {
        if self.addresses.is_empty() {
            return Err(SentinelError::Config(
                "at least one sentinel address is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr: ServerAddress = "127.0.0.1:26379".parse().unwrap();
        assert_eq!(addr.host, "127.0.0.1");
        assert_eq!(addr.port, 26379);
        assert_eq!(addr.to_string(), "127.0.0.1:26379");
    }

    #[test]
    fn test_parse_ipv6_address() {
        let addr: ServerAddress = "::1:26379".parse().unwrap();
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.port, 26379);
    }

    #[test]
    fn test_parse_rejects_missing_port() {
        assert!("sentinel-host".parse::<ServerAddress>().is_err());
        assert!("sentinel-host:".parse::<ServerAddress>().is_err());
        assert!(":26379".parse::<ServerAddress>().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_addresses() {
        let config = SentinelConfig::default();
        assert!(matches!(
            config.validate().unwrap_err(),
            SentinelError::Config(_)
        ));
    }

    #[test]
    fn test_default_timeouts_are_short() {
        let config = SentinelConfig::new(vec![ServerAddress::new("127.0.0.1", 26379)]);
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.read_timeout, Duration::from_millis(500));
        assert_eq!(config.write_timeout, Duration::from_millis(500));
    }
}
