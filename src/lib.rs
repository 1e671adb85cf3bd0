//! valkey-sentinel - Failover-aware Sentinel discovery client
//!
//! This crate answers topology questions against a Sentinel monitor tier:
//! which node is currently the master of a named replica set, and which
//! nodes are its replicas. The client holds a single lazily-dialed
//! connection to one sentinel, rotates across the configured addresses when
//! that sentinel fails, and retries the same logical request until every
//! address has been tried once.

pub mod client;
pub mod config;
pub mod sentinel;
pub mod utils;

pub use config::{AuthConfig, SentinelConfig, ServerAddress, TlsConfig};
pub use sentinel::{replica_addresses, verify_role, ReplicaInfo, SentinelClient, ServerRole};
pub use utils::{Result, SentinelError};
