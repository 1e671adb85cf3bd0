//! Sentinel discovery client
//!
//! This module provides:
//! - Failover-tolerant command execution across the configured sentinels
//! - Master address and replica discovery for a named replica set
//! - Post-connect role verification for resolved data nodes

pub mod client;
pub mod replica;
pub mod role;

pub use client::SentinelClient;
pub use replica::{replica_addresses, ReplicaInfo};
pub use role::{verify_role, ServerRole};
