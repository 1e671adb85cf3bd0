//! Error types for valkey-sentinel

use std::io;
use thiserror::Error;

use crate::sentinel::{ReplicaInfo, ServerRole};

/// Top-level client error
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No master known by the name {0:?}")]
    UnknownMaster(String),

    #[error("Role check failed: expected {expected}, server reported {actual}")]
    RoleMismatch {
        expected: ServerRole,
        actual: ServerRole,
    },

    /// Entries decoded before the failing one are preserved in `decoded`;
    /// callers must treat the list as incomplete.
    #[error("Replica entry {index} could not be decoded: {source}")]
    PartialReplicas {
        decoded: Vec<ReplicaInfo>,
        index: usize,
        source: ProtocolError,
    },
}

/// Connection-related errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("TLS handshake failed: {0}")]
    TlsFailed(String),
}

/// Reply-shape errors
///
/// A reply that reaches this layer completed a full network round-trip;
/// these errors are never retried by the failover loop.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse { expected: String, actual: String },

    #[error("Server error: {0}")]
    ServerError(String),
}

pub type Result<T> = std::result::Result<T, SentinelError>;
