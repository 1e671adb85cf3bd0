//! Post-connect role verification

use std::fmt;
use std::str::FromStr;

use crate::client::RespConnection;
use crate::utils::{reply, ProtocolError, Result, SentinelError};

/// Self-reported role of a server, from the first element of the `ROLE`
/// reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRole {
    Master,
    Replica,
    Sentinel,
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerRole::Master => "master",
            ServerRole::Replica => "replica",
            ServerRole::Sentinel => "sentinel",
        };
        f.write_str(name)
    }
}

impl FromStr for ServerRole {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "master" => Ok(ServerRole::Master),
            // Older servers report "slave", newer ones "replica"
            "slave" | "replica" => Ok(ServerRole::Replica),
            "sentinel" => Ok(ServerRole::Sentinel),
            other => Err(ProtocolError::UnexpectedResponse {
                expected: "master, slave or sentinel role".to_string(),
                actual: other.to_string(),
            }),
        }
    }
}

/// Check that an already-established connection reports the expected role.
///
/// Topology can change between discovery and connect, so a node resolved
/// via the sentinel tier may no longer hold the role it was resolved for.
/// Run this against every freshly dialed data node before trusting it with
/// application traffic.
///
/// The check borrows the connection for a single `ROLE` command; it never
/// touches the sentinel client's own connection and a mismatch never
/// triggers address rotation.
pub fn verify_role<C: RespConnection>(conn: &mut C, expected: ServerRole) -> Result<()> {
    let resp = conn.execute(&["ROLE"])?;

    let values = reply::as_values(&resp)?;
    let first = values.first().ok_or_else(|| ProtocolError::UnexpectedResponse {
        expected: "non-empty ROLE reply".to_string(),
        actual: "empty array".to_string(),
    })?;

    let actual: ServerRole = reply::as_string(first)?.parse()?;
    if actual != expected {
        return Err(SentinelError::RoleMismatch { expected, actual });
    }
    Ok(())
}
