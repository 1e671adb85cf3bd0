//! Failover-aware sentinel client
//!
//! One client holds at most one live connection to the monitor tier. A
//! request is executed against the active sentinel; when that sentinel is
//! unreachable or fails mid-command, the connection is discarded and the
//! same request is retried against the next configured address, at most
//! once per address. The index of the last sentinel that answered is kept
//! across requests, so healthy deployments keep talking to one sentinel.

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::client::{ConnectionFactory, Connector, RespConnection};
use crate::config::{SentinelConfig, ServerAddress};
use crate::utils::{reply, ProtocolError, RespValue, Result, SentinelError};

use super::replica::ReplicaInfo;

/// Connection slot guarded by the client mutex.
///
/// `conn`, when present, was dialed to `addresses[active_idx]` and has
/// completed its last command successfully.
struct ConnState<C> {
    active_idx: usize,
    conn: Option<C>,
}

/// Discovery client for a sentinel-monitored replica set
///
/// All operations serialize on an internal mutex: one logical request is
/// in flight per client at a time, and every operation may mutate the
/// shared connection slot. The client is reusable after [`close`] and
/// after failed requests; it simply redials on the next call.
///
/// [`close`]: SentinelClient::close
pub struct SentinelClient<D: Connector = ConnectionFactory> {
    addresses: Vec<ServerAddress>,
    connector: D,
    state: Mutex<ConnState<D::Conn>>,
}

impl<D: Connector> std::fmt::Debug for SentinelClient<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentinelClient")
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}

impl SentinelClient<ConnectionFactory> {
    /// Create a client from a configuration.
    ///
    /// Fails with a configuration error when no sentinel addresses are
    /// configured.
    pub fn new(config: SentinelConfig) -> Result<Self> {
        config.validate()?;
        let connector = ConnectionFactory::from_config(&config);
        Self::with_connector(config.addresses, connector)
    }
}

impl<D: Connector> SentinelClient<D> {
    /// Create a client over a custom connector.
    pub fn with_connector(addresses: Vec<ServerAddress>, connector: D) -> Result<Self> {
        if addresses.is_empty() {
            return Err(SentinelError::Config(
                "at least one sentinel address is required".to_string(),
            ));
        }

        Ok(Self {
            addresses,
            connector,
            state: Mutex::new(ConnState {
                active_idx: 0,
                conn: None,
            }),
        })
    }

    /// The configured sentinel addresses, in rotation order.
    pub fn addresses(&self) -> &[ServerAddress] {
        &self.addresses
    }

    /// Look up the current master address of a named replica set.
    ///
    /// Returns the address as `"host:port"`. An unknown set name is
    /// reported by sentinel as a null reply and surfaces as
    /// [`SentinelError::UnknownMaster`].
    pub fn master_address(&self, master_name: &str) -> Result<String> {
        let resp = self.call(&["SENTINEL", "get-master-addr-by-name", master_name])?;

        if resp == RespValue::Null {
            return Err(SentinelError::UnknownMaster(master_name.to_string()));
        }

        let parts = reply::as_string_list(&resp)?;
        if parts.len() != 2 {
            return Err(ProtocolError::UnexpectedResponse {
                expected: "[host, port] address pair".to_string(),
                actual: format!("array of {} elements", parts.len()),
            }
            .into());
        }

        Ok(format!("{}:{}", parts[0], parts[1]))
    }

    /// Look up the replicas of a named replica set.
    ///
    /// On a decode failure partway through the reply, the error carries
    /// the descriptors decoded so far (see
    /// [`SentinelError::PartialReplicas`]).
    pub fn replicas(&self, master_name: &str) -> Result<Vec<ReplicaInfo>> {
        let resp = self.call(&["SENTINEL", "replicas", master_name])?;
        decode_instances(&resp)
    }

    /// Look up the other sentinels monitoring a named replica set.
    ///
    /// Same reply shape and same partial-result contract as
    /// [`replicas`](SentinelClient::replicas); useful for discovering the
    /// rest of the monitor quorum from a single seed address.
    pub fn sentinels(&self, master_name: &str) -> Result<Vec<ReplicaInfo>> {
        let resp = self.call(&["SENTINEL", "sentinels", master_name])?;
        decode_instances(&resp)
    }

    /// Ping the sentinel tier, rotating across addresses like any other
    /// request.
    pub fn ping(&self) -> Result<bool> {
        match self.call(&["PING"])? {
            RespValue::SimpleString(s) => Ok(s == "PONG"),
            _ => Ok(false),
        }
    }

    /// Close the connection to the sentinel tier, if one is established.
    ///
    /// Idempotent. The rotation index is kept, so a reused client redials
    /// the sentinel that last answered.
    pub fn close(&self) {
        self.state.lock().conn = None;
    }

    /// Execute one logical command against the sentinel tier.
    ///
    /// Tries every configured address at most once, starting at the
    /// address that served the previous request. A dial or transport
    /// failure drops the connection and rotates to the next address; the
    /// first successful reply wins and its address stays active for
    /// subsequent calls. Once every address has failed, the most recent
    /// error is returned.
    fn call(&self, args: &[&str]) -> Result<RespValue> {
        let mut state = self.state.lock();
        let mut last_err = None;

        for _ in 0..self.addresses.len() {
            match self.call_once(&mut state, args) {
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    // call_once already dropped the failed connection
                    let failed = state.active_idx;
                    state.active_idx = (state.active_idx + 1) % self.addresses.len();
                    warn!(
                        "sentinel {} failed ({}), rotating to {}",
                        self.addresses[failed], err, self.addresses[state.active_idx]
                    );
                    last_err = Some(err);
                }
            }
        }

        // The loop ran at least once: constructors reject empty address
        // lists, so the fallback below is unreachable in practice.
        Err(last_err.unwrap_or_else(|| {
            SentinelError::Config("no sentinel addresses configured".to_string())
        }))
    }

    /// Single attempt against the active address, dialing if needed.
    ///
    /// The connection is taken out of the slot for the duration of the
    /// round-trip and only put back after a successful reply, so any
    /// failure leaves the slot empty and the socket closed.
    fn call_once(&self, state: &mut ConnState<D::Conn>, args: &[&str]) -> Result<RespValue> {
        let mut conn = match state.conn.take() {
            Some(conn) => conn,
            None => {
                let addr = &self.addresses[state.active_idx];
                debug!("dialing sentinel {}", addr);
                self.connector.connect(addr)?
            }
        };

        let resp = conn.execute(args)?;
        state.conn = Some(conn);
        Ok(resp)
    }
}

/// Decode a `SENTINEL replicas`/`SENTINEL sentinels` reply: a list of
/// field-value maps, one per monitored instance.
fn decode_instances(resp: &RespValue) -> Result<Vec<ReplicaInfo>> {
    let values = reply::as_values(resp)?;

    let mut decoded = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        match reply::as_string_map(value) {
            Ok(fields) => decoded.push(ReplicaInfo::from(fields)),
            Err(source) => {
                return Err(SentinelError::PartialReplicas {
                    decoded,
                    index,
                    source,
                })
            }
        }
    }
    Ok(decoded)
}
