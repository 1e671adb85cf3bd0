//! Connection trait seams
//!
//! `RespConnection` abstracts "execute one command, read one reply" so the
//! sentinel client, the role verifier and the tests can share transports.
//! `Connector` abstracts the dial step the failover loop rotates through.

use std::io;

use crate::config::ServerAddress;
use crate::utils::{ConnectionError, RespValue};

/// A connection that can execute commands
///
/// An `Err` from [`execute`](RespConnection::execute) means the transport
/// failed and the connection must be discarded; an error *reply* from the
/// server is a successful round-trip and comes back as
/// [`RespValue::Error`].
pub trait RespConnection {
    /// Execute a command with string arguments and read a single reply.
    ///
    /// # Example
    /// ```ignore
    /// let reply = conn.execute(&["SENTINEL", "replicas", "mymaster"])?;
    /// ```
    fn execute(&mut self, args: &[&str]) -> io::Result<RespValue>;
}

/// Extension trait with operations every connection supports
pub trait RespConnectionExt: RespConnection {
    /// Send PING and verify the PONG response
    fn ping(&mut self) -> io::Result<bool> {
        match self.execute(&["PING"])? {
            RespValue::SimpleString(s) => Ok(s == "PONG"),
            _ => Ok(false),
        }
    }

    /// Send AUTH with an optional ACL username
    fn authenticate(&mut self, password: &str, username: Option<&str>) -> io::Result<()> {
        let response = match username {
            Some(user) => self.execute(&["AUTH", user, password])?,
            None => self.execute(&["AUTH", password])?,
        };

        match response {
            RespValue::SimpleString(s) if s == "OK" => Ok(()),
            RespValue::Error(e) => Err(io::Error::new(io::ErrorKind::PermissionDenied, e)),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unexpected AUTH response: {:?}", other),
            )),
        }
    }
}

// Blanket implementation: any RespConnection gets the extension methods
impl<T: RespConnection> RespConnectionExt for T {}

/// Dial factory producing a fresh connection to one address
///
/// The production implementation is
/// [`ConnectionFactory`](crate::client::ConnectionFactory); tests plug in
/// scripted connectors to drive the failover loop without sockets.
pub trait Connector {
    type Conn: RespConnection;

    fn connect(&self, addr: &ServerAddress) -> Result<Self::Conn, ConnectionError>;
}
