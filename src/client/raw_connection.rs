//! Raw TCP/TLS connection
//!
//! Blocking transport for sentinel and data-node traffic. Plain TCP splits
//! into separate buffered reader/writer halves; TLS keeps a single stream
//! since native-tls streams cannot be cloned.

use std::io::{self, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::config::{AuthConfig, SentinelConfig, ServerAddress, TlsConfig};
use crate::utils::{ConnectionError, RespDecoder, RespEncoder, RespValue};

use super::resp_connection::{Connector, RespConnection, RespConnectionExt};

/// Raw connection wrapper (TCP or TLS)
pub enum RawConnection {
    Tcp {
        writer: BufWriter<TcpStream>,
        reader: BufReader<TcpStream>,
    },
    #[cfg(feature = "native-tls-backend")]
    NativeTls {
        stream: native_tls::TlsStream<TcpStream>,
    },
}

impl RawConnection {
    /// Open a plain TCP connection
    pub fn connect_tcp(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let stream = Self::tcp_stream(host, port, connect_timeout)?;

        let writer = BufWriter::with_capacity(
            4096,
            stream
                .try_clone()
                .map_err(|e| connect_failed(host, port, e))?,
        );
        let reader = BufReader::with_capacity(4096, stream);

        Ok(RawConnection::Tcp { writer, reader })
    }

    /// Open a TLS connection
    #[cfg(feature = "native-tls-backend")]
    pub fn connect_tls(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        tls_config: &TlsConfig,
    ) -> Result<Self, ConnectionError> {
        use native_tls::{Certificate, Identity, TlsConnector};

        let mut builder = TlsConnector::builder();

        if tls_config.skip_verify {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }

        if let Some(ref ca_path) = tls_config.ca_cert {
            let ca_data = std::fs::read(ca_path).map_err(|e| {
                ConnectionError::TlsFailed(format!("Failed to read CA cert: {}", e))
            })?;
            let cert = Certificate::from_pem(&ca_data)
                .map_err(|e| ConnectionError::TlsFailed(format!("Invalid CA cert: {}", e)))?;
            builder.add_root_certificate(cert);
        }

        if let (Some(ref cert_path), Some(ref key_path)) =
            (&tls_config.client_cert, &tls_config.client_key)
        {
            let cert_data = std::fs::read(cert_path).map_err(|e| {
                ConnectionError::TlsFailed(format!("Failed to read client cert: {}", e))
            })?;
            let key_data = std::fs::read(key_path).map_err(|e| {
                ConnectionError::TlsFailed(format!("Failed to read client key: {}", e))
            })?;

            // native-tls wants cert and key combined as PKCS8
            let identity = Identity::from_pkcs8(&cert_data, &key_data).map_err(|e| {
                ConnectionError::TlsFailed(format!("Invalid client identity: {}", e))
            })?;
            builder.identity(identity);
        }

        let connector = builder.build().map_err(|e| {
            ConnectionError::TlsFailed(format!("Failed to build TLS connector: {}", e))
        })?;

        let tcp_stream = Self::tcp_stream(host, port, connect_timeout)?;

        let sni_host = tls_config.sni.as_deref().unwrap_or(host);
        let stream = connector
            .connect(sni_host, tcp_stream)
            .map_err(|e| ConnectionError::TlsFailed(format!("TLS handshake failed: {}", e)))?;

        Ok(RawConnection::NativeTls { stream })
    }

    fn tcp_stream(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<TcpStream, ConnectionError> {
        use std::net::ToSocketAddrs;

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| connect_failed(host, port, e))?
            .next()
            .ok_or_else(|| {
                connect_failed(
                    host,
                    port,
                    io::Error::new(io::ErrorKind::NotFound, "No addresses found"),
                )
            })?;

        let stream = TcpStream::connect_timeout(&addr, connect_timeout)
            .map_err(|e| connect_failed(host, port, e))?;
        stream.set_nodelay(true).ok();

        Ok(stream)
    }

    /// Set read timeout
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            RawConnection::Tcp { reader, .. } => reader.get_ref().set_read_timeout(timeout),
            #[cfg(feature = "native-tls-backend")]
            RawConnection::NativeTls { stream } => stream.get_ref().set_read_timeout(timeout),
        }
    }

    /// Set write timeout
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            RawConnection::Tcp { writer, .. } => writer.get_ref().set_write_timeout(timeout),
            #[cfg(feature = "native-tls-backend")]
            RawConnection::NativeTls { stream } => stream.get_ref().set_write_timeout(timeout),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            RawConnection::Tcp { writer, .. } => writer.write_all(buf),
            #[cfg(feature = "native-tls-backend")]
            RawConnection::NativeTls { stream } => stream.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            RawConnection::Tcp { writer, .. } => writer.flush(),
            #[cfg(feature = "native-tls-backend")]
            RawConnection::NativeTls { stream } => stream.flush(),
        }
    }

    fn read_reply(&mut self) -> io::Result<RespValue> {
        match self {
            RawConnection::Tcp { reader, .. } => RespDecoder::new(reader).decode(),
            #[cfg(feature = "native-tls-backend")]
            RawConnection::NativeTls { stream } => {
                let mut buf_reader = BufReader::new(stream);
                RespDecoder::new(&mut buf_reader).decode()
            }
        }
    }
}

impl RespConnection for RawConnection {
    fn execute(&mut self, args: &[&str]) -> io::Result<RespValue> {
        let mut encoder = RespEncoder::with_capacity(64);
        encoder.encode_command_str(args);

        self.write_all(encoder.as_bytes())?;
        self.flush()?;
        self.read_reply()
    }
}

fn connect_failed(host: &str, port: u16, source: io::Error) -> ConnectionError {
    ConnectionError::ConnectFailed {
        host: host.to_string(),
        port,
        source,
    }
}

/// Connection factory applying the uniform dial options
#[derive(Clone)]
pub struct ConnectionFactory {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub tls: Option<TlsConfig>,
    pub auth: Option<AuthConfig>,
}

impl ConnectionFactory {
    /// Build a factory carrying the dial options of a client configuration.
    pub fn from_config(config: &SentinelConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
            tls: config.tls.clone(),
            auth: config.auth.clone(),
        }
    }

    /// Create a new connection to the specified host:port
    pub fn create(&self, host: &str, port: u16) -> Result<RawConnection, ConnectionError> {
        let mut conn = match &self.tls {
            #[cfg(feature = "native-tls-backend")]
            Some(tls) => RawConnection::connect_tls(host, port, self.connect_timeout, tls)?,
            #[cfg(not(feature = "native-tls-backend"))]
            Some(_) => {
                return Err(ConnectionError::TlsFailed(
                    "TLS support not compiled in".to_string(),
                ));
            }
            None => RawConnection::connect_tcp(host, port, self.connect_timeout)?,
        };

        conn.set_read_timeout(Some(self.read_timeout)).ok();
        conn.set_write_timeout(Some(self.write_timeout)).ok();

        if let Some(ref auth) = self.auth {
            conn.authenticate(&auth.password, auth.username.as_deref())
                .map_err(|e| ConnectionError::AuthFailed(e.to_string()))?;
        }

        Ok(conn)
    }
}

impl Connector for ConnectionFactory {
    type Conn = RawConnection;

    fn connect(&self, addr: &ServerAddress) -> Result<RawConnection, ConnectionError> {
        self.create(&addr.host, addr.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests require a sentinel listening on the default local port;
    // they are ignored by default.

    #[test]
    #[ignore]
    fn test_tcp_connection() {
        let mut conn = RawConnection::connect_tcp("127.0.0.1", 26379, Duration::from_secs(5))
            .expect("Failed to connect");

        assert!(conn.ping().expect("Ping failed"));
    }

    #[test]
    #[ignore]
    fn test_connection_factory() {
        let factory = ConnectionFactory {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
            tls: None,
            auth: None,
        };

        let mut conn = factory
            .create("127.0.0.1", 26379)
            .expect("Failed to connect");
        assert!(conn.ping().expect("Ping failed"));
    }
}
