//! RESP (REdis Serialization Protocol) encoder and decoder
//!
//! Command framing for requests and streaming decode for replies. One
//! command per round-trip; the sentinel protocol has no pipelining needs.

use std::io::{self, BufRead};

/// RESP value types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple string (+OK\r\n)
    SimpleString(String),
    /// Error (-ERR message\r\n)
    Error(String),
    /// Integer (:1000\r\n)
    Integer(i64),
    /// Bulk string ($6\r\nfoobar\r\n)
    BulkString(Vec<u8>),
    /// Null bulk string or null array ($-1\r\n, *-1\r\n)
    Null,
    /// Array (*2\r\n...)
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Get as string (for simple string or UTF-8 bulk string)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RespValue::SimpleString(s) => Some(s),
            RespValue::BulkString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

/// RESP command encoder with a reusable buffer
pub struct RespEncoder {
    buf: Vec<u8>,
}

impl RespEncoder {
    /// Create new encoder with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Get encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Encode a command as a RESP array of bulk strings
    pub fn encode_command(&mut self, args: &[&[u8]]) {
        // Array header: *<count>\r\n
        self.buf.push(b'*');
        self.write_int(args.len() as i64);
        self.buf.extend_from_slice(b"\r\n");

        // Each argument as bulk string: $<len>\r\n<data>\r\n
        for arg in args {
            self.buf.push(b'$');
            self.write_int(arg.len() as i64);
            self.buf.extend_from_slice(b"\r\n");
            self.buf.extend_from_slice(arg);
            self.buf.extend_from_slice(b"\r\n");
        }
    }

    /// Encode a command from string slices
    pub fn encode_command_str(&mut self, args: &[&str]) {
        let byte_args: Vec<&[u8]> = args.iter().map(|s| s.as_bytes()).collect();
        self.encode_command(&byte_args);
    }

    #[inline]
    fn write_int(&mut self, value: i64) {
        let mut buffer = itoa::Buffer::new();
        let s = buffer.format(value);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

/// Streaming RESP reply decoder
///
/// Decode failures here (bad type byte, truncated frame) leave the stream
/// unsynchronized, so they surface as IO errors and cost the connection.
pub struct RespDecoder<R> {
    reader: R,
    line_buf: String,
}

impl<R: BufRead> RespDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buf: String::with_capacity(256),
        }
    }

    /// Decode the next RESP value from the stream
    pub fn decode(&mut self) -> io::Result<RespValue> {
        self.line_buf.clear();
        self.reader.read_line(&mut self.line_buf)?;

        if self.line_buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Connection closed",
            ));
        }

        let line = self.line_buf.trim_end_matches(&['\r', '\n'][..]);
        if line.is_empty() {
            return Err(invalid_data("Empty RESP line"));
        }

        let type_byte = line.as_bytes()[0];
        let content = &line[1..];

        match type_byte {
            b'+' => Ok(RespValue::SimpleString(content.to_string())),
            b'-' => Ok(RespValue::Error(content.to_string())),
            b':' => {
                let value: i64 = content
                    .parse()
                    .map_err(|_| invalid_data("Invalid integer"))?;
                Ok(RespValue::Integer(value))
            }
            b'$' => {
                let len: i64 = content
                    .parse()
                    .map_err(|_| invalid_data("Invalid bulk string length"))?;

                if len < 0 {
                    return Ok(RespValue::Null);
                }

                let mut data = vec![0u8; len as usize];
                self.reader.read_exact(&mut data)?;

                // Consume the trailing \r\n
                let mut crlf = [0u8; 2];
                self.reader.read_exact(&mut crlf)?;

                Ok(RespValue::BulkString(data))
            }
            b'*' => {
                let count: i64 = content
                    .parse()
                    .map_err(|_| invalid_data("Invalid array length"))?;

                if count < 0 {
                    return Ok(RespValue::Null);
                }

                let mut elements = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    elements.push(self.decode()?);
                }

                Ok(RespValue::Array(elements))
            }
            _ => Err(invalid_data(format!(
                "Invalid RESP type byte: {}",
                type_byte as char
            ))),
        }
    }
}

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_ping() {
        let mut encoder = RespEncoder::with_capacity(64);
        encoder.encode_command_str(&["PING"]);
        assert_eq!(encoder.as_bytes(), b"*1\r\n$4\r\nPING\r\n");
    }

    #[test]
    fn test_encode_sentinel_command() {
        let mut encoder = RespEncoder::with_capacity(128);
        encoder.encode_command_str(&["SENTINEL", "get-master-addr-by-name", "mymaster"]);
        assert_eq!(
            encoder.as_bytes(),
            b"*3\r\n$8\r\nSENTINEL\r\n$23\r\nget-master-addr-by-name\r\n$8\r\nmymaster\r\n"
                as &[u8]
        );
    }

    #[test]
    fn test_decode_simple_string() {
        let data = b"+PONG\r\n";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        assert_eq!(
            decoder.decode().unwrap(),
            RespValue::SimpleString("PONG".to_string())
        );
    }

    #[test]
    fn test_decode_error() {
        let data = b"-ERR No such master with that name\r\n";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        assert_eq!(
            decoder.decode().unwrap(),
            RespValue::Error("ERR No such master with that name".to_string())
        );
    }

    #[test]
    fn test_decode_integer() {
        let data = b":26379\r\n";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        assert_eq!(decoder.decode().unwrap(), RespValue::Integer(26379));
    }

    #[test]
    fn test_decode_master_addr_reply() {
        let data = b"*2\r\n$8\r\n10.0.0.5\r\n$4\r\n6379\r\n";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        assert_eq!(
            decoder.decode().unwrap(),
            RespValue::Array(vec![
                RespValue::BulkString(b"10.0.0.5".to_vec()),
                RespValue::BulkString(b"6379".to_vec()),
            ])
        );
    }

    #[test]
    fn test_decode_null_bulk() {
        let data = b"$-1\r\n";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        assert_eq!(decoder.decode().unwrap(), RespValue::Null);
    }

    #[test]
    fn test_decode_null_array() {
        let data = b"*-1\r\n";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        assert_eq!(decoder.decode().unwrap(), RespValue::Null);
    }

    #[test]
    fn test_decode_invalid_type_byte() {
        let data = b"!bogus\r\n";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        let err = decoder.decode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_decode_closed_stream() {
        let data = b"";
        let mut decoder = RespDecoder::new(Cursor::new(&data[..]));
        let err = decoder.decode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
