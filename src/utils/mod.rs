//! Utility modules

pub mod error;
pub mod reply;
pub mod resp;

pub use error::{ConnectionError, ProtocolError, Result, SentinelError};
pub use resp::{RespDecoder, RespEncoder, RespValue};
