//! Client connection layer

pub mod raw_connection;
pub mod resp_connection;

pub use raw_connection::{ConnectionFactory, RawConnection};
pub use resp_connection::{Connector, RespConnection, RespConnectionExt};
