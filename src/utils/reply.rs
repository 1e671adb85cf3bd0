//! Typed reply decoders
//!
//! Convert a decoded [`RespValue`] into the shape a query expects. Every
//! decoder fails closed: a reply that does not match the expected shape is
//! a [`ProtocolError::UnexpectedResponse`], and an error reply surfaces as
//! [`ProtocolError::ServerError`] instead of being coerced.

use std::collections::BTreeMap;

use super::error::ProtocolError;
use super::resp::RespValue;

/// Decode a reply as a UTF-8 string (simple or bulk).
pub fn as_string(reply: &RespValue) -> Result<String, ProtocolError> {
    if let Some(s) = reply.as_str() {
        return Ok(s.to_string());
    }
    match reply {
        RespValue::Error(e) => Err(ProtocolError::ServerError(e.clone())),
        other => Err(unexpected("string", other)),
    }
}

/// Decode a reply as a list of strings.
pub fn as_string_list(reply: &RespValue) -> Result<Vec<String>, ProtocolError> {
    as_values(reply)?.iter().map(as_string).collect()
}

/// Decode a reply as a list of raw values.
pub fn as_values(reply: &RespValue) -> Result<&[RespValue], ProtocolError> {
    if let Some(values) = reply.as_array() {
        return Ok(values);
    }
    match reply {
        RespValue::Error(e) => Err(ProtocolError::ServerError(e.clone())),
        other => Err(unexpected("array", other)),
    }
}

/// Decode a reply as a string-keyed string map.
///
/// Sentinel describes each monitored instance as a flat array of
/// field-value pairs: `[field1, value1, field2, value2, ...]`.
pub fn as_string_map(reply: &RespValue) -> Result<BTreeMap<String, String>, ProtocolError> {
    let items = as_values(reply)?;
    if items.len() % 2 != 0 {
        return Err(ProtocolError::UnexpectedResponse {
            expected: "array of field-value pairs".to_string(),
            actual: format!("array of {} elements", items.len()),
        });
    }

    let mut map = BTreeMap::new();
    for pair in items.chunks_exact(2) {
        map.insert(as_string(&pair[0])?, as_string(&pair[1])?);
    }
    Ok(map)
}

fn unexpected(expected: &str, actual: &RespValue) -> ProtocolError {
    ProtocolError::UnexpectedResponse {
        expected: expected.to_string(),
        actual: format!("{:?}", actual),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(s: &str) -> RespValue {
        RespValue::BulkString(s.as_bytes().to_vec())
    }

    #[test]
    fn test_string_from_simple_and_bulk() {
        assert_eq!(
            as_string(&RespValue::SimpleString("OK".to_string())).unwrap(),
            "OK"
        );
        assert_eq!(as_string(&bulk("10.0.0.5")).unwrap(), "10.0.0.5");
    }

    #[test]
    fn test_string_rejects_integer() {
        let err = as_string(&RespValue::Integer(42)).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_error_reply_surfaces_as_server_error() {
        let reply = RespValue::Error("ERR No such master with that name".to_string());
        let err = as_string(&reply).unwrap_err();
        assert!(matches!(err, ProtocolError::ServerError(_)));

        let err = as_values(&reply).unwrap_err();
        assert!(matches!(err, ProtocolError::ServerError(_)));
    }

    #[test]
    fn test_string_list() {
        let reply = RespValue::Array(vec![bulk("10.0.0.5"), bulk("6379")]);
        assert_eq!(as_string_list(&reply).unwrap(), vec!["10.0.0.5", "6379"]);
    }

    #[test]
    fn test_string_list_rejects_null() {
        let err = as_string_list(&RespValue::Null).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_string_map_from_pairs() {
        let reply = RespValue::Array(vec![
            bulk("ip"),
            bulk("10.0.0.7"),
            bulk("port"),
            bulk("6380"),
            bulk("flags"),
            bulk("slave"),
        ]);
        let map = as_string_map(&reply).unwrap();
        assert_eq!(map.get("ip").map(String::as_str), Some("10.0.0.7"));
        assert_eq!(map.get("port").map(String::as_str), Some("6380"));
        assert_eq!(map.get("flags").map(String::as_str), Some("slave"));
    }

    #[test]
    fn test_string_map_rejects_odd_length() {
        let reply = RespValue::Array(vec![bulk("ip"), bulk("10.0.0.7"), bulk("port")]);
        let err = as_string_map(&reply).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_string_map_rejects_non_string_value() {
        let reply = RespValue::Array(vec![bulk("port"), RespValue::Integer(6380)]);
        let err = as_string_map(&reply).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedResponse { .. }));
    }
}
