//! Replica descriptors returned by the sentinel tier

use std::collections::BTreeMap;

use crate::utils::Result;

/// One monitored instance as described by `SENTINEL replicas` or
/// `SENTINEL sentinels`.
///
/// Sentinel reports each instance as a flat field-value map whose exact
/// contents vary across server versions. Only `ip`, `port` and `flags` are
/// interpreted here; every other field stays opaque and reachable through
/// [`ReplicaInfo::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaInfo {
    fields: BTreeMap<String, String>,
}

impl ReplicaInfo {
    /// Look up a raw descriptor field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn ip(&self) -> Option<&str> {
        self.get("ip")
    }

    pub fn port(&self) -> Option<&str> {
        self.get("port")
    }

    /// Instance flags, e.g. `["slave", "s_down"]`.
    pub fn flags(&self) -> Vec<&str> {
        self.get("flags")
            .map(|f| f.split(',').collect())
            .unwrap_or_default()
    }

    /// Whether sentinel currently considers the instance reachable.
    pub fn is_available(&self) -> bool {
        !self
            .flags()
            .iter()
            .any(|f| matches!(*f, "s_down" | "o_down" | "disconnected"))
    }

    /// Instance address as `"ip:port"`.
    ///
    /// Missing fields format as empty strings; sentinel always reports
    /// both for entries it is monitoring.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip().unwrap_or(""), self.port().unwrap_or(""))
    }
}

impl From<BTreeMap<String, String>> for ReplicaInfo {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

/// Convert a replica discovery result into plain `"ip:port"` strings.
///
/// Takes the result of `SentinelClient::replicas` (or `sentinels`) so a
/// prior error passes through untouched with no partial work; otherwise
/// the output preserves the order and length of the input descriptors.
pub fn replica_addresses(replicas: Result<Vec<ReplicaInfo>>) -> Result<Vec<String>> {
    let replicas = replicas?;
    Ok(replicas.iter().map(ReplicaInfo::address).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SentinelError;

    fn info(pairs: &[(&str, &str)]) -> ReplicaInfo {
        ReplicaInfo::from(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_address_formatting() {
        let replica = info(&[("ip", "10.0.0.7"), ("port", "6380"), ("flags", "slave")]);
        assert_eq!(replica.address(), "10.0.0.7:6380");
    }

    #[test]
    fn test_address_with_missing_fields() {
        assert_eq!(info(&[("port", "6380")]).address(), ":6380");
        assert_eq!(info(&[("ip", "10.0.0.7")]).address(), "10.0.0.7:");
    }

    #[test]
    fn test_flags_and_availability() {
        let healthy = info(&[("flags", "slave")]);
        assert_eq!(healthy.flags(), vec!["slave"]);
        assert!(healthy.is_available());

        let down = info(&[("flags", "slave,s_down,disconnected")]);
        assert_eq!(down.flags(), vec!["slave", "s_down", "disconnected"]);
        assert!(!down.is_available());
    }

    #[test]
    fn test_replica_addresses_preserves_order() {
        let replicas = vec![
            info(&[("ip", "10.0.0.7"), ("port", "6380")]),
            info(&[("ip", "10.0.0.8"), ("port", "6381")]),
        ];
        let addrs = replica_addresses(Ok(replicas)).unwrap();
        assert_eq!(addrs, vec!["10.0.0.7:6380", "10.0.0.8:6381"]);
    }

    #[test]
    fn test_replica_addresses_passes_prior_error_through() {
        let result = replica_addresses(Err(SentinelError::Config("boom".to_string())));
        assert!(matches!(result.unwrap_err(), SentinelError::Config(_)));
    }
}
