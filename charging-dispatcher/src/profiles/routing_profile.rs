//! Routing profile data model.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Subsystem name that lets one routing profile serve every subsystem of a tenant.
pub const ANY_SUBSYSTEM: &str = "*any";

/// One replica eligible to serve a routing profile.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostEntry {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub weight: f64,
}

impl HostEntry {
    pub fn new(id: &str, address: &str, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            address: address.to_string(),
            weight,
        }
    }
}

/// Ordered replicas for one `(tenant, id, subsystem)`.
///
/// `hosts` is kept weight-descending; equal weights keep declaration order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingProfile {
    pub id: String,
    pub tenant: String,
    pub subsystem: String,
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}

impl RoutingProfile {
    pub fn new(id: &str, tenant: &str, subsystem: &str, hosts: Vec<HostEntry>) -> Self {
        let mut profile = Self {
            id: id.to_string(),
            tenant: tenant.to_string(),
            subsystem: subsystem.to_string(),
            hosts,
        };
        profile.sort_hosts();
        profile
    }

    /// Applies the failover preference order. `sort_by` is stable.
    pub(crate) fn sort_hosts(&mut self) {
        self.hosts
            .sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    }

    pub fn is_routable(&self) -> bool {
        !self.hosts.is_empty()
    }

    pub fn host_ids(&self) -> Vec<&str> {
        self.hosts.iter().map(|host| host.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{HostEntry, RoutingProfile};

    #[test]
    fn hosts_are_sorted_by_weight_descending() {
        let profile = RoutingProfile::new(
            "DSP1",
            "cgrates.org",
            "AttributeSv1",
            vec![
                HostEntry::new("low", "127.0.0.1:1", 5.0),
                HostEntry::new("high", "127.0.0.1:2", 20.0),
                HostEntry::new("mid", "127.0.0.1:3", 10.0),
            ],
        );

        assert_eq!(profile.host_ids(), vec!["high", "mid", "low"]);
    }

    #[test]
    fn equal_weights_keep_declaration_order() {
        let profile = RoutingProfile::new(
            "DSP1",
            "cgrates.org",
            "AttributeSv1",
            vec![
                HostEntry::new("first", "127.0.0.1:1", 10.0),
                HostEntry::new("top", "127.0.0.1:2", 30.0),
                HostEntry::new("second", "127.0.0.1:3", 10.0),
                HostEntry::new("third", "127.0.0.1:4", 10.0),
            ],
        );

        assert_eq!(profile.host_ids(), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn empty_profile_is_not_routable() {
        let profile = RoutingProfile::new("DSP1", "cgrates.org", "AttributeSv1", vec![]);
        assert!(!profile.is_routable());
    }
}
