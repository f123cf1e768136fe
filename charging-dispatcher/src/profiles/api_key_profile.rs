//! API key authorization records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Allowed-set entry granting every subsystem and method.
pub const ANY_API: &str = "*any";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiKeyProfile {
    pub api_key: String,
    pub tenant: String,
    #[serde(default)]
    pub allowed_subsystems: BTreeSet<String>,
    pub routing_profile_id: String,
}

impl ApiKeyProfile {
    pub fn new(
        api_key: &str,
        tenant: &str,
        allowed_subsystems: &[&str],
        routing_profile_id: &str,
    ) -> Self {
        Self {
            api_key: api_key.to_string(),
            tenant: tenant.to_string(),
            allowed_subsystems: allowed_subsystems.iter().map(|s| s.to_string()).collect(),
            routing_profile_id: routing_profile_id.to_string(),
        }
    }

    /// Whether the key may reach `subsystem`, or `subsystem.method` when a method is given.
    pub fn allows(&self, subsystem: &str, method: Option<&str>) -> bool {
        if self.allowed_subsystems.contains(ANY_API) || self.allowed_subsystems.contains(subsystem)
        {
            return true;
        }
        match method {
            Some(method) => self
                .allowed_subsystems
                .contains(&format!("{subsystem}.{method}")),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiKeyProfile;

    #[test]
    fn allows_matches_subsystem_method_and_wildcard() {
        let by_subsystem =
            ApiKeyProfile::new("attr12345", "cgrates.org", &["AttributeSv1"], "DSP1");
        assert!(by_subsystem.allows("AttributeSv1", None));
        assert!(by_subsystem.allows("AttributeSv1", Some("Ping")));
        assert!(!by_subsystem.allows("ResourceSv1", Some("Ping")));

        let by_method =
            ApiKeyProfile::new("ping-only", "cgrates.org", &["AttributeSv1.Ping"], "DSP1");
        assert!(by_method.allows("AttributeSv1", Some("Ping")));
        assert!(!by_method.allows("AttributeSv1", Some("ProcessEvent")));
        assert!(!by_method.allows("AttributeSv1", None));

        let wildcard = ApiKeyProfile::new("all", "cgrates.org", &["*any"], "DSP1");
        assert!(wildcard.allows("SessionSv1", Some("InitiateSession")));
    }
}
