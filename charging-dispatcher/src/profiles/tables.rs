//! Validated, indexed profile tables forming one consistent snapshot.

use crate::profiles::api_key_profile::ApiKeyProfile;
use crate::profiles::routing_profile::{RoutingProfile, ANY_SUBSYSTEM};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Failures while building or fetching profile tables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProfileLoadError {
    EmptyApiKey,
    DuplicateApiKey(String),
    DuplicateRoutingProfile {
        tenant: String,
        id: String,
        subsystem: String,
    },
    DuplicateHostId {
        profile_id: String,
        host_id: String,
    },
    InvalidWeight {
        profile_id: String,
        host_id: String,
    },
    Source(String),
}

impl Display for ProfileLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProfileLoadError::EmptyApiKey => write!(f, "api key profile with empty api_key"),
            ProfileLoadError::DuplicateApiKey(key) => write!(f, "duplicate api key: {key}"),
            ProfileLoadError::DuplicateRoutingProfile {
                tenant,
                id,
                subsystem,
            } => write!(f, "duplicate routing profile {tenant}:{id}:{subsystem}"),
            ProfileLoadError::DuplicateHostId {
                profile_id,
                host_id,
            } => write!(f, "duplicate host id {host_id} in routing profile {profile_id}"),
            ProfileLoadError::InvalidWeight {
                profile_id,
                host_id,
            } => write!(
                f,
                "host {host_id} in routing profile {profile_id} has a non-finite weight"
            ),
            ProfileLoadError::Source(reason) => write!(f, "unable to fetch profiles: {reason}"),
        }
    }
}

impl Error for ProfileLoadError {}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct RoutingProfileKey {
    tenant: String,
    id: String,
    subsystem: String,
}

impl RoutingProfileKey {
    fn new(tenant: &str, id: &str, subsystem: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            id: id.to_string(),
            subsystem: subsystem.to_string(),
        }
    }
}

/// API keys and routing profiles that are always published together.
#[derive(Clone, Debug, Default)]
pub struct ProfileTables {
    api_keys: HashMap<String, Arc<ApiKeyProfile>>,
    routing_profiles: HashMap<RoutingProfileKey, Arc<RoutingProfile>>,
}

impl ProfileTables {
    pub fn build(
        api_keys: Vec<ApiKeyProfile>,
        routing_profiles: Vec<RoutingProfile>,
    ) -> Result<Self, ProfileLoadError> {
        let mut api_key_index = HashMap::with_capacity(api_keys.len());
        for api_key in api_keys {
            if api_key.api_key.is_empty() {
                return Err(ProfileLoadError::EmptyApiKey);
            }
            if api_key_index.contains_key(&api_key.api_key) {
                return Err(ProfileLoadError::DuplicateApiKey(api_key.api_key));
            }
            api_key_index.insert(api_key.api_key.clone(), Arc::new(api_key));
        }

        let mut routing_index = HashMap::with_capacity(routing_profiles.len());
        for mut profile in routing_profiles {
            let mut seen_hosts = HashSet::new();
            for host in &profile.hosts {
                if !host.weight.is_finite() {
                    return Err(ProfileLoadError::InvalidWeight {
                        profile_id: profile.id.clone(),
                        host_id: host.id.clone(),
                    });
                }
                if !seen_hosts.insert(host.id.as_str()) {
                    return Err(ProfileLoadError::DuplicateHostId {
                        profile_id: profile.id.clone(),
                        host_id: host.id.clone(),
                    });
                }
            }
            profile.sort_hosts();

            let key = RoutingProfileKey::new(&profile.tenant, &profile.id, &profile.subsystem);
            if routing_index.contains_key(&key) {
                return Err(ProfileLoadError::DuplicateRoutingProfile {
                    tenant: key.tenant,
                    id: key.id,
                    subsystem: key.subsystem,
                });
            }
            routing_index.insert(key, Arc::new(profile));
        }

        Ok(Self {
            api_keys: api_key_index,
            routing_profiles: routing_index,
        })
    }

    pub fn api_key(&self, api_key: &str) -> Option<&Arc<ApiKeyProfile>> {
        self.api_keys.get(api_key)
    }

    /// Exact `(tenant, id, subsystem)` match first, then the tenant's `*any` profile.
    pub fn routing_profile(
        &self,
        tenant: &str,
        id: &str,
        subsystem: &str,
    ) -> Option<&Arc<RoutingProfile>> {
        self.routing_profiles
            .get(&RoutingProfileKey::new(tenant, id, subsystem))
            .or_else(|| {
                self.routing_profiles
                    .get(&RoutingProfileKey::new(tenant, id, ANY_SUBSYSTEM))
            })
    }

    /// Every host id referenced by any routing profile.
    pub fn host_ids(&self) -> HashSet<&str> {
        self.routing_profiles
            .values()
            .flat_map(|profile| profile.hosts.iter().map(|host| host.id.as_str()))
            .collect()
    }

    pub fn api_key_count(&self) -> usize {
        self.api_keys.len()
    }

    pub fn routing_profile_count(&self) -> usize {
        self.routing_profiles.len()
    }
}
