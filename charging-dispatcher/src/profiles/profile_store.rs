//! Hot-reloadable profile store backed by an atomically swapped snapshot.

use crate::observability::events;
use crate::profile_sync_health::ProfileSyncHealth;
use crate::profiles::tables::{ProfileLoadError, ProfileTables};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

const COMPONENT: &str = "profile_store";

/// Supplier of complete profile tables, consulted at start-up and on every reload.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profiles(&self) -> Result<ProfileTables, ProfileLoadError>;
}

#[async_trait]
impl ProfileSource for ProfileTables {
    async fn fetch_profiles(&self) -> Result<ProfileTables, ProfileLoadError> {
        Ok(self.clone())
    }
}

/// One published generation of the profile tables.
#[derive(Debug)]
pub struct ProfileSnapshot {
    version: u64,
    tables: ProfileTables,
}

impl ProfileSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tables(&self) -> &ProfileTables {
        &self.tables
    }
}

/// Readers always observe one whole snapshot; writers replace it wholesale.
#[derive(Clone)]
pub struct ProfileStore {
    snapshot: Arc<ArcSwap<ProfileSnapshot>>,
    next_version: Arc<AtomicU64>,
    health: Arc<Mutex<ProfileSyncHealth>>,
}

impl ProfileStore {
    fn from_tables(version: u64, tables: ProfileTables) -> Self {
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(ProfileSnapshot { version, tables })),
            next_version: Arc::new(AtomicU64::new(version + 1)),
            health: Arc::new(Mutex::new(ProfileSyncHealth::default())),
        }
    }

    /// Creates a store with no keys and no routes.
    pub fn empty() -> Self {
        Self::from_tables(0, ProfileTables::default())
    }

    /// Creates a store publishing `tables` as version 1.
    pub fn new(tables: ProfileTables) -> Self {
        Self::from_tables(1, tables)
    }

    /// Returns the current snapshot; it stays valid for as long as the caller holds it.
    pub fn snapshot(&self) -> Arc<ProfileSnapshot> {
        self.snapshot.load_full()
    }

    pub fn current_version(&self) -> u64 {
        self.snapshot.load().version
    }

    /// Publishes `tables` as the next snapshot and returns its version.
    pub fn replace(&self, tables: ProfileTables) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        self.snapshot
            .store(Arc::new(ProfileSnapshot { version, tables }));
        version
    }

    /// Fetches from `source` and publishes on success; a failed fetch keeps the current snapshot.
    pub async fn refresh(&self, source: &dyn ProfileSource) -> ProfileSyncHealth {
        let fetched = source.fetch_profiles().await;
        let mut health = self.health.lock().await;

        match fetched {
            Ok(tables) => {
                let api_keys = tables.api_key_count();
                let routing_profiles = tables.routing_profile_count();
                let version = self.replace(tables);
                info!(
                    event = events::PROFILE_RELOAD_OK,
                    component = COMPONENT,
                    snapshot_version = version,
                    api_keys,
                    routing_profiles,
                    "profile tables published"
                );
                health.record_attempt(true, version);
            }
            Err(err) => {
                let version = self.current_version();
                warn!(
                    event = events::PROFILE_RELOAD_FAILED,
                    component = COMPONENT,
                    snapshot_version = version,
                    err = %err,
                    "profile reload failed; keeping previous snapshot"
                );
                health.record_attempt(false, version);
            }
        }

        health.clone()
    }

    pub async fn sync_health(&self) -> ProfileSyncHealth {
        self.health.lock().await.clone()
    }
}
