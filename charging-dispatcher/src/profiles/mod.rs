//! Routing Profile Store layer.
//!
//! Owns the in-memory shapes of API key profiles and routing profiles, their validation
//! into one [`ProfileTables`] generation, and the snapshot store that publishes whole
//! generations atomically.
//!
//! ```
//! use charging_dispatcher::{ApiKeyProfile, HostEntry, ProfileStore, ProfileTables, RoutingProfile};
//!
//! let tables = ProfileTables::build(
//!     vec![ApiKeyProfile::new("attr12345", "cgrates.org", &["AttributeSv1"], "DSP1")],
//!     vec![RoutingProfile::new(
//!         "DSP1",
//!         "cgrates.org",
//!         "AttributeSv1",
//!         vec![
//!             HostEntry::new("B", "127.0.0.1:2013", 10.0),
//!             HostEntry::new("A", "127.0.0.1:2012", 20.0),
//!         ],
//!     )],
//! )
//! .unwrap();
//!
//! let store = ProfileStore::new(tables);
//! let snapshot = store.snapshot();
//! let profile = snapshot
//!     .tables()
//!     .routing_profile("cgrates.org", "DSP1", "AttributeSv1")
//!     .unwrap();
//! assert_eq!(profile.host_ids(), vec!["A", "B"]);
//! ```

pub(crate) mod api_key_profile;
pub(crate) mod profile_store;
pub(crate) mod routing_profile;
pub(crate) mod tables;
