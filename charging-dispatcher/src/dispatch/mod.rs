//! Dispatch Engine layer.
//!
//! One [`Dispatcher`] fronts every subsystem. A call is authenticated and authorized
//! against the current profile snapshot, then routed to the replicas of the resolved
//! routing profile in weight order. A connectivity failure on one replica moves the call
//! to the next one. An error produced by the replica itself goes back to the caller as is.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use charging_dispatcher::{
//!     ApiKeyProfile, CallError, ConnectivityError, Connector, DispatchRequest, Dispatcher,
//!     DispatcherConfig, HostEntry, ProfileTables, RoutingProfile, RpcConnection,
//! };
//! use serde_json::{json, Value};
//!
//! struct Pong;
//!
//! #[async_trait]
//! impl RpcConnection for Pong {
//!     async fn invoke(&self, _method: &str, _args: &Value) -> Result<Value, CallError> {
//!         Ok(json!("Pong"))
//!     }
//! }
//!
//! struct PongConnector;
//!
//! #[async_trait]
//! impl Connector for PongConnector {
//!     async fn connect(&self, _address: &str) -> Result<Arc<dyn RpcConnection>, ConnectivityError> {
//!         Ok(Arc::new(Pong))
//!     }
//! }
//!
//! let tables = ProfileTables::build(
//!     vec![ApiKeyProfile::new("attr12345", "cgrates.org", &["AttributeSv1"], "DSP1")],
//!     vec![RoutingProfile::new(
//!         "DSP1",
//!         "cgrates.org",
//!         "AttributeSv1",
//!         vec![HostEntry::new("ENGINE1", "127.0.0.1:2012", 20.0)],
//!     )],
//! )
//! .unwrap();
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let dispatcher = Dispatcher::new(
//!     "doc",
//!     DispatcherConfig::default(),
//!     Arc::new(PongConnector),
//!     Arc::new(tables),
//! )
//! .await
//! .unwrap();
//!
//! let request = DispatchRequest::new("attr12345", "cgrates.org", "AttributeSv1", "Ping", Value::Null);
//! assert_eq!(dispatcher.dispatch(request).await.unwrap(), json!("Pong"));
//! # });
//! ```

pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod request;
