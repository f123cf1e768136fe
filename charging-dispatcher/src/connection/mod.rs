//! Connection Registry layer.
//!
//! Owns replica connections for the whole dispatcher. Connections are created on first
//! use per host id, reused across calls, and evicted on a connectivity failure so the
//! next call re-dials from scratch. No failure state outlives the eviction.
//!
//! Transports plug in through [`Connector`] and [`RpcConnection`]:
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use charging_dispatcher::{CallError, ConnectionRegistry, ConnectivityError, Connector, RpcConnection};
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
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let registry = ConnectionRegistry::new(Arc::new(PongConnector), Duration::from_secs(1));
//! let handle = registry.get_or_create("A", "127.0.0.1:2012").await.unwrap();
//! assert_eq!(handle.invoke("AttributeSv1.Ping", &Value::Null).await.unwrap(), json!("Pong"));
//! # });
//! ```

pub(crate) mod registry;
pub(crate) mod transport;
