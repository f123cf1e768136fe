//! Generic RPC façade layer.
//!
//! Inbound calls arrive as a qualified method name (`AttributeSv1.Ping`) plus an envelope
//! object carrying `APIKey`, optionally `Tenant`, and the method's own arguments. The
//! façade pulls the key out, builds a dispatch request and returns whatever the
//! dispatcher returns. It never looks at the method name beyond splitting it.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use charging_dispatcher::{
//!     ApiKeyProfile, AttributeSv1, BareEnvelope, CallError, ConnectivityError, Connector,
//!     Dispatcher, DispatcherConfig, HostEntry, ProfileTables, RoutingProfile, RpcConnection,
//!     RpcFacade, PONG,
//! };
//! use serde_json::{json, Value};
//!
//! struct Pong;
//!
//! #[async_trait]
//! impl RpcConnection for Pong {
//!     async fn invoke(&self, _method: &str, _args: &Value) -> Result<Value, CallError> {
//!         Ok(json!(PONG))
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
//! let dispatcher = Dispatcher::new(
//!     "doc",
//!     DispatcherConfig::default(),
//!     Arc::new(PongConnector),
//!     Arc::new(tables),
//! )
//! .await
//! .unwrap();
//! let facade = RpcFacade::new(Arc::new(dispatcher), "cgrates.org");
//!
//! let reply = facade.call("AttributeSv1.Ping", json!({ "APIKey": "attr12345" })).await;
//! assert_eq!(reply.unwrap(), json!("Pong"));
//!
//! let missing = facade.call("AttributeSv1.Ping", json!({})).await.unwrap_err();
//! assert_eq!(missing.to_string(), "MANDATORY_IE_MISSING: [APIKey]");
//!
//! let pong = AttributeSv1::new(&facade)
//!     .ping(&BareEnvelope::bare("attr12345", "cgrates.org"))
//!     .await
//!     .unwrap();
//! assert_eq!(pong, PONG);
//! # });
//! ```

pub(crate) mod envelope;
pub(crate) mod methods;
pub(crate) mod rpc_facade;
