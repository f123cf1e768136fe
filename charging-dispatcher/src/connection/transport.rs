//! Narrow capability interface every RPC transport implements once.

use crate::error::{CallError, ConnectivityError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// An established client connection able to invoke remote procedures by name.
#[async_trait]
pub trait RpcConnection: Send + Sync {
    /// Invokes `method` with opaque `args`.
    ///
    /// Connectivity problems must surface as [`CallError::Connectivity`]; errors produced by
    /// the remote logic as [`CallError::Remote`].
    async fn invoke(&self, method: &str, args: &Value) -> Result<Value, CallError>;

    /// Whether the connection is still believed usable. Dead connections get re-dialed.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Dials connections to replica addresses.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Arc<dyn RpcConnection>, ConnectivityError>;
}
