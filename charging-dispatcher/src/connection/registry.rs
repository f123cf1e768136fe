/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Lazily dialed, reusable replica connections keyed by host id.

use crate::connection::transport::{Connector, RpcConnection};
use crate::error::{CallError, ConnectivityError};
use crate::observability::{events, fields};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time;
use tracing::{debug, warn};

const COMPONENT: &str = "connection_registry";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Unconnected,
    Live,
    Failed,
}

struct ConnectionInner {
    host_id: String,
    address: String,
    connection: Arc<dyn RpcConnection>,
    failed: AtomicBool,
}

/// Opaque handle to one dialed connection. Invocation never holds a registry lock.
#[derive(Clone)]
pub struct ConnectionHandle {
    inner: Arc<ConnectionInner>,
}

impl ConnectionHandle {
    fn new(host_id: &str, address: &str, connection: Arc<dyn RpcConnection>) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                host_id: host_id.to_string(),
                address: address.to_string(),
                connection,
                failed: AtomicBool::new(false),
            }),
        }
    }

    pub fn host_id(&self) -> &str {
        &self.inner.host_id
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn state(&self) -> ConnectionState {
        if self.inner.failed.load(Ordering::Acquire) || !self.inner.connection.is_connected() {
            ConnectionState::Failed
        } else {
            ConnectionState::Live
        }
    }

    pub async fn invoke(&self, method: &str, args: &Value) -> Result<Value, CallError> {
        self.inner.connection.invoke(method, args).await
    }

    fn mark_failed(&self) {
        self.inner.failed.store(true, Ordering::Release);
    }

    fn same_connection(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for ConnectionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("host_id", &self.inner.host_id)
            .field("address", &self.inner.address)
            .field("state", &self.state())
            .finish()
    }
}

/// Per-host cell; its lock serializes dialing for that host only.
#[derive(Default)]
struct HostSlot {
    current: Mutex<Option<ConnectionHandle>>,
}

/// Owner of every replica connection.
///
/// The map lock is held only to find or insert a host slot. Dialing happens under the
/// host slot's own lock, and invocation happens on a cloned handle with no lock held.
pub struct ConnectionRegistry {
    connector: Arc<dyn Connector>,
    connect_timeout: Duration,
    slots: Mutex<HashMap<String, Arc<HostSlot>>>,
}

impl ConnectionRegistry {
    pub fn new(connector: Arc<dyn Connector>, connect_timeout: Duration) -> Self {
        Self {
            connector,
            connect_timeout,
            slots: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, host_id: &str) -> Arc<HostSlot> {
        let mut slots = self.slots.lock().await;
        slots
            .entry(host_id.to_string())
            .or_insert_with(|| Arc::new(HostSlot::default()))
            .clone()
    }

    async fn existing_slot(&self, host_id: &str) -> Option<Arc<HostSlot>> {
        self.slots.lock().await.get(host_id).cloned()
    }

    /// Returns the cached live connection for `host_id` or dials `address`.
    ///
    /// A cached connection that failed, or that points at a different address than the
    /// one resolved for this call, is replaced. The connect timeout covers waiting for
    /// another caller's dial on the same host as well as this caller's own dial.
    pub async fn get_or_create(
        &self,
        host_id: &str,
        address: &str,
    ) -> Result<ConnectionHandle, ConnectivityError> {
        match time::timeout(self.connect_timeout, self.acquire(host_id, address)).await {
            Ok(acquired) => acquired,
            Err(_) => {
                let err = ConnectivityError::new(
                    address,
                    format!("connect timed out after {:?}", self.connect_timeout),
                );
                warn!(
                    event = events::CONNECTION_DIAL_FAILED,
                    component = COMPONENT,
                    host_id,
                    address,
                    reason = fields::REASON_CONNECT_TIMEOUT,
                    err = %err,
                    "unable to dial replica"
                );
                Err(err)
            }
        }
    }

    async fn acquire(
        &self,
        host_id: &str,
        address: &str,
    ) -> Result<ConnectionHandle, ConnectivityError> {
        let slot = self.slot(host_id).await;
        let mut current = slot.current.lock().await;

        if let Some(handle) = current.as_ref() {
            if handle.state() == ConnectionState::Live && handle.address() == address {
                debug!(
                    event = events::CONNECTION_REUSE,
                    component = COMPONENT,
                    host_id,
                    address,
                    "reusing cached connection"
                );
                return Ok(handle.clone());
            }
            debug!(
                event = events::CONNECTION_EVICT,
                component = COMPONENT,
                host_id,
                address = handle.address(),
                reason = fields::REASON_STALE_BEFORE_REUSE,
                "dropping unusable cached connection"
            );
            *current = None;
        }

        debug!(
            event = events::CONNECTION_DIAL_START,
            component = COMPONENT,
            host_id,
            address,
            "dialing replica"
        );

        match self.connector.connect(address).await {
            Ok(connection) => {
                let handle = ConnectionHandle::new(host_id, address, connection);
                *current = Some(handle.clone());
                debug!(
                    event = events::CONNECTION_DIAL_OK,
                    component = COMPONENT,
                    host_id,
                    address,
                    "replica connection established"
                );
                Ok(handle)
            }
            Err(err) => {
                warn!(
                    event = events::CONNECTION_DIAL_FAILED,
                    component = COMPONENT,
                    host_id,
                    address,
                    err = %err,
                    "unable to dial replica"
                );
                Err(err)
            }
        }
    }

    /// Drops whatever connection is cached for `host_id`; other hosts are untouched.
    pub async fn invalidate(&self, host_id: &str) {
        let Some(slot) = self.existing_slot(host_id).await else {
            return;
        };
        let mut current = slot.current.lock().await;
        if let Some(handle) = current.take() {
            handle.mark_failed();
            debug!(
                event = events::CONNECTION_EVICT,
                component = COMPONENT,
                host_id,
                address = handle.address(),
                reason = fields::REASON_INVALIDATED,
                "connection invalidated"
            );
        }
    }

    /// Marks `handle` failed and evicts it if it is still the cached connection.
    ///
    /// If another caller is re-dialing the host right now the slot is left to it.
    pub(crate) async fn evict(&self, handle: &ConnectionHandle) {
        handle.mark_failed();

        let Some(slot) = self.existing_slot(handle.host_id()).await else {
            return;
        };
        let Ok(mut current) = slot.current.try_lock() else {
            return;
        };
        if current
            .as_ref()
            .is_some_and(|cached| cached.same_connection(handle))
        {
            *current = None;
            debug!(
                event = events::CONNECTION_EVICT,
                component = COMPONENT,
                host_id = handle.host_id(),
                address = handle.address(),
                reason = fields::REASON_CONNECTIVITY_FAILURE,
                "evicted failed connection"
            );
        }
    }

    /// Forgets host slots whose id no longer appears in any routing profile.
    pub async fn retain_hosts<F>(&self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.slots
            .lock()
            .await
            .retain(|host_id, _| keep(host_id.as_str()));
    }

    pub async fn state(&self, host_id: &str) -> ConnectionState {
        let Some(slot) = self.existing_slot(host_id).await else {
            return ConnectionState::Unconnected;
        };
        let current = slot.current.lock().await;
        current
            .as_ref()
            .map(ConnectionHandle::state)
            .unwrap_or(ConnectionState::Unconnected)
    }
}
