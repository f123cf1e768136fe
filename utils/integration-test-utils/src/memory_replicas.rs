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

use crate::attribute_engine::AttributeEngine;
use async_trait::async_trait;
use charging_dispatcher::{CallError, ConnectivityError, Connector, RemoteError, RpcConnection};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// An in-process replica that can be stopped and started like an engine process.
///
/// Stopping bumps a generation counter so connections dialed before the stop stay dead
/// after a restart, the same way a restarted process drops its old sockets.
pub struct MemoryReplica {
    address: String,
    engine: AttributeEngine,
    up: AtomicBool,
    generation: AtomicU64,
    dials: AtomicUsize,
}

impl MemoryReplica {
    pub fn new(address: &str, engine: AttributeEngine) -> Arc<Self> {
        Arc::new(Self {
            address: address.to_string(),
            engine,
            up: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            dials: AtomicUsize::new(0),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn engine(&self) -> &AttributeEngine {
        &self.engine
    }

    pub fn stop(&self) {
        self.up.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn start(&self) {
        self.up.store(true, Ordering::SeqCst);
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.engine.calls()
    }

    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

struct MemoryConnection {
    replica: Arc<MemoryReplica>,
    generation: u64,
}

#[async_trait]
impl RpcConnection for MemoryConnection {
    async fn invoke(&self, method: &str, args: &Value) -> Result<Value, CallError> {
        if !self.is_connected() {
            return Err(CallError::Connectivity(ConnectivityError::new(
                self.replica.address(),
                "connection reset by peer",
            )));
        }
        self.replica
            .engine
            .answer(method, args)
            .await
            .map_err(|message| CallError::Remote(RemoteError::new(message)))
    }

    fn is_connected(&self) -> bool {
        self.replica.is_up() && self.replica.generation.load(Ordering::SeqCst) == self.generation
    }
}

/// Connector resolving addresses to registered [`MemoryReplica`]s.
#[derive(Default)]
pub struct MemoryConnector {
    replicas: RwLock<HashMap<String, Arc<MemoryReplica>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, replica: Arc<MemoryReplica>) {
        if let Ok(mut replicas) = self.replicas.write() {
            replicas.insert(replica.address().to_string(), replica);
        }
    }

    fn lookup(&self, address: &str) -> Option<Arc<MemoryReplica>> {
        self.replicas
            .read()
            .ok()
            .and_then(|replicas| replicas.get(address).cloned())
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn RpcConnection>, ConnectivityError> {
        let replica = self
            .lookup(address)
            .ok_or_else(|| ConnectivityError::new(address, "no route to host"))?;
        replica.dials.fetch_add(1, Ordering::SeqCst);
        if !replica.is_up() {
            return Err(ConnectivityError::new(address, "connection refused"));
        }
        let generation = replica.generation.load(Ordering::SeqCst);
        Ok(Arc::new(MemoryConnection {
            replica,
            generation,
        }))
    }
}
