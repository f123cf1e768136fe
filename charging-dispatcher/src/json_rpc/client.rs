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

//! Multiplexed JSON-RPC client connection over TCP.

use crate::connection::transport::{Connector, RpcConnection};
use crate::error::{CallError, ConnectivityError, RemoteError};
use crate::json_rpc::codec::{encode_frame, RequestFrame, ResponseFrame};
use crate::observability::events;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const COMPONENT: &str = "json_rpc_client";

type PendingCalls = HashMap<u64, oneshot::Sender<Result<Value, CallError>>>;

struct Shared {
    address: String,
    connected: AtomicBool,
    pending: StdMutex<PendingCalls>,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, PendingCalls> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn connectivity(&self, reason: impl Into<String>) -> CallError {
        CallError::Connectivity(ConnectivityError::new(&self.address, reason))
    }

    /// Marks the connection dead and fails every call still waiting for a reply.
    fn close(&self, reason: &str) {
        self.connected.store(false, Ordering::Release);
        let drained: Vec<_> = self.pending().drain().collect();
        let pending_calls = drained.len();
        for (_, waiter) in drained {
            let _ = waiter.send(Err(self.connectivity(reason)));
        }
        debug!(
            event = events::RPC_CLIENT_READER_CLOSED,
            component = COMPONENT,
            address = self.address.as_str(),
            pending_calls,
            reason,
            "replica connection closed"
        );
    }
}

/// Removes a call's reply slot when the call finishes or its future is dropped.
struct PendingSlot<'a> {
    shared: &'a Shared,
    id: u64,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.shared.pending().remove(&self.id);
    }
}

/// One TCP connection to a replica. Concurrent calls share the socket and are matched
/// to their replies by request id.
pub struct JsonRpcConnection {
    shared: Arc<Shared>,
    writer: Mutex<OwnedWriteHalf>,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
}

impl JsonRpcConnection {
    pub async fn connect(address: &str) -> Result<Self, ConnectivityError> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|err| ConnectivityError::new(address, err.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|err| ConnectivityError::new(address, err.to_string()))?;
        Ok(Self::from_stream(address, stream))
    }

    fn from_stream(address: &str, stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        let shared = Arc::new(Shared {
            address: address.to_string(),
            connected: AtomicBool::new(true),
            pending: StdMutex::new(HashMap::new()),
        });
        let reader = tokio::spawn(read_responses(shared.clone(), read_half));

        Self {
            shared,
            writer: Mutex::new(write_half),
            next_id: AtomicU64::new(1),
            reader,
        }
    }

    pub fn address(&self) -> &str {
        &self.shared.address
    }

    #[cfg(test)]
    fn pending_calls(&self) -> usize {
        self.shared.pending().len()
    }
}

impl Drop for JsonRpcConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_responses(shared: Arc<Shared>, read_half: OwnedReadHalf) {
    let mut lines = BufReader::new(read_half).lines();

    let reason = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break "connection closed by replica".to_string(),
            Err(err) => break err.to_string(),
        };
        if line.trim().is_empty() {
            continue;
        }

        let frame: ResponseFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(err) => break format!("malformed response frame: {err}"),
        };

        let Some(waiter) = shared.pending().remove(&frame.id) else {
            debug!(
                event = events::RPC_CLIENT_ORPHAN_RESPONSE,
                component = COMPONENT,
                address = shared.address.as_str(),
                id = frame.id,
                "response for a call nobody is waiting on"
            );
            continue;
        };
        let outcome = match frame.error {
            Some(message) => Err(CallError::Remote(RemoteError::new(message))),
            None => Ok(frame.result),
        };
        let _ = waiter.send(outcome);
    };

    shared.close(&reason);
}

#[async_trait]
impl RpcConnection for JsonRpcConnection {
    async fn invoke(&self, method: &str, args: &Value) -> Result<Value, CallError> {
        if !self.is_connected() {
            return Err(self.shared.connectivity("connection is closed"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let bytes = encode_frame(&RequestFrame::new(id, method, args))
            .map_err(|err| self.shared.connectivity(format!("unable to encode request: {err}")))?;

        let (waiter, reply) = oneshot::channel();
        {
            let mut pending = self.shared.pending();
            if !self.is_connected() {
                return Err(self.shared.connectivity("connection is closed"));
            }
            pending.insert(id, waiter);
        }
        let _slot = PendingSlot {
            shared: &self.shared,
            id,
        };

        let written = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(&bytes).await {
                Ok(()) => writer.flush().await,
                Err(err) => Err(err),
            }
        };
        if let Err(err) = written {
            self.shared.connected.store(false, Ordering::Release);
            warn!(
                event = events::RPC_CLIENT_READER_CLOSED,
                component = COMPONENT,
                address = self.address(),
                err = %err,
                "write to replica failed"
            );
            return Err(self.shared.connectivity(err.to_string()));
        }

        match reply.await {
            Ok(outcome) => outcome,
            Err(_) => Err(self.shared.connectivity("connection dropped before reply")),
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }
}

/// Dials replicas over plain TCP.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn RpcConnection>, ConnectivityError> {
        let connection = JsonRpcConnection::connect(address).await?;
        Ok(Arc::new(connection))
    }
}
