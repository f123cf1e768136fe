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

//! JSON-RPC server loop for anything implementing [`RpcHandler`].

use crate::json_rpc::codec::{encode_frame, RequestFrame, ResponseFrame};
use crate::observability::events;
use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "json_rpc_server";

/// Server-side method table. An `Err` is sent to the caller as the frame's `error` string.
#[async_trait]
pub trait RpcHandler: Send + Sync {
    async fn handle(&self, method: &str, args: Value) -> Result<Value, String>;
}

/// Accepts connections on `listener` until `shutdown` fires.
///
/// Requests on one connection are served concurrently. On shutdown every open connection
/// is closed before this returns.
pub async fn serve(
    listener: TcpListener,
    handler: Arc<dyn RpcHandler>,
    shutdown: CancellationToken,
) -> io::Result<()> {
    let local_address = listener.local_addr()?;
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(
                            event = events::RPC_SERVER_ACCEPT,
                            component = COMPONENT,
                            listen_address = %local_address,
                            err = %err,
                            "accept failed"
                        );
                        continue;
                    }
                };
                debug!(
                    event = events::RPC_SERVER_ACCEPT,
                    component = COMPONENT,
                    listen_address = %local_address,
                    peer = %peer,
                    "client connected"
                );
                let _ = stream.set_nodelay(true);
                connections.spawn(serve_connection(
                    stream,
                    peer,
                    handler.clone(),
                    shutdown.clone(),
                ));
            }
        }
    }

    connections.shutdown().await;
    info!(
        event = events::RPC_SERVER_CLOSED,
        component = COMPONENT,
        listen_address = %local_address,
        "server stopped"
    );
    Ok(())
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn RpcHandler>,
    shutdown: CancellationToken,
) {
    let (read_half, write_half) = stream.into_split();
    let writer = Arc::new(Mutex::new(write_half));
    let mut lines = BufReader::new(read_half).lines();
    let mut requests = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = requests.join_next(), if !requests.is_empty() => {}
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        debug!(
                            event = events::RPC_SERVER_CLOSED,
                            component = COMPONENT,
                            peer = %peer,
                            err = %err,
                            "read from client failed"
                        );
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<RequestFrame>(&line) {
                    Ok(request) => {
                        requests.spawn(answer(request, handler.clone(), writer.clone()));
                    }
                    Err(err) => {
                        warn!(
                            event = events::RPC_SERVER_BAD_FRAME,
                            component = COMPONENT,
                            peer = %peer,
                            err = %err,
                            "dropping malformed request frame"
                        );
                    }
                }
            }
        }
    }

    requests.shutdown().await;
    debug!(
        event = events::RPC_SERVER_CLOSED,
        component = COMPONENT,
        peer = %peer,
        "client connection closed"
    );
}

async fn answer(
    request: RequestFrame,
    handler: Arc<dyn RpcHandler>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
) {
    let id = request.id;
    let method = request.method.clone();
    let outcome = handler.handle(&method, request.into_args()).await;

    let bytes = match encode_frame(&ResponseFrame::from_outcome(id, outcome)) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                event = events::RPC_SERVER_BAD_FRAME,
                component = COMPONENT,
                method = method.as_str(),
                err = %err,
                "unable to encode response"
            );
            return;
        }
    };

    let mut writer = writer.lock().await;
    if let Err(err) = writer.write_all(&bytes).await {
        debug!(
            event = events::RPC_SERVER_CLOSED,
            component = COMPONENT,
            method = method.as_str(),
            err = %err,
            "unable to write response"
        );
    }
}
