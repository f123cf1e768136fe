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
use charging_dispatcher::{serve, RpcHandler};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct Running {
    shutdown: CancellationToken,
    server: JoinHandle<io::Result<()>>,
}

/// A JSON-RPC server on a fixed local address that can be stopped and restarted
/// on that same address.
pub struct StubEngine {
    address: SocketAddr,
    handler: Arc<dyn RpcHandler>,
    running: Option<Running>,
}

impl StubEngine {
    /// Starts `engine` on an ephemeral loopback port.
    pub async fn start(engine: Arc<AttributeEngine>) -> io::Result<Self> {
        let handler: Arc<dyn RpcHandler> = engine;
        Self::start_handler(handler).await
    }

    pub async fn start_handler(handler: Arc<dyn RpcHandler>) -> io::Result<Self> {
        let listener = bind("127.0.0.1:0".parse().map_err(invalid_input)?)?;
        let address = listener.local_addr()?;
        let mut engine = Self {
            address,
            handler,
            running: None,
        };
        engine.run(listener);
        Ok(engine)
    }

    pub fn address(&self) -> String {
        self.address.to_string()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn run(&mut self, listener: TcpListener) {
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(serve(listener, self.handler.clone(), shutdown.clone()));
        self.running = Some(Running { shutdown, server });
        debug!(address = %self.address, "stub engine started");
    }

    /// Stops accepting and closes every open connection before returning.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown.cancel();
            let _ = running.server.await;
            debug!(address = %self.address, "stub engine stopped");
        }
    }

    /// Starts again on the original address.
    pub async fn restart(&mut self) -> io::Result<()> {
        self.stop().await;
        let listener = bind(self.address)?;
        self.run(listener);
        Ok(())
    }
}

impl Drop for StubEngine {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown.cancel();
        }
    }
}

fn bind(address: SocketAddr) -> io::Result<TcpListener> {
    let socket = if address.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(address)?;
    socket.listen(1024)
}

fn invalid_input(err: std::net::AddrParseError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

/// Binds and immediately releases a loopback port, yielding an address nothing listens on.
pub async fn unused_address() -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.to_string())
}
