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

mod config;

use crate::config::Config;
use charging_dispatcher::{serve, Dispatcher, RpcFacade, RpcHandler, TcpConnector};
use clap::Parser;
use profile_static_file::ProfileStaticFile;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command()]
struct DispatcherArgs {
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

#[derive(Debug)]
enum ServiceError {
    Config(String),
    Startup(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Config(message) => write!(f, "configuration error: {message}"),
            ServiceError::Startup(message) => write!(f, "startup error: {message}"),
        }
    }
}

impl std::error::Error for ServiceError {}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    info!("Started dispatcher-service");

    let args = DispatcherArgs::parse();
    let contents = std::fs::read_to_string(&args.config).map_err(|e| {
        ServiceError::Config(format!(
            "unable to read config file {}: {e}",
            args.config.display()
        ))
    })?;
    let config: Config = json5::from_str(&contents)
        .map_err(|e| ServiceError::Config(format!("unable to parse config file: {e}")))?;

    let profiles = Arc::new(ProfileStaticFile::new(config.profiles_path(&args.config)));
    let dispatcher = Dispatcher::new(
        &config.dispatcher.name,
        config.dispatcher_config(),
        Arc::new(TcpConnector::new()),
        profiles,
    )
    .await
    .map_err(|e| ServiceError::Startup(format!("initial profile load failed: {e}")))?;
    let dispatcher = Arc::new(dispatcher);
    let facade: Arc<dyn RpcHandler> = Arc::new(RpcFacade::new(
        dispatcher.clone(),
        &config.dispatcher.default_tenant,
    ));

    let listener = TcpListener::bind(&config.dispatcher.listen_address)
        .await
        .map_err(|e| {
            ServiceError::Startup(format!(
                "unable to bind {}: {e}",
                config.dispatcher.listen_address
            ))
        })?;
    info!(
        address = config.dispatcher.listen_address.as_str(),
        "dispatcher listening"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(reload_on_hangup(dispatcher.clone(), shutdown.clone()));
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    serve(listener, facade, shutdown)
        .await
        .map_err(|e| ServiceError::Startup(format!("server stopped with error: {e}")))?;

    info!("dispatcher-service stopped");
    Ok(())
}

async fn reload_on_hangup(dispatcher: Arc<Dispatcher>, shutdown: CancellationToken) {
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            error!(error = %e, "unable to install SIGHUP handler, profile reload disabled");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            received = hangup.recv() => {
                if received.is_none() {
                    return;
                }
            }
        }

        info!("received SIGHUP, reloading profiles");
        let health = dispatcher.reload_profiles().await;
        if health.last_attempt_succeeded == Some(true) {
            info!(
                snapshot_version = health.snapshot_version,
                "profile reload applied"
            );
        } else {
            warn!(
                snapshot_version = health.snapshot_version,
                "profile reload failed, keeping current profiles"
            );
        }
    }
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "unable to listen for ctrl-c");
        return;
    }
    info!("shutdown requested");
    shutdown.cancel();
}
