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

//! # charging-dispatcher
//!
//! `charging-dispatcher` is the RPC routing tier in front of charging subsystem engines.
//! A caller names a method such as `AttributeSv1.GetAttributeForEvent` and supplies an
//! API key; the dispatcher authorizes the key, picks replicas from the key's routing
//! profile and fails over between them on connectivity failures.
//!
//! Typical usage is API-first and centers on [`Dispatcher`] and [`RpcFacade`].
//!
//! ## Static profiles over TCP
//!
//! ```no_run
//! use std::sync::Arc;
//! use charging_dispatcher::{
//!     serve, Dispatcher, DispatcherConfig, ProfileSource, RpcFacade, TcpConnector,
//! };
//! use profile_static_file::ProfileStaticFile;
//! use tokio::net::TcpListener;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let profiles: Arc<dyn ProfileSource> = Arc::new(ProfileStaticFile::new(
//!     "../utils/profile-static-file/static-configs/profiles.json5",
//! ));
//! let dispatcher = Dispatcher::new(
//!     "quick-start",
//!     DispatcherConfig::default(),
//!     Arc::new(TcpConnector::new()),
//!     profiles,
//! )
//! .await
//! .unwrap();
//!
//! let facade = Arc::new(RpcFacade::new(Arc::new(dispatcher), "cgrates.org"));
//! let listener = TcpListener::bind("127.0.0.1:2012").await.unwrap();
//! serve(listener, facade, CancellationToken::new()).await.unwrap();
//! # });
//! ```
//!
//! ## Error contract
//!
//! Every failure a caller can see is a [`DispatchError`]. Its `Display` output is the
//! string sent over the wire: `MANDATORY_IE_MISSING: [APIKey]`, `UNKNOWN_API_KEY`,
//! `UNAUTHORIZED_API`, and so on. Errors produced by a replica are passed through with
//! their message untouched, so `NOT_FOUND` from an engine is `NOT_FOUND` to the caller.
//!
//! `reload_profiles()` returns [`ProfileSyncHealth`] describing the last reload attempt.
//!
//! ## Layers
//!
//! - Façade: envelope parsing and typed per-subsystem wrappers
//! - Dispatch: authorize, select, invoke and fail over
//! - Authority: API key to routing profile resolution
//! - Profiles: validated tables behind an atomically swapped snapshot
//! - Connection: lazily dialed connections keyed by host id
//! - JSON-RPC: the TCP transport and server loop
//!
//! ## Observability
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber` initialization.

mod authority;
pub use authority::ApiKeyAuthority;

mod connection;
pub use connection::registry::{ConnectionHandle, ConnectionRegistry, ConnectionState};
pub use connection::transport::{Connector, RpcConnection};

mod dispatch;
pub use dispatch::config::{DispatcherConfig, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};
pub use dispatch::engine::Dispatcher;
pub use dispatch::request::DispatchRequest;

mod error;
pub use error::{
    CallError, ConnectivityError, DispatchError, ErrorKind, RemoteError, API_KEY_FIELD,
    METHOD_FIELD, SUBSYSTEM_FIELD, TENANT_FIELD,
};

mod facade;
pub use facade::envelope::{open_envelope, split_method, ApiKeyEnvelope, BareEnvelope};
pub use facade::methods::{
    AttributeSv1, ResourceSv1, SessionSv1, SubsystemClient, ATTRIBUTE_SV1, PING, PONG,
    RESOURCE_SV1, SESSION_SV1,
};
pub use facade::rpc_facade::RpcFacade;

mod json_rpc;
pub use json_rpc::client::{JsonRpcConnection, TcpConnector};
pub use json_rpc::server::{serve, RpcHandler};

#[doc(hidden)]
pub mod observability;

mod profile_sync_health;
pub use profile_sync_health::ProfileSyncHealth;

mod profiles;
pub use profiles::api_key_profile::{ApiKeyProfile, ANY_API};
pub use profiles::profile_store::{ProfileSnapshot, ProfileSource, ProfileStore};
pub use profiles::routing_profile::{HostEntry, RoutingProfile, ANY_SUBSYSTEM};
pub use profiles::tables::{ProfileLoadError, ProfileTables};
