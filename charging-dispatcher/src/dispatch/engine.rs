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

//! Authenticate, authorize, select, invoke and fail over.

use crate::authority::ApiKeyAuthority;
use crate::connection::registry::ConnectionRegistry;
use crate::connection::transport::Connector;
use crate::dispatch::config::DispatcherConfig;
use crate::dispatch::request::DispatchRequest;
use crate::error::{
    CallError, ConnectivityError, DispatchError, API_KEY_FIELD, METHOD_FIELD, SUBSYSTEM_FIELD,
};
use crate::observability::{events, fields};
use crate::profile_sync_health::ProfileSyncHealth;
use crate::profiles::profile_store::{ProfileSource, ProfileStore};
use crate::profiles::routing_profile::HostEntry;
use crate::profiles::tables::ProfileLoadError;
use serde_json::Value;
use std::sync::Arc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "dispatcher";

/// Method-agnostic dispatch engine.
///
/// Hosts are tried strictly in profile order, one at a time. A connectivity failure
/// evicts that host's connection and moves on; any other error is returned as is.
/// Nothing about a failed host is remembered once the call returns.
pub struct Dispatcher {
    name: String,
    config: DispatcherConfig,
    authority: ApiKeyAuthority,
    registry: ConnectionRegistry,
    profile_source: Arc<dyn ProfileSource>,
}

impl Dispatcher {
    /// Builds a dispatcher and performs the initial profile load from `profile_source`.
    pub async fn new(
        name: &str,
        config: DispatcherConfig,
        connector: Arc<dyn Connector>,
        profile_source: Arc<dyn ProfileSource>,
    ) -> Result<Self, ProfileLoadError> {
        let tables = profile_source.fetch_profiles().await?;
        let store = ProfileStore::new(tables);
        let registry = ConnectionRegistry::new(connector, config.connect_timeout());

        info!(
            event = events::PROFILE_RELOAD_OK,
            component = COMPONENT,
            dispatcher = name,
            snapshot_version = store.current_version(),
            "dispatcher started"
        );

        Ok(Self {
            name: name.to_string(),
            config,
            authority: ApiKeyAuthority::new(store),
            registry,
            profile_source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn authority(&self) -> &ApiKeyAuthority {
        &self.authority
    }

    pub fn profile_store(&self) -> &ProfileStore {
        self.authority.store()
    }

    pub fn connection_registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Re-fetches profiles from the configured source and publishes them atomically.
    ///
    /// In-flight calls keep the snapshot they started with.
    pub async fn reload_profiles(&self) -> ProfileSyncHealth {
        let store = self.authority.store();
        let health = store.refresh(self.profile_source.as_ref()).await;

        if health.last_attempt_succeeded == Some(true) {
            let snapshot = store.snapshot();
            let live_hosts = snapshot.tables().host_ids();
            self.registry
                .retain_hosts(|host_id| live_hosts.contains(host_id))
                .await;
        }

        health
    }

    /// Dispatches one call. Dropping the returned future stops any further host attempts.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<Value, DispatchError> {
        self.dispatch_inner(&request, None).await
    }

    /// Dispatches one call, giving up with [`DispatchError::Cancelled`] once `cancel` fires.
    pub async fn dispatch_cancellable(
        &self,
        request: DispatchRequest,
        cancel: &CancellationToken,
    ) -> Result<Value, DispatchError> {
        self.dispatch_inner(&request, Some(cancel)).await
    }

    async fn dispatch_inner(
        &self,
        request: &DispatchRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value, DispatchError> {
        let dispatch_id = Uuid::new_v4().to_string();
        let target = fields::format_target(request);

        debug!(
            event = events::DISPATCH_START,
            component = COMPONENT,
            dispatcher = self.name.as_str(),
            dispatch_id = dispatch_id.as_str(),
            target = target.as_str(),
            api_key = %fields::mask_api_key(&request.api_key),
            "dispatch started"
        );

        if let Err(err) = Self::validate(request) {
            return Err(self.rejected(&dispatch_id, &target, err));
        }

        let profile = match self.authority.authorize_method(
            &request.api_key,
            &request.tenant,
            &request.subsystem,
            &request.method,
        ) {
            Ok(profile) => profile,
            Err(err) => return Err(self.rejected(&dispatch_id, &target, err)),
        };

        let method = request.qualified_method();
        let mut last_failure: Option<(String, ConnectivityError)> = None;

        for (attempt, host) in profile.hosts.iter().enumerate() {
            debug!(
                event = events::DISPATCH_ATTEMPT,
                component = COMPONENT,
                dispatch_id = dispatch_id.as_str(),
                target = target.as_str(),
                attempt,
                host_id = host.id.as_str(),
                address = host.address.as_str(),
                "attempting host"
            );

            let outcome = match cancel {
                Some(token) => {
                    if token.is_cancelled() {
                        return Err(self.cancelled(&dispatch_id, &target, attempt));
                    }
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            return Err(self.cancelled(&dispatch_id, &target, attempt));
                        }
                        outcome = self.attempt(host, &method, &request.args) => outcome,
                    }
                }
                None => self.attempt(host, &method, &request.args).await,
            };

            match outcome {
                Ok(reply) => {
                    debug!(
                        event = events::DISPATCH_OK,
                        component = COMPONENT,
                        dispatch_id = dispatch_id.as_str(),
                        target = target.as_str(),
                        attempt,
                        host_id = host.id.as_str(),
                        "dispatch succeeded"
                    );
                    return Ok(reply);
                }
                Err(CallError::Remote(err)) => {
                    debug!(
                        event = events::DISPATCH_REMOTE_ERROR,
                        component = COMPONENT,
                        dispatch_id = dispatch_id.as_str(),
                        target = target.as_str(),
                        attempt,
                        host_id = host.id.as_str(),
                        err = %err,
                        "replica returned an application error"
                    );
                    return Err(DispatchError::Remote(err));
                }
                Err(CallError::Connectivity(err)) => {
                    warn!(
                        event = events::DISPATCH_ATTEMPT_CONNECTIVITY_FAILED,
                        component = COMPONENT,
                        dispatch_id = dispatch_id.as_str(),
                        target = target.as_str(),
                        attempt,
                        host_id = host.id.as_str(),
                        address = host.address.as_str(),
                        err = %err,
                        "host unreachable; failing over"
                    );
                    last_failure = Some((host.id.clone(), err));
                }
            }
        }

        match last_failure {
            Some((host_id, source)) => {
                warn!(
                    event = events::DISPATCH_EXHAUSTED,
                    component = COMPONENT,
                    dispatch_id = dispatch_id.as_str(),
                    target = target.as_str(),
                    hosts = profile.hosts.len(),
                    host_id = host_id.as_str(),
                    err = %source,
                    "no replica reachable"
                );
                Err(DispatchError::NoReachableReplica { host_id, source })
            }
            None => Err(DispatchError::NoRouteAvailable {
                tenant: request.tenant.clone(),
                subsystem: request.subsystem.clone(),
            }),
        }
    }

    fn validate(request: &DispatchRequest) -> Result<(), DispatchError> {
        if request.api_key.is_empty() {
            return Err(DispatchError::MandatoryFieldMissing(API_KEY_FIELD));
        }
        if request.subsystem.is_empty() {
            return Err(DispatchError::MandatoryFieldMissing(SUBSYSTEM_FIELD));
        }
        if request.method.is_empty() {
            return Err(DispatchError::MandatoryFieldMissing(METHOD_FIELD));
        }
        Ok(())
    }

    /// One host attempt: acquire a connection, then invoke within the attempt timeout.
    async fn attempt(&self, host: &HostEntry, method: &str, args: &Value) -> Result<Value, CallError> {
        let handle = self.registry.get_or_create(&host.id, &host.address).await?;

        match time::timeout(self.config.attempt_timeout(), handle.invoke(method, args)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(CallError::Remote(err))) => Err(CallError::Remote(err)),
            Ok(Err(CallError::Connectivity(err))) => {
                self.registry.evict(&handle).await;
                Err(CallError::Connectivity(err))
            }
            Err(_) => {
                self.registry.evict(&handle).await;
                Err(CallError::Connectivity(ConnectivityError::new(
                    &host.address,
                    format!("call timed out after {:?}", self.config.attempt_timeout()),
                )))
            }
        }
    }

    fn rejected(&self, dispatch_id: &str, target: &str, err: DispatchError) -> DispatchError {
        info!(
            event = events::DISPATCH_AUTHORIZATION_FAILED,
            component = COMPONENT,
            dispatch_id,
            target,
            err = %err,
            "dispatch rejected"
        );
        err
    }

    fn cancelled(&self, dispatch_id: &str, target: &str, attempt: usize) -> DispatchError {
        info!(
            event = events::DISPATCH_CANCELLED,
            component = COMPONENT,
            dispatch_id,
            target,
            attempt,
            "dispatch cancelled; no further hosts tried"
        );
        DispatchError::Cancelled
    }
}
