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

//! Method-agnostic entry point in front of the dispatch engine.

use crate::dispatch::engine::Dispatcher;
use crate::error::DispatchError;
use crate::facade::envelope::open_envelope;
use crate::json_rpc::server::RpcHandler;
use crate::observability::{events, fields};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const COMPONENT: &str = "rpc_facade";

/// Turns `(method, envelope)` pairs into dispatches and hands back the reply as is.
#[derive(Clone)]
pub struct RpcFacade {
    dispatcher: Arc<Dispatcher>,
    default_tenant: String,
}

impl RpcFacade {
    /// `default_tenant` is used for envelopes that carry no `Tenant`.
    pub fn new(dispatcher: Arc<Dispatcher>, default_tenant: &str) -> Self {
        Self {
            dispatcher,
            default_tenant: default_tenant.to_string(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn default_tenant(&self) -> &str {
        &self.default_tenant
    }

    pub async fn call(&self, method: &str, envelope: Value) -> Result<Value, DispatchError> {
        let request = match open_envelope(method, envelope, &self.default_tenant) {
            Ok(request) => request,
            Err(err) => {
                info!(
                    event = events::FACADE_REJECTED,
                    component = COMPONENT,
                    method,
                    err = %err,
                    "rejected inbound envelope"
                );
                return Err(err);
            }
        };

        debug!(
            event = events::FACADE_REQUEST,
            component = COMPONENT,
            target = fields::format_target(&request).as_str(),
            api_key = %fields::mask_api_key(&request.api_key),
            "forwarding to dispatcher"
        );
        self.dispatcher.dispatch(request).await
    }

    /// [`call`](Self::call) with serde on both ends. Codec failures are `SERIALIZATION_ERROR`.
    pub async fn call_typed<A, R>(&self, method: &str, args: &A) -> Result<R, DispatchError>
    where
        A: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let envelope =
            serde_json::to_value(args).map_err(|err| DispatchError::Codec(err.to_string()))?;
        let reply = self.call(method, envelope).await?;
        serde_json::from_value(reply).map_err(|err| DispatchError::Codec(err.to_string()))
    }
}

#[async_trait]
impl RpcHandler for RpcFacade {
    async fn handle(&self, method: &str, args: Value) -> Result<Value, String> {
        self.call(method, args).await.map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::RpcFacade;
    use crate::connection::transport::{Connector, RpcConnection};
    use crate::dispatch::config::DispatcherConfig;
    use crate::dispatch::engine::Dispatcher;
    use crate::error::{CallError, ConnectivityError, DispatchError, RemoteError};
    use crate::facade::envelope::BareEnvelope;
    use crate::json_rpc::server::RpcHandler;
    use crate::profiles::api_key_profile::ApiKeyProfile;
    use crate::profiles::routing_profile::{HostEntry, RoutingProfile};
    use crate::profiles::tables::ProfileTables;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex as StdMutex};

    /// Records what reached the replica and answers with it.
    #[derive(Default)]
    struct RecordingConnection {
        seen: StdMutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl RpcConnection for RecordingConnection {
        async fn invoke(&self, method: &str, args: &Value) -> Result<Value, CallError> {
            self.seen
                .lock()
                .unwrap()
                .push((method.to_string(), args.clone()));
            match method {
                "AttributeSv1.Ping" => Ok(json!("Pong")),
                "AttributeSv1.ProcessEvent" => Ok(json!({ "AlteredFields": ["*req.Password"] })),
                _ => Err(CallError::Remote(RemoteError::new("NOT_FOUND"))),
            }
        }
    }

    struct SharedConnector(Arc<RecordingConnection>);

    #[async_trait]
    impl Connector for SharedConnector {
        async fn connect(
            &self,
            _address: &str,
        ) -> Result<Arc<dyn RpcConnection>, ConnectivityError> {
            Ok(self.0.clone())
        }
    }

    async fn facade() -> (RpcFacade, Arc<RecordingConnection>) {
        let connection = Arc::new(RecordingConnection::default());
        let tables = ProfileTables::build(
            vec![ApiKeyProfile::new(
                "attr12345",
                "cgrates.org",
                &["AttributeSv1"],
                "DSP1",
            )],
            vec![RoutingProfile::new(
                "DSP1",
                "cgrates.org",
                "AttributeSv1",
                vec![HostEntry::new("ENGINE1", "127.0.0.1:2012", 20.0)],
            )],
        )
        .unwrap();
        let dispatcher = Dispatcher::new(
            "facade-test",
            DispatcherConfig::default(),
            Arc::new(SharedConnector(connection.clone())),
            Arc::new(tables),
        )
        .await
        .unwrap();
        (
            RpcFacade::new(Arc::new(dispatcher), "cgrates.org"),
            connection,
        )
    }

    #[tokio::test]
    async fn replica_never_sees_the_api_key() {
        let (facade, connection) = facade().await;

        let reply = facade
            .call(
                "AttributeSv1.ProcessEvent",
                json!({ "APIKey": "attr12345", "Tenant": "cgrates.org", "ID": "ev1" }),
            )
            .await
            .unwrap();

        assert_eq!(reply, json!({ "AlteredFields": ["*req.Password"] }));
        let seen = connection.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[(
                "AttributeSv1.ProcessEvent".to_string(),
                json!({ "Tenant": "cgrates.org", "ID": "ev1" })
            )]
        );
    }

    #[tokio::test]
    async fn typed_call_decodes_reply() {
        let (facade, _) = facade().await;

        let pong: String = facade
            .call_typed("AttributeSv1.Ping", &BareEnvelope::bare("attr12345", ""))
            .await
            .unwrap();
        assert_eq!(pong, "Pong");

        let wrong_shape: Result<u64, _> = facade
            .call_typed("AttributeSv1.Ping", &BareEnvelope::bare("attr12345", ""))
            .await;
        assert!(matches!(wrong_shape, Err(DispatchError::Codec(_))));
    }

    #[tokio::test]
    async fn handler_surface_reports_wire_strings() {
        let (facade, connection) = facade().await;

        assert_eq!(
            facade
                .handle("AttributeSv1.Ping", json!({ "Tenant": "cgrates.org" }))
                .await,
            Err("MANDATORY_IE_MISSING: [APIKey]".to_string())
        );
        assert_eq!(
            facade
                .handle("AttributeSv1.Ping", json!({ "APIKey": "1234" }))
                .await,
            Err("UNKNOWN_API_KEY".to_string())
        );
        assert_eq!(
            facade
                .handle(
                    "AttributeSv1.GetAttributeForEvent",
                    json!({ "APIKey": "attr12345" })
                )
                .await,
            Err("NOT_FOUND".to_string())
        );
        assert_eq!(
            facade
                .handle("AttributeSv1.Ping", json!({ "APIKey": "attr12345" }))
                .await,
            Ok(json!("Pong"))
        );
        assert_eq!(connection.seen.lock().unwrap().len(), 2);
    }
}
