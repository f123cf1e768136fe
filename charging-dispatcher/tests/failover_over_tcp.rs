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

mod support;

use charging_dispatcher::{
    serve, CallError, JsonRpcConnection, RemoteError, RpcConnection, RpcHandler, TcpConnector,
};
use integration_test_utils::{
    attribute_event, ping_envelope, AttributeEngine, StubEngine, ATTRIBUTE_API_KEY, ENGINE1,
    ENGINE2, NOT_FOUND, SIMPLEAUTH_PASSWORD,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Two engines behind a dispatcher that is itself served over TCP, reached through a
/// plain JSON-RPC client the way an external caller would.
struct Cluster {
    engine1: StubEngine,
    engine2: StubEngine,
    attributes1: Arc<AttributeEngine>,
    attributes2: Arc<AttributeEngine>,
    client: JsonRpcConnection,
    shutdown: CancellationToken,
    dispatcher_server: JoinHandle<std::io::Result<()>>,
}

impl Cluster {
    async fn start(attributes1: AttributeEngine, attributes2: AttributeEngine) -> Self {
        integration_test_utils::init_logging();

        let attributes1 = Arc::new(attributes1);
        let attributes2 = Arc::new(attributes2);
        let engine1 = StubEngine::start(attributes1.clone()).await.unwrap();
        let engine2 = StubEngine::start(attributes2.clone()).await.unwrap();

        let facade = support::make_two_engine_facade(
            "tcp-failover",
            Arc::new(TcpConnector::new()),
            &engine1.address(),
            &engine2.address(),
        )
        .await;
        let handler: Arc<dyn RpcHandler> = Arc::new(facade);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dispatcher_address = listener.local_addr().unwrap().to_string();
        let shutdown = CancellationToken::new();
        let dispatcher_server = tokio::spawn(serve(listener, handler, shutdown.clone()));
        let client = JsonRpcConnection::connect(&dispatcher_address)
            .await
            .unwrap();

        Self {
            engine1,
            engine2,
            attributes1,
            attributes2,
            client,
            shutdown,
            dispatcher_server,
        }
    }

    async fn ping(&self) -> Result<serde_json::Value, CallError> {
        self.client
            .invoke("AttributeSv1.Ping", &ping_envelope(ATTRIBUTE_API_KEY))
            .await
    }

    async fn shutdown(mut self) {
        self.engine1.stop().await;
        self.engine2.stop().await;
        self.shutdown.cancel();
        self.dispatcher_server.await.unwrap().unwrap();
    }
}

fn remote_message(result: Result<serde_json::Value, CallError>) -> String {
    match result {
        Err(CallError::Remote(err)) => err.message().to_string(),
        other => panic!("expected a remote error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ping_fails_over_and_recovers_without_reset() {
    let mut cluster = Cluster::start(
        AttributeEngine::new(ENGINE1, &[]),
        AttributeEngine::new(ENGINE2, &[]),
    )
    .await;

    assert_eq!(cluster.ping().await, Ok(json!("Pong")));
    assert_eq!(cluster.attributes1.calls(), 1);
    assert_eq!(cluster.attributes2.calls(), 0);

    cluster.engine1.stop().await;
    assert_eq!(cluster.ping().await, Ok(json!("Pong")));
    assert_eq!(cluster.attributes2.calls(), 1);

    cluster.engine2.stop().await;
    let message = remote_message(cluster.ping().await);
    assert!(
        message.starts_with(&format!("NO_REACHABLE_REPLICA: {ENGINE2}: ")),
        "unexpected error: {message}"
    );

    cluster.engine1.restart().await.unwrap();
    assert_eq!(cluster.ping().await, Ok(json!("Pong")));
    assert_eq!(cluster.attributes1.calls(), 2);

    cluster.engine2.restart().await.unwrap();
    assert_eq!(cluster.ping().await, Ok(json!("Pong")));
    assert_eq!(cluster.attributes1.calls(), 3);
    assert_eq!(cluster.attributes2.calls(), 1);

    cluster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn not_found_does_not_fail_over_but_outage_does() {
    let mut cluster = Cluster::start(
        AttributeEngine::new(ENGINE1, &[]),
        AttributeEngine::new(ENGINE2, &["1002"]),
    )
    .await;
    let event = attribute_event(ATTRIBUTE_API_KEY, "1002");

    let not_found = cluster
        .client
        .invoke("AttributeSv1.GetAttributeForEvent", &event)
        .await;
    assert_eq!(not_found, Err(CallError::Remote(RemoteError::new(NOT_FOUND))));
    let not_found = cluster
        .client
        .invoke("AttributeSv1.ProcessEvent", &event)
        .await;
    assert_eq!(not_found, Err(CallError::Remote(RemoteError::new(NOT_FOUND))));
    assert_eq!(cluster.attributes2.calls(), 0);

    cluster.engine1.stop().await;

    let profile = cluster
        .client
        .invoke("AttributeSv1.GetAttributeForEvent", &event)
        .await
        .expect("engine2 knows account 1002");
    assert_eq!(profile["ID"], json!("ATTR_1002_SIMPLEAUTH"));
    assert_eq!(profile["Attributes"][0]["Substitute"], json!(SIMPLEAUTH_PASSWORD));

    let processed = cluster
        .client
        .invoke("AttributeSv1.ProcessEvent", &event)
        .await
        .expect("engine2 processes account 1002");
    assert_eq!(processed["AlteredFields"], json!(["Password"]));
    assert_eq!(
        processed["CGREvent"]["Event"],
        json!({ "Account": "1002", "EventName": "Event1", "Password": SIMPLEAUTH_PASSWORD })
    );

    cluster.engine1.restart().await.unwrap();
    let not_found = cluster
        .client
        .invoke("AttributeSv1.GetAttributeForEvent", &event)
        .await;
    assert_eq!(not_found, Err(CallError::Remote(RemoteError::new(NOT_FOUND))));

    cluster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_engine_counts_as_unreachable() {
    let cluster = Cluster::start(
        AttributeEngine::new(ENGINE1, &[]).with_latency(Duration::from_secs(2)),
        AttributeEngine::new(ENGINE2, &[]),
    )
    .await;

    assert_eq!(cluster.ping().await, Ok(json!("Pong")));
    assert_eq!(cluster.attributes1.calls(), 1);
    assert_eq!(cluster.attributes2.calls(), 1);

    cluster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn errors_cross_the_wire_as_plain_strings() {
    let cluster = Cluster::start(
        AttributeEngine::new(ENGINE1, &[]),
        AttributeEngine::new(ENGINE2, &[]),
    )
    .await;

    assert_eq!(
        remote_message(
            cluster
                .client
                .invoke("AttributeSv1.Ping", &json!({ "Tenant": "cgrates.org" }))
                .await
        ),
        "MANDATORY_IE_MISSING: [APIKey]"
    );
    assert_eq!(
        remote_message(
            cluster
                .client
                .invoke("AttributeSv1.Ping", &ping_envelope("1234"))
                .await
        ),
        "UNKNOWN_API_KEY"
    );
    assert_eq!(
        remote_message(
            cluster
                .client
                .invoke("AttributeSv1.Ping", &ping_envelope("12345"))
                .await
        ),
        "UNAUTHORIZED_API"
    );
    assert_eq!(cluster.attributes1.calls() + cluster.attributes2.calls(), 0);

    cluster.shutdown().await;
}
