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

use async_trait::async_trait;
use charging_dispatcher::{RpcHandler, PONG};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const UNSUPPORTED_METHOD: &str = "SERVER_ERROR: UNSUPPORTED_SERVICE_METHOD";

/// Substituted into the `Password` field of every matched event.
pub const SIMPLEAUTH_PASSWORD: &str = "CGRateS.org";

/// Minimal attribute engine: knows a fixed set of accounts and answers the
/// `AttributeSv1` methods for them. Unknown accounts get `NOT_FOUND`.
pub struct AttributeEngine {
    name: String,
    accounts: HashSet<String>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl AttributeEngine {
    pub fn new(name: &str, accounts: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Delays every reply; used to exercise attempt timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls answered so far, including ones answered with an error.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn profile_id(account: &str) -> String {
        format!("ATTR_{account}_SIMPLEAUTH")
    }

    fn matched_account<'a>(&self, args: &'a Value) -> Option<&'a str> {
        args.pointer("/Event/Account")
            .and_then(Value::as_str)
            .filter(|account| self.accounts.contains(*account))
    }

    fn attribute_profile(&self, args: &Value, account: &str) -> Value {
        json!({
            "Tenant": args.get("Tenant").cloned().unwrap_or(Value::Null),
            "ID": Self::profile_id(account),
            "FilterIDs": [format!("*string:Account:{account}")],
            "Contexts": ["simpleauth"],
            "Attributes": [{
                "FieldName": "Password",
                "Initial": "*any",
                "Substitute": SIMPLEAUTH_PASSWORD,
                "Append": true,
            }],
            "Weight": 20.0,
        })
    }

    fn processed_event(&self, args: &Value, account: &str) -> Value {
        let mut event = args.clone();
        if let Some(fields) = event.get_mut("Event").and_then(Value::as_object_mut) {
            fields.insert("Password".to_string(), json!(SIMPLEAUTH_PASSWORD));
        }
        json!({
            "MatchedProfiles": [Self::profile_id(account)],
            "AlteredFields": ["Password"],
            "CGREvent": {
                "Tenant": event.get("Tenant").cloned().unwrap_or(Value::Null),
                "ID": event.get("ID").cloned().unwrap_or(Value::Null),
                "Event": event.get("Event").cloned().unwrap_or(Value::Null),
            },
        })
    }

    pub async fn answer(&self, method: &str, args: &Value) -> Result<Value, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        debug!(engine = self.name.as_str(), method, "stub engine call");

        match method {
            "AttributeSv1.Ping" => Ok(json!(PONG)),
            "AttributeSv1.GetAttributeForEvent" => self
                .matched_account(args)
                .map(|account| self.attribute_profile(args, account))
                .ok_or_else(|| NOT_FOUND.to_string()),
            "AttributeSv1.ProcessEvent" => self
                .matched_account(args)
                .map(|account| self.processed_event(args, account))
                .ok_or_else(|| NOT_FOUND.to_string()),
            _ => Err(UNSUPPORTED_METHOD.to_string()),
        }
    }
}

#[async_trait]
impl RpcHandler for AttributeEngine {
    async fn handle(&self, method: &str, args: Value) -> Result<Value, String> {
        self.answer(method, &args).await
    }
}
