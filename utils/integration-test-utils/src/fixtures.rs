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

use charging_dispatcher::{
    ApiKeyProfile, HostEntry, ProfileLoadError, ProfileTables, RoutingProfile,
};
use serde_json::{json, Value};

pub const TENANT: &str = "cgrates.org";
pub const ROUTING_PROFILE_ID: &str = "DSP1";

/// Allowed for `AttributeSv1`.
pub const ATTRIBUTE_API_KEY: &str = "attr12345";
/// Known, but only allowed for `ResourceSv1`.
pub const RESOURCE_API_KEY: &str = "12345";
/// Not configured at all.
pub const UNKNOWN_API_KEY: &str = "1234";

pub const ENGINE1: &str = "ENGINE1";
pub const ENGINE2: &str = "ENGINE2";

/// The API keys every scenario uses, all pointing at [`ROUTING_PROFILE_ID`].
pub fn api_keys() -> Vec<ApiKeyProfile> {
    vec![
        ApiKeyProfile::new(ATTRIBUTE_API_KEY, TENANT, &["AttributeSv1"], ROUTING_PROFILE_ID),
        ApiKeyProfile::new(RESOURCE_API_KEY, TENANT, &["ResourceSv1"], ROUTING_PROFILE_ID),
    ]
}

/// `AttributeSv1` routed to `ENGINE1` (weight 20) then `ENGINE2` (weight 10).
pub fn two_engine_tables(engine1: &str, engine2: &str) -> Result<ProfileTables, ProfileLoadError> {
    ProfileTables::build(
        api_keys(),
        vec![RoutingProfile::new(
            ROUTING_PROFILE_ID,
            TENANT,
            "AttributeSv1",
            vec![
                HostEntry::new(ENGINE2, engine2, 10.0),
                HostEntry::new(ENGINE1, engine1, 20.0),
            ],
        )],
    )
}

/// The envelope the attribute scenarios send: a simpleauth event for `account`.
pub fn attribute_event(api_key: &str, account: &str) -> Value {
    json!({
        "APIKey": api_key,
        "Tenant": TENANT,
        "Context": "simpleauth",
        "ID": "testAttributeSGetAttributeForEvent",
        "Event": {
            "Account": account,
            "EventName": "Event1",
        },
    })
}

pub fn ping_envelope(api_key: &str) -> Value {
    json!({ "APIKey": api_key, "Tenant": TENANT })
}
