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

mod attribute_engine;
pub use attribute_engine::{AttributeEngine, NOT_FOUND, SIMPLEAUTH_PASSWORD, UNSUPPORTED_METHOD};
mod fixtures;
pub use fixtures::{
    api_keys, attribute_event, ping_envelope, two_engine_tables, ATTRIBUTE_API_KEY, ENGINE1,
    ENGINE2, RESOURCE_API_KEY, ROUTING_PROFILE_ID, TENANT, UNKNOWN_API_KEY,
};
mod logging;
pub use logging::init_logging;
mod memory_replicas;
pub use memory_replicas::{MemoryConnector, MemoryReplica};
mod stub_engine;
pub use stub_engine::{unused_address, StubEngine};
