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

//! API key authorization against the current profile snapshot.

use crate::error::{DispatchError, API_KEY_FIELD, TENANT_FIELD};
use crate::profiles::profile_store::ProfileStore;
use crate::profiles::routing_profile::RoutingProfile;
use std::sync::Arc;

/// Resolves an API key to the routing profile it may use.
///
/// Read-only against the loaded tables; safe for any number of concurrent callers.
#[derive(Clone)]
pub struct ApiKeyAuthority {
    store: ProfileStore,
}

impl ApiKeyAuthority {
    pub fn new(store: ProfileStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn authorize(
        &self,
        api_key: &str,
        tenant: &str,
        subsystem: &str,
    ) -> Result<Arc<RoutingProfile>, DispatchError> {
        self.authorize_inner(api_key, tenant, subsystem, None)
    }

    /// Like [`authorize`](Self::authorize), also honouring `Subsystem.Method` grants.
    pub fn authorize_method(
        &self,
        api_key: &str,
        tenant: &str,
        subsystem: &str,
        method: &str,
    ) -> Result<Arc<RoutingProfile>, DispatchError> {
        self.authorize_inner(api_key, tenant, subsystem, Some(method))
    }

    fn authorize_inner(
        &self,
        api_key: &str,
        tenant: &str,
        subsystem: &str,
        method: Option<&str>,
    ) -> Result<Arc<RoutingProfile>, DispatchError> {
        if api_key.is_empty() {
            return Err(DispatchError::MandatoryFieldMissing(API_KEY_FIELD));
        }
        if tenant.is_empty() {
            return Err(DispatchError::MandatoryFieldMissing(TENANT_FIELD));
        }

        // One snapshot for the whole decision so key and route come from the same generation.
        let snapshot = self.store.snapshot();
        let tables = snapshot.tables();

        let key_profile = tables
            .api_key(api_key)
            .ok_or(DispatchError::UnknownApiKey)?;

        if key_profile.tenant != tenant || !key_profile.allows(subsystem, method) {
            return Err(DispatchError::UnauthorizedApi);
        }

        match tables.routing_profile(tenant, &key_profile.routing_profile_id, subsystem) {
            Some(profile) if profile.is_routable() => Ok(profile.clone()),
            _ => Err(DispatchError::NoRouteAvailable {
                tenant: tenant.to_string(),
                subsystem: subsystem.to_string(),
            }),
        }
    }
}
