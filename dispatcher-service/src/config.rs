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

use charging_dispatcher::{DispatcherConfig, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) dispatcher: DispatcherSection,
    pub(crate) profiles: ProfilesSection,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct DispatcherSection {
    pub(crate) name: String,
    pub(crate) listen_address: String,
    pub(crate) default_tenant: String,
    #[serde(default)]
    pub(crate) attempt_timeout_ms: Option<u64>,
    #[serde(default)]
    pub(crate) connect_timeout_ms: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ProfilesSection {
    pub(crate) file_path: String,
}

impl Config {
    pub(crate) fn dispatcher_config(&self) -> DispatcherConfig {
        let attempt = self
            .dispatcher
            .attempt_timeout_ms
            .map_or(DEFAULT_ATTEMPT_TIMEOUT, Duration::from_millis);
        let connect = self
            .dispatcher
            .connect_timeout_ms
            .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_millis);
        DispatcherConfig::default()
            .with_attempt_timeout(attempt)
            .with_connect_timeout(connect)
    }

    /// Relative profile paths are taken from the directory holding the config file.
    pub(crate) fn profiles_path(&self, config_file: &Path) -> PathBuf {
        let path = PathBuf::from(&self.profiles.file_path);
        if path.is_absolute() {
            return path;
        }
        config_file
            .parent()
            .map_or_else(|| path.clone(), |dir| dir.join(&path))
    }
}
