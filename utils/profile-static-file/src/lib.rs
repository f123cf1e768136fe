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
use charging_dispatcher::{
    ApiKeyProfile, ProfileLoadError, ProfileSource, ProfileTables, RoutingProfile,
};
use serde::Deserialize;
use std::fs::{self, canonicalize};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    #[serde(default)]
    api_keys: Vec<ApiKeyProfile>,
    #[serde(default)]
    routing_profiles: Vec<RoutingProfile>,
}

/// Profile source backed by a JSON5 file, re-read on every fetch.
pub struct ProfileStaticFile {
    static_file: PathBuf,
}

impl ProfileStaticFile {
    pub fn new(static_file: impl Into<PathBuf>) -> Self {
        ProfileStaticFile {
            static_file: static_file.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.static_file
    }

    fn load(&self) -> Result<ProfileTables, ProfileLoadError> {
        debug!("profile file: {:?}", self.static_file);

        let profile_file = canonicalize(&self.static_file).map_err(|e| {
            ProfileLoadError::Source(format!(
                "static profile file not found: {}: {e}",
                self.static_file.display()
            ))
        })?;

        let data = fs::read_to_string(&profile_file).map_err(|e| {
            ProfileLoadError::Source(format!(
                "unable to read profile file {}: {e}",
                profile_file.display()
            ))
        })?;

        let parsed: ProfileFile = json5::from_str(&data).map_err(|e| {
            ProfileLoadError::Source(format!(
                "unable to parse profile file {}: {e}",
                profile_file.display()
            ))
        })?;

        debug!(
            "loaded {} api keys and {} routing profiles from {}",
            parsed.api_keys.len(),
            parsed.routing_profiles.len(),
            profile_file.display()
        );

        ProfileTables::build(parsed.api_keys, parsed.routing_profiles)
    }
}

#[async_trait]
impl ProfileSource for ProfileStaticFile {
    async fn fetch_profiles(&self) -> Result<ProfileTables, ProfileLoadError> {
        self.load().inspect_err(|e| error!("profile load failed: {e}"))
    }
}
