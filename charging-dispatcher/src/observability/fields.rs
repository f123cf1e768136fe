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

//! Canonical structured field keys and value-format helpers.

use crate::dispatch::request::DispatchRequest;

pub const REASON_STALE_BEFORE_REUSE: &str = "stale_before_reuse";
pub const REASON_INVALIDATED: &str = "invalidated";
pub const REASON_CONNECTIVITY_FAILURE: &str = "connectivity_failure";
pub const REASON_CONNECT_TIMEOUT: &str = "connect_timeout";

pub const NONE: &str = "none";
pub const REDACTED: &str = "<redacted>";

/// Shows enough of an API key to correlate logs without leaking it.
pub fn mask_api_key(api_key: &str) -> String {
    if api_key.is_empty() {
        return NONE.to_string();
    }
    let visible: String = api_key.chars().take(3).collect();
    if visible.len() == api_key.len() {
        REDACTED.to_string()
    } else {
        format!("{visible}***")
    }
}

pub fn format_target(request: &DispatchRequest) -> String {
    format!("{}:{}", request.tenant, request.qualified_method())
}

#[cfg(test)]
mod tests {
    use super::{mask_api_key, NONE, REDACTED};

    #[test]
    fn mask_api_key_never_prints_the_whole_key() {
        assert_eq!(mask_api_key(""), NONE);
        assert_eq!(mask_api_key("abc"), REDACTED);
        assert_eq!(mask_api_key("attr12345"), "att***");
    }
}
