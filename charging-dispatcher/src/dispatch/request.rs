//! Ephemeral per-call dispatch request.

use serde_json::Value;

/// Everything one dispatch needs. Carries no state across calls.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchRequest {
    pub api_key: String,
    pub tenant: String,
    pub subsystem: String,
    pub method: String,
    pub args: Value,
}

impl DispatchRequest {
    pub fn new(api_key: &str, tenant: &str, subsystem: &str, method: &str, args: Value) -> Self {
        Self {
            api_key: api_key.to_string(),
            tenant: tenant.to_string(),
            subsystem: subsystem.to_string(),
            method: method.to_string(),
            args,
        }
    }

    /// Name the replica's transport resolves, e.g. `AttributeSv1.Ping`.
    pub fn qualified_method(&self) -> String {
        format!("{}.{}", self.subsystem, self.method)
    }
}
