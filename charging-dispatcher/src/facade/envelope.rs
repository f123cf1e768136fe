//! Inbound envelope parsing: API key, tenant and `Subsystem.Method` name.

use crate::dispatch::request::DispatchRequest;
use crate::error::{DispatchError, API_KEY_FIELD, TENANT_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed inbound envelope: the caller's key and tenant next to the method arguments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyEnvelope<T> {
    #[serde(rename = "APIKey")]
    pub api_key: String,
    #[serde(rename = "Tenant", default, skip_serializing_if = "String::is_empty")]
    pub tenant: String,
    #[serde(flatten)]
    pub args: T,
}

/// Envelope for methods without arguments, such as `Ping`.
pub type BareEnvelope = ApiKeyEnvelope<Map<String, Value>>;

impl<T> ApiKeyEnvelope<T> {
    pub fn new(api_key: &str, tenant: &str, args: T) -> Self {
        Self {
            api_key: api_key.to_string(),
            tenant: tenant.to_string(),
            args,
        }
    }
}

impl BareEnvelope {
    pub fn bare(api_key: &str, tenant: &str) -> Self {
        Self::new(api_key, tenant, Map::new())
    }
}

/// Splits `AttributeSv1.Ping` into its subsystem and method parts.
pub fn split_method(qualified: &str) -> Result<(&str, &str), DispatchError> {
    match qualified.split_once('.') {
        Some((subsystem, method))
            if !subsystem.is_empty() && !method.is_empty() && !method.contains('.') =>
        {
            Ok((subsystem, method))
        }
        _ => Err(DispatchError::MalformedMethod(qualified.to_string())),
    }
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// Builds a dispatch request from a raw envelope.
///
/// A missing, non-string or empty `APIKey` is reported as missing. The key is removed
/// from the arguments forwarded to the replica; every other field, `Tenant` included,
/// is passed through untouched. An absent `Tenant` falls back to `default_tenant`.
pub fn open_envelope(
    qualified_method: &str,
    envelope: Value,
    default_tenant: &str,
) -> Result<DispatchRequest, DispatchError> {
    let mut fields = match envelope {
        Value::Object(fields) => fields,
        _ => return Err(DispatchError::MandatoryFieldMissing(API_KEY_FIELD)),
    };

    let api_key = non_empty_str(&fields, API_KEY_FIELD)
        .map(str::to_string)
        .ok_or(DispatchError::MandatoryFieldMissing(API_KEY_FIELD))?;
    let (subsystem, method) = split_method(qualified_method)?;
    let tenant = non_empty_str(&fields, TENANT_FIELD)
        .unwrap_or(default_tenant)
        .to_string();

    fields.remove(API_KEY_FIELD);

    Ok(DispatchRequest::new(
        &api_key,
        &tenant,
        subsystem,
        method,
        Value::Object(fields),
    ))
}

#[cfg(test)]
mod tests {
    use super::{open_envelope, split_method, ApiKeyEnvelope, BareEnvelope};
    use crate::error::DispatchError;
    use serde::Serialize;
    use serde_json::{json, Value};

    #[test]
    fn api_key_is_extracted_and_stripped() {
        let request = open_envelope(
            "AttributeSv1.GetAttributeForEvent",
            json!({ "APIKey": "attr12345", "Tenant": "cgrates.org", "ID": "ev1" }),
            "",
        )
        .expect("envelope should open");

        assert_eq!(request.api_key, "attr12345");
        assert_eq!(request.tenant, "cgrates.org");
        assert_eq!(request.subsystem, "AttributeSv1");
        assert_eq!(request.method, "GetAttributeForEvent");
        assert_eq!(request.args, json!({ "Tenant": "cgrates.org", "ID": "ev1" }));
    }

    #[test]
    fn missing_wrong_type_and_empty_keys_all_read_as_missing() {
        let missing = DispatchError::MandatoryFieldMissing("APIKey");
        for envelope in [
            json!({ "Tenant": "cgrates.org" }),
            json!({ "APIKey": 12345 }),
            json!({ "APIKey": "" }),
            json!("attr12345"),
            Value::Null,
        ] {
            assert_eq!(
                open_envelope("AttributeSv1.Ping", envelope, "cgrates.org"),
                Err(missing.clone())
            );
        }
    }

    #[test]
    fn missing_key_wins_over_malformed_method() {
        assert_eq!(
            open_envelope("Ping", json!({}), "cgrates.org"),
            Err(DispatchError::MandatoryFieldMissing("APIKey"))
        );
    }

    #[test]
    fn absent_tenant_falls_back_to_default() {
        let request = open_envelope(
            "AttributeSv1.Ping",
            json!({ "APIKey": "attr12345" }),
            "cgrates.org",
        )
        .unwrap();

        assert_eq!(request.tenant, "cgrates.org");
        assert_eq!(request.args, json!({}));
    }

    #[test]
    fn method_names_must_be_subsystem_dot_method() {
        assert_eq!(split_method("AttributeSv1.Ping"), Ok(("AttributeSv1", "Ping")));
        for bad in ["Ping", ".Ping", "AttributeSv1.", "A.B.C", ""] {
            assert_eq!(
                split_method(bad),
                Err(DispatchError::MalformedMethod(bad.to_string()))
            );
        }
    }

    #[test]
    fn typed_envelope_flattens_arguments() {
        #[derive(Serialize)]
        struct Event {
            #[serde(rename = "ID")]
            id: String,
        }

        let envelope = ApiKeyEnvelope::new(
            "attr12345",
            "cgrates.org",
            Event {
                id: "ev1".to_string(),
            },
        );
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "APIKey": "attr12345", "Tenant": "cgrates.org", "ID": "ev1" })
        );

        let bare = BareEnvelope::bare("attr12345", "");
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            json!({ "APIKey": "attr12345" })
        );
    }
}
