//! Newline-delimited JSON-RPC 1.0 frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct RequestFrame {
    pub(crate) id: u64,
    pub(crate) method: String,
    #[serde(default)]
    pub(crate) params: Vec<Value>,
}

impl RequestFrame {
    pub(crate) fn new(id: u64, method: &str, args: &Value) -> Self {
        Self {
            id,
            method: method.to_string(),
            params: vec![args.clone()],
        }
    }

    /// The single positional argument; absent params read as `null`.
    pub(crate) fn into_args(self) -> Value {
        self.params.into_iter().next().unwrap_or(Value::Null)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ResponseFrame {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) result: Value,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

impl ResponseFrame {
    pub(crate) fn from_outcome(id: u64, outcome: Result<Value, String>) -> Self {
        match outcome {
            Ok(result) => Self {
                id,
                result,
                error: None,
            },
            Err(message) => Self {
                id,
                result: Value::Null,
                error: Some(message),
            },
        }
    }
}

/// Serializes `frame` followed by the `\n` delimiter.
pub(crate) fn encode_frame<T: Serialize>(frame: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec(frame)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::{encode_frame, RequestFrame, ResponseFrame};
    use serde_json::{json, Value};

    #[test]
    fn request_frame_wraps_args_in_positional_params() {
        let frame = RequestFrame::new(7, "AttributeSv1.Ping", &json!({ "Tenant": "cgrates.org" }));
        let bytes = encode_frame(&frame).unwrap();

        assert_eq!(bytes.last(), Some(&b'\n'));
        let wire: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            wire,
            json!({ "id": 7, "method": "AttributeSv1.Ping", "params": [{ "Tenant": "cgrates.org" }] })
        );
    }

    #[test]
    fn error_response_serializes_null_result() {
        let frame = ResponseFrame::from_outcome(3, Err("NOT_FOUND".to_string()));
        let wire: Value = serde_json::from_slice(&encode_frame(&frame).unwrap()).unwrap();

        assert_eq!(wire, json!({ "id": 3, "result": null, "error": "NOT_FOUND" }));
    }

    #[test]
    fn response_without_error_field_is_a_success() {
        let frame: ResponseFrame = serde_json::from_str(r#"{"id":1,"result":"Pong"}"#).unwrap();

        assert_eq!(frame.error, None);
        assert_eq!(frame.result, json!("Pong"));
    }

    #[test]
    fn missing_params_read_as_null() {
        let frame: RequestFrame =
            serde_json::from_str(r#"{"id":1,"method":"AttributeSv1.Ping"}"#).unwrap();

        assert_eq!(frame.into_args(), Value::Null);
    }
}
