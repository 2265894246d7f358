use crate::error::ApiError;
use core_types::Order;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

// The backend wraps most payloads as `{"success": true, "data": ...}` but a
// few endpoints return the payload bare. Both are accepted here so nothing
// above the client has to care.

/// The fields an error body may carry, in order of preference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ApiErrorResponse {
    /// The server-provided message: `message` first, then `error`.
    pub fn best_message(&self) -> Option<String> {
        [&self.message, &self.error]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
    }
}

/// An order listing arrives either as a bare array or nested under `orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrdersPayload {
    List(Vec<Order>),
    Nested {
        #[serde(default)]
        orders: Vec<Order>,
    },
}

impl OrdersPayload {
    pub fn into_vec(self) -> Vec<Order> {
        match self {
            OrdersPayload::List(orders) => orders,
            OrdersPayload::Nested { orders } => orders,
        }
    }
}

/// Builds the error for a non-2xx response from its raw body.
pub fn error_from_body(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|e| e.best_message())
        .unwrap_or_else(|| format!("Request failed with status code {}", status));
    ApiError::backend(Some(status), message)
}

/// Decodes a successful response body, unwrapping the envelope if present.
pub fn decode_payload<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?
    };

    let payload = match value {
        Value::Object(mut map) if map.contains_key("success") => {
            let ok = map.get("success").and_then(Value::as_bool).unwrap_or(false);
            if !ok {
                let err: ApiErrorResponse =
                    serde_json::from_value(Value::Object(map)).unwrap_or_default();
                let message = err
                    .best_message()
                    .unwrap_or_else(|| "The backend reported a failure".to_string());
                return Err(ApiError::backend(Some(status), message));
            }
            // An envelope without `data` (e.g. the health probe) is its own payload.
            match map.remove("data") {
                Some(data) => data,
                None => Value::Object(map),
            }
        }
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| ApiError::Deserialization(e.to_string()))
}
