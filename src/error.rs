//! Error types shared across the crate.
//!
//! Remote failures are reported as [`ApiError`]; client-side form problems as
//! [`ValidationErrors`]. Application plumbing (terminal, config files) uses
//! `anyhow::Result` through the [`Result`] alias.
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub type Result<T> = anyhow::Result<T>;

/// Generic toast text used when the server did not send a message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Failure of a call against the remote API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// HTTP 401. The session has already been cleared when this is observed.
    #[error("session expired")]
    Unauthorized,
    /// Any other non-2xx response.
    #[error("request failed with status {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a status error, pulling `message` (or `error`) out of a JSON body when present.
    pub fn from_status(status: u16, body: &serde_json::Value) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        let message = ["message", "error", "detail"]
            .iter()
            .find_map(|k| body.get(*k).and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .filter(|s| !s.trim().is_empty());
        ApiError::Status { status, message }
    }

    /// Text for an error toast: the server message if there is one, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(m), ..
            } => m.clone(),
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Field-level validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    pub fn insert(&mut self, field: impl Into<String>, msg: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| msg.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_prefers_server_message() {
        let err = ApiError::from_status(409, &json!({"message": "Member already exists"}));
        assert_eq!(err.user_message(GENERIC_FAILURE), "Member already exists");
    }

    #[test]
    fn status_error_without_message_falls_back() {
        let err = ApiError::from_status(500, &json!({}));
        assert_eq!(err.user_message(GENERIC_FAILURE), GENERIC_FAILURE);
        let err = ApiError::from_status(400, &json!({"message": "   "}));
        assert_eq!(err.user_message("nope"), "nope");
    }

    #[test]
    fn status_401_maps_to_unauthorized() {
        assert!(ApiError::from_status(401, &serde_json::Value::Null).is_unauthorized());
    }
}
