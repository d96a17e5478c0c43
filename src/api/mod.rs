//! Remote API access.
//!
//! [`ApiClient`] is the single entry point every resource service goes through.
//! It attaches the bearer token and JSON content type, maps status codes to
//! [`ApiError`], and on any HTTP 401 clears the stored session and raises the
//! session-expired signal. The wire itself sits behind the [`Transport`] trait
//! so tests can substitute a scripted backend.
pub mod auth;
pub mod http;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::session::SessionStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One outgoing request, already carrying its headers.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status code and the parsed JSON body (`Null` when empty).
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Moves an [`ApiRequest`] over the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn build(&self, method: Method, path: &str, body: Option<Value>, with_token: bool) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if with_token {
            if let Some(token) = self.session.token() {
                headers.push(("Authorization".to_string(), format!("Bearer {token}")));
            }
        }
        ApiRequest {
            method,
            path: path.to_string(),
            headers,
            body,
        }
    }

    /// Authenticated request. A 401 expires the session before the error is returned.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let request = self.build(method, path, body, true);
        tracing::debug!(method = method.as_str(), path, "api request");
        let response = self.transport.send(request).await.inspect_err(|e| {
            tracing::warn!(method = method.as_str(), path, error = %e, "api transport failure");
        })?;
        if response.status == 401 {
            tracing::warn!(method = method.as_str(), path, "unauthorized; clearing session");
            self.session.expire();
            return Err(ApiError::Unauthorized);
        }
        check_status(method, path, response)
    }

    /// Request without credentials (login, registration). A 401 here is a plain
    /// failure carrying the server's message, not a session expiry.
    pub async fn request_anonymous(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let request = self.build(method, path, body, false);
        tracing::debug!(method = method.as_str(), path, "anonymous api request");
        let response = self.transport.send(request).await?;
        if response.status == 401 {
            let message = ApiError::from_status(400, &response.body);
            return Err(match message {
                ApiError::Status { message, .. } => ApiError::Status { status: 401, message },
                other => other,
            });
        }
        check_status(method, path, response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.request(Method::Get, path, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(payload)?;
        let body = self.request(method, path, Some(payload)).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::Delete, path, None).await.map(|_| ())
    }
}

fn check_status(method: Method, path: &str, response: ApiResponse) -> Result<Value, ApiError> {
    if (200..300).contains(&response.status) {
        tracing::debug!(method = method.as_str(), path, status = response.status, "api response");
        Ok(response.body)
    } else {
        tracing::info!(method = method.as_str(), path, status = response.status, "api request rejected");
        Err(ApiError::from_status(response.status, &response.body))
    }
}

/// Accept either a bare JSON array or an envelope such as `{"data": [...]}`.
pub fn unwrap_collection(body: Value) -> Value {
    match body {
        Value::Object(mut map) => {
            for key in ["data", "content", "items", "results"] {
                if let Some(v @ Value::Array(_)) = map.remove(key) {
                    return v;
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Accept either a bare object or `{"data": {...}}`.
pub fn unwrap_record(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;
    use crate::session::Session;
    use serde_json::json;

    fn logged_in() -> SessionStore {
        SessionStore::in_memory(Session {
            token: Some("tok".into()),
            user_id: Some("1".into()),
            role: Some("ADMIN".into()),
        })
    }

    #[tokio::test]
    async fn attaches_bearer_and_content_type() {
        let transport = ScriptedTransport::with(vec![(200, json!([]))]);
        let client = ApiClient::new(transport.clone(), logged_in());
        let _: Vec<Value> = client.get("/members").await.expect("ok");
        let seen = transport.requests();
        assert_eq!(seen[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn unauthorized_clears_session() {
        let transport = ScriptedTransport::with(vec![(401, Value::Null)]);
        let session = logged_in();
        let client = ApiClient::new(transport, session.clone());
        let err = client.request(Method::Get, "/loans", None).await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
        assert!(!session.is_authenticated());
        assert!(session.take_expired());
    }

    #[tokio::test]
    async fn anonymous_401_keeps_session_untouched() {
        let transport = ScriptedTransport::with(vec![(401, json!({"message": "Bad credentials"}))]);
        let session = logged_in();
        let client = ApiClient::new(transport.clone(), session.clone());
        let err = client
            .request_anonymous(Method::Post, "/auth/login", Some(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.user_message("x"), "Bad credentials");
        assert!(session.is_authenticated());
        assert!(transport.requests()[0].header("authorization").is_none());
    }

    #[test]
    fn collections_unwrap_common_envelopes() {
        assert_eq!(unwrap_collection(json!({"data": [1, 2]})), json!([1, 2]));
        assert_eq!(unwrap_collection(json!([3])), json!([3]));
        assert_eq!(unwrap_record(json!({"data": {"id": 1}})), json!({"id": 1}));
        assert_eq!(unwrap_record(json!({"id": 1})), json!({"id": 1}));
    }
}
