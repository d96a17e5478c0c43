//! reqwest-backed [`Transport`] used by the binary.
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::ApiError;

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(ApiResponse {
            status,
            body: parse_body(&text),
        })
    }
}

/// Empty bodies become `Null`; non-JSON bodies are kept as a message string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "message": text.trim() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_join_handles_slashes() {
        let t = HttpTransport::new("https://api.example.org/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(t.url_for("/members"), "https://api.example.org/v1/members");
        assert_eq!(t.url_for("loans/3"), "https://api.example.org/v1/loans/3");
    }

    #[test]
    fn body_parsing_is_lenient() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("[1]"), serde_json::json!([1]));
        assert_eq!(parse_body("Bad Gateway"), serde_json::json!({"message": "Bad Gateway"}));
    }
}
