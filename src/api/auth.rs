//! Login, registration and password-reset calls.
//!
//! The backend answers a login with an `access_token` that is usually a JWT.
//! The role and user id are read from its payload when it decodes. Otherwise
//! they come from the `roles` / `userId` fields of the login response itself.
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiClient, Method};
use crate::error::ApiError;
use crate::routes::{AdminPage, Route};
use crate::session::Session;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default, alias = "accessToken", alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, rename = "userId", alias = "user_id")]
    pub user_id: Option<Value>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Result of a successful login: what to persist and where to go.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub session: Session,
    pub landing: Route,
}

/// Decode the payload segment of a JWT-shaped token. Signatures are not checked;
/// the server remains the authority on the token's validity.
pub fn decode_claims(token: &str) -> Option<Value> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.is_object().then_some(claims)
}

fn first_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|i| match i {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(o) => o
                .get("authority")
                .or_else(|| o.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn role_from_claims(claims: &Value) -> Option<String> {
    ["role", "roles", "authorities"]
        .iter()
        .find_map(|k| first_string(claims.get(*k)))
}

pub fn user_id_from_claims(claims: &Value) -> Option<String> {
    ["userId", "user_id", "sub"]
        .iter()
        .find_map(|k| first_string(claims.get(*k)))
}

/// Members land on their own dashboard; every other role on the admin console.
pub fn landing_route(role: Option<&str>) -> Route {
    match role {
        Some(r) if r.to_lowercase().contains("member") => Route::UserDashboard,
        _ => Route::Admin(AdminPage::Dashboard),
    }
}

/// Turn a login response into the session to persist.
pub fn resolve_login(response: LoginResponse) -> Result<LoginOutcome, ApiError> {
    let token = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Decode("login response carried no access token".into()))?;
    let claims = decode_claims(&token);
    let role = claims
        .as_ref()
        .and_then(role_from_claims)
        .or_else(|| response.roles.first().cloned());
    let user_id = claims
        .as_ref()
        .and_then(user_id_from_claims)
        .or_else(|| first_string(response.user_id.as_ref()));
    if claims.is_none() {
        tracing::debug!("access token is not a decodable JWT; using response roles");
    }
    let landing = landing_route(role.as_deref());
    Ok(LoginOutcome {
        session: Session {
            token: Some(token),
            user_id,
            role,
        },
        landing,
    })
}

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Authenticate and persist the resulting session.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, ApiError> {
        let body = serde_json::to_value(request)?;
        let raw = self
            .client
            .request_anonymous(Method::Post, "/auth/login", Some(body))
            .await?;
        let response: LoginResponse = serde_json::from_value(raw)?;
        let outcome = resolve_login(response)?;
        self.client.session().store(outcome.session.clone());
        tracing::info!(
            user_id = outcome.session.user_id.as_deref().unwrap_or("?"),
            role = outcome.session.role.as_deref().unwrap_or("?"),
            "logged in"
        );
        Ok(outcome)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(request)?;
        self.client
            .request_anonymous(Method::Post, "/auth/register", Some(body))
            .await
            .map(|_| ())
    }

    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(request)?;
        self.client
            .request_anonymous(Method::Post, "/auth/forgot-password", Some(body))
            .await
            .map(|_| ())
    }

    pub fn logout(&self) {
        self.client.session().clear();
        tracing::info!("logged out");
    }
}

#[cfg(test)]
pub(crate) fn make_jwt(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::session::SessionStore;
    use serde_json::json;

    #[test]
    fn role_read_from_jwt_claims() {
        let token = make_jwt(&json!({"sub": "17", "role": "ADMIN"}));
        let out = resolve_login(LoginResponse {
            access_token: Some(token),
            roles: vec!["IGNORED".into()],
            user_id: None,
        })
        .unwrap();
        assert_eq!(out.session.role.as_deref(), Some("ADMIN"));
        assert_eq!(out.session.user_id.as_deref(), Some("17"));
        assert_eq!(out.landing, Route::Admin(AdminPage::Dashboard));
    }

    #[test]
    fn opaque_token_falls_back_to_roles_array() {
        let out = resolve_login(LoginResponse {
            access_token: Some("opaque-token".into()),
            roles: vec!["ROLE_MEMBER".into()],
            user_id: Some(json!(9)),
        })
        .unwrap();
        assert_eq!(out.session.role.as_deref(), Some("ROLE_MEMBER"));
        assert_eq!(out.session.user_id.as_deref(), Some("9"));
        assert_eq!(out.landing, Route::UserDashboard);
    }

    #[test]
    fn authorities_objects_are_understood() {
        let claims = json!({"authorities": [{"authority": "ROLE_LOAN_OFFICER"}]});
        assert_eq!(role_from_claims(&claims).as_deref(), Some("ROLE_LOAN_OFFICER"));
    }

    #[test]
    fn missing_token_is_an_error() {
        assert!(resolve_login(LoginResponse::default()).is_err());
    }

    #[tokio::test]
    async fn login_persists_session() {
        let token = make_jwt(&json!({"role": "ADMIN", "userId": 3}));
        let transport = ScriptedTransport::with(vec![(200, json!({"access_token": token}))]);
        let session = SessionStore::in_memory(Session::default());
        let auth = AuthService::new(ApiClient::new(transport.clone(), session.clone()));
        let out = auth
            .login(&LoginRequest {
                username: "a@b.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert_eq!(out.landing.path(), "/admin/dashboard");
        assert_eq!(session.snapshot().user_id.as_deref(), Some("3"));
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"username": "a@b.com", "password": "secret1"}))
        );
    }
}
