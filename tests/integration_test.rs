// Integration tests for sacco-admin
// These drive AppState end to end over a mock transport.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sacco_admin::ApiError;
use sacco_admin::api::{ApiClient, ApiRequest, ApiResponse, Method, Transport};
use sacco_admin::app::dispatch::Dispatcher;
use sacco_admin::app::{AppOptions, AppState};
use sacco_admin::dialog::DialogState;
use sacco_admin::notify::ToastLevel;
use sacco_admin::resources::Member;
use sacco_admin::routes::{AdminPage, Route};
use sacco_admin::session::{Session, SessionStore};

const WAIT: Duration = Duration::from_secs(5);

/// Responses keyed by "METHOD /path". The last queued response for a route repeats.
#[derive(Default)]
struct MockApi {
    routes: Mutex<HashMap<String, VecDeque<ApiResponse>>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockApi {
    fn on(self: &Arc<Self>, method: Method, path: &str, status: u16, body: Value) -> Arc<Self> {
        self.routes
            .lock()
            .unwrap()
            .entry(format!("{} {path}", method.as_str()))
            .or_default()
            .push_back(ApiResponse { status, body });
        self.clone()
    }

    fn requests(&self) -> Vec<(Method, String)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect()
    }

    fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    fn body_of(&self, method: Method, path: &str) -> Option<Value> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .and_then(|r| r.body.clone())
    }
}

#[async_trait]
impl Transport for MockApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = format!("{} {}", request.method.as_str(), request.path);
        self.log.lock().unwrap().push(request);
        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or(ApiResponse {
            status: 404,
            body: json!({"message": "not found"}),
        }))
    }
}

fn admin_session() -> Session {
    Session {
        token: Some("tok".into()),
        user_id: Some("1".into()),
        role: Some("ADMIN".into()),
    }
}

fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

fn start(
    rt: &tokio::runtime::Runtime,
    api: Arc<MockApi>,
    session: Session,
    route: Route,
) -> (AppState, SessionStore) {
    let store = SessionStore::in_memory(session);
    let client = ApiClient::new(api, store.clone());
    let (dispatcher, outcomes) = Dispatcher::new(rt.handle().clone(), client);
    let app = AppState::new(
        dispatcher,
        outcomes,
        AppOptions {
            initial_route: route,
            ..AppOptions::default()
        },
    );
    (app, store)
}

fn press(app: &mut AppState, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_text(app: &mut AppState, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn members_dialog(app: &AppState) -> DialogState {
    app.page(AdminPage::Members)
        .dialog()
        .cloned()
        .unwrap_or_default()
}

fn cached_members(app: &AppState) -> usize {
    app.cache
        .get::<Vec<Member>>("members")
        .map(|rows| rows.len())
        .unwrap_or(0)
}

// 1) Create closes the dialog, invalidates the collection and refetches it
#[test]
fn create_member_closes_dialog_and_refetches() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default())
        .on(Method::Get, "/members", 200, json!([{"id": 1, "firstName": "Ann", "lastName": "Oloo", "status": "ACTIVE"}]))
        .on(
            Method::Get,
            "/members",
            200,
            json!({"data": [
                {"id": 1, "firstName": "Ann", "lastName": "Oloo", "status": "ACTIVE"},
                {"id": 2, "firstName": "Jane", "lastName": "Doe", "status": "PENDING"}
            ]}),
        )
        .on(Method::Post, "/members", 201, json!({"id": 2, "firstName": "Jane", "lastName": "Doe"}));
    let (mut app, _) = start(&rt, api.clone(), admin_session(), Route::Admin(AdminPage::Members));

    app.tick();
    assert!(app.wait_for_outcome(WAIT));
    assert_eq!(cached_members(&app), 1);

    press(&mut app, KeyCode::Char('n'));
    assert!(matches!(members_dialog(&app), DialogState::Open { .. }));
    type_text(&mut app, "Jane");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Doe");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "jane@example.com");
    press(&mut app, KeyCode::Enter);
    assert!(matches!(members_dialog(&app), DialogState::Submitting { .. }));

    assert!(app.wait_for_outcome(WAIT));
    assert_eq!(members_dialog(&app), DialogState::Closed);
    let toast = app.toasts.latest().unwrap();
    assert_eq!(toast.level, ToastLevel::Success);
    assert_eq!(toast.message, "Member created successfully");
    assert_eq!(
        api.body_of(Method::Post, "/members"),
        Some(json!({"firstName": "Jane", "lastName": "Doe", "email": "jane@example.com"}))
    );

    assert!(app.wait_for_outcome(WAIT));
    assert_eq!(api.count(Method::Get, "/members"), 2);
    assert_eq!(cached_members(&app), 2);
}

// 2) Invalid input never reaches the network
#[test]
fn invalid_form_makes_no_request() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default()).on(Method::Get, "/members", 200, json!([]));
    let (mut app, _) = start(&rt, api.clone(), admin_session(), Route::Admin(AdminPage::Members));
    app.tick();
    assert!(app.wait_for_outcome(WAIT));

    press(&mut app, KeyCode::Char('n'));
    type_text(&mut app, "Jane");
    press(&mut app, KeyCode::Enter);

    match members_dialog(&app) {
        DialogState::Open { form, .. } => {
            assert_eq!(form.errors().get("lastName"), Some("Last name is required"));
            assert_eq!(form.value("firstName"), Some("Jane"));
        }
        other => panic!("expected open dialog, got {other:?}"),
    }
    assert_eq!(api.count(Method::Post, "/members"), 0);
}

// 3) A failed mutation keeps the dialog open with the values entered
#[test]
fn failed_create_keeps_values_and_shows_server_message() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default())
        .on(Method::Get, "/members", 200, json!([]))
        .on(Method::Post, "/members", 400, json!({"message": "Email already registered"}));
    let (mut app, _) = start(&rt, api, admin_session(), Route::Admin(AdminPage::Members));
    app.tick();
    assert!(app.wait_for_outcome(WAIT));

    press(&mut app, KeyCode::Char('n'));
    type_text(&mut app, "Jane");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Doe");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "jane@example.com");
    press(&mut app, KeyCode::Enter);
    assert!(app.wait_for_outcome(WAIT));

    match members_dialog(&app) {
        DialogState::Open { form, error, .. } => {
            assert_eq!(error.as_deref(), Some("Email already registered"));
            assert_eq!(form.value("email"), Some("jane@example.com"));
        }
        other => panic!("expected open dialog, got {other:?}"),
    }
    let toast = app.toasts.latest().unwrap();
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(toast.message, "Email already registered");
}

// 3b) Emptying a prefilled optional field sends it as null
#[test]
fn edit_member_clearing_phone_sends_null() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default())
        .on(
            Method::Get,
            "/members",
            200,
            json!([{"id": 1, "firstName": "Ann", "lastName": "Oloo", "email": "ann@example.com",
                    "phone": "0712345678", "status": "ACTIVE"}]),
        )
        .on(Method::Put, "/members/1", 200, Value::Null);
    let (mut app, _) = start(&rt, api.clone(), admin_session(), Route::Admin(AdminPage::Members));
    app.tick();
    assert!(app.wait_for_outcome(WAIT));

    press(&mut app, KeyCode::Char('e'));
    match members_dialog(&app) {
        DialogState::Open { form, .. } => assert_eq!(form.value("phone"), Some("0712345678")),
        other => panic!("expected edit dialog, got {other:?}"),
    }
    for _ in 0..3 {
        press(&mut app, KeyCode::Tab);
    }
    for _ in 0.."0712345678".len() {
        press(&mut app, KeyCode::Backspace);
    }
    press(&mut app, KeyCode::Enter);
    assert!(app.wait_for_outcome(WAIT));

    assert_eq!(members_dialog(&app), DialogState::Closed);
    assert_eq!(
        api.body_of(Method::Put, "/members/1"),
        Some(json!({"firstName": "Ann", "lastName": "Oloo", "email": "ann@example.com", "phone": null}))
    );
    assert_eq!(app.toasts.latest().unwrap().message, "Member updated successfully");
}

// 4) Any 401 clears the token and sends the user to the session-expired login
#[test]
fn unauthorized_fetch_expires_session() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default()).on(Method::Get, "/members", 401, Value::Null);
    let (mut app, store) = start(&rt, api, admin_session(), Route::Admin(AdminPage::Members));
    app.tick();
    assert!(app.wait_for_outcome(WAIT));

    assert_eq!(app.route(), &Route::Login { session_expired: true });
    assert_eq!(app.route().path(), "/login?sessionExpired=true");
    assert!(store.token().is_none());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.toasts.latest().unwrap().level, ToastLevel::Warning);
}

// 5) Admin login lands on the admin dashboard
#[test]
fn admin_login_lands_on_admin_dashboard() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let token = jwt(json!({"sub": "42", "role": "ADMIN"}));
    let api = Arc::new(MockApi::default()).on(Method::Post, "/auth/login", 200, json!({"access_token": token}));
    let (mut app, store) = start(&rt, api.clone(), Session::default(), Route::login());

    type_text(&mut app, "a@b.com");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "secret1");
    press(&mut app, KeyCode::Enter);
    assert!(app.login.pending);
    assert!(app.wait_for_outcome(WAIT));

    assert_eq!(app.route(), &Route::Admin(AdminPage::Dashboard));
    assert_eq!(app.route().path(), "/admin/dashboard");
    let session = store.snapshot();
    assert_eq!(session.token.as_deref(), Some(token.as_str()));
    assert_eq!(session.user_id.as_deref(), Some("42"));
    assert_eq!(session.role.as_deref(), Some("ADMIN"));
    assert_eq!(
        api.body_of(Method::Post, "/auth/login"),
        Some(json!({"username": "a@b.com", "password": "secret1"}))
    );
}

// 6) A member role lands on the user dashboard
#[test]
fn member_login_lands_on_user_dashboard() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let token = jwt(json!({"userId": 7, "roles": ["ROLE_MEMBER"]}));
    let api = Arc::new(MockApi::default()).on(Method::Post, "/auth/login", 200, json!({"access_token": token}));
    let (mut app, _) = start(&rt, api, Session::default(), Route::login());

    type_text(&mut app, "a@b.com");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "secret1");
    press(&mut app, KeyCode::Enter);
    assert!(app.wait_for_outcome(WAIT));

    assert_eq!(app.route(), &Route::UserDashboard);
}

// 7) Rejected credentials keep the user on the login screen
#[test]
fn rejected_login_stays_on_login() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default()).on(Method::Post, "/auth/login", 401, json!({"message": "Bad credentials"}));
    let (mut app, store) = start(&rt, api, Session::default(), Route::login());

    type_text(&mut app, "a@b.com");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "wrong");
    press(&mut app, KeyCode::Enter);
    assert!(app.wait_for_outcome(WAIT));

    assert_eq!(app.route(), &Route::login());
    assert!(!store.is_authenticated());
    assert_eq!(app.login.error.as_deref(), Some("Bad credentials"));
    assert!(!app.login.pending);
}

// 8) Gated routes redirect to login without a token
#[test]
fn gated_route_redirects_to_login() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default());
    let (app, _) = start(&rt, api.clone(), Session::default(), Route::Admin(AdminPage::Members));
    assert_eq!(app.route(), &Route::Login { session_expired: false });

    let (app, _) = start(&rt, api.clone(), Session::default(), Route::parse("/register"));
    assert_eq!(app.route(), &Route::Register);

    let (app, _) = start(&rt, api, Session::default(), Route::parse("/admin/widgets"));
    assert_eq!(app.route(), &Route::login());
}

// 9) Logout clears the session and returns to login
#[test]
fn logout_clears_session() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(MockApi::default());
    let (mut app, store) = start(&rt, api, admin_session(), Route::Admin(AdminPage::Settings));
    press(&mut app, KeyCode::Char('L'));
    assert_eq!(app.route(), &Route::login());
    assert!(!store.is_authenticated());
}
