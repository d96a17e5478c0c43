//! Application state and entry glue.
//!
//! [`AppState`] owns the current route, the query cache, every admin page and
//! the auth forms. Input arrives through [`AppState::handle_key`]; background
//! results arrive through [`AppState::tick`], which drains the dispatcher's
//! channel and requests whatever the current screen is missing.
pub mod dispatch;
pub mod keymap;
pub mod page;
pub mod pages;
pub mod theme;
pub mod update;

pub use update::run_app as run;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::api::auth::{ForgotPasswordRequest, LoginRequest, RegisterRequest, landing_route};
use crate::error::{ApiError, GENERIC_FAILURE};
use crate::form::{FieldKind, FieldSpec, FormState};
use crate::notify::{NotificationFeed, Toasts};
use crate::query::QueryCache;
use crate::resources::{Lookups, RecordId, fetch_collection};
use crate::routes::{AdminPage, Route, guard};
use crate::session::{Session, SessionStore};
use dispatch::{Dispatcher, Outcome, PROFILE_KEY};
use keymap::{KeyAction, Keymap};
use page::{Page, PageCtx, PageEvent, RenderCtx};
use pages::SettingsInfo;
use theme::Theme;

/// One of the public auth screens' forms.
#[derive(Clone, Debug)]
pub struct AuthForm {
    pub form: FormState,
    /// A request is in flight; input is ignored until it settles.
    pub pending: bool,
    pub error: Option<String>,
}

impl AuthForm {
    fn new(specs: Vec<FieldSpec>) -> Self {
        Self {
            form: FormState::new(specs),
            pending: false,
            error: None,
        }
    }

    fn login() -> Self {
        Self::new(vec![
            FieldSpec::text("username", "Username").required(),
            FieldSpec::new("password", "Password", FieldKind::Password).required(),
        ])
    }

    fn register() -> Self {
        Self::new(vec![
            FieldSpec::text("username", "Username").required().min_len(3),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::new("password", "Password", FieldKind::Password).required(),
            FieldSpec::new("confirm", "Confirm password", FieldKind::Password).required(),
        ])
    }

    fn forgot() -> Self {
        Self::new(vec![FieldSpec::new("email", "Email", FieldKind::Email).required()])
    }

    fn value(&self, name: &str) -> String {
        self.form.value(name).unwrap_or_default().to_string()
    }

    fn settle<T>(&mut self, result: &Result<T, ApiError>, fallback: &str) -> Option<String> {
        self.pending = false;
        match result {
            Ok(_) => {
                self.error = None;
                None
            }
            Err(e) => {
                let msg = e.user_message(fallback);
                self.error = Some(msg.clone());
                Some(msg)
            }
        }
    }
}

/// What an auth form wants after a key press.
enum FormKey {
    Submit,
    Cancel,
    Edited,
}

fn auth_form_key(form: &mut FormState, key: KeyEvent) -> FormKey {
    match key.code {
        KeyCode::Enter => return FormKey::Submit,
        KeyCode::Esc => return FormKey::Cancel,
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.input(c),
        _ => {}
    }
    FormKey::Edited
}

/// Startup options resolved from CLI and config.
#[derive(Clone, Debug)]
pub struct AppOptions {
    pub initial_route: Route,
    pub theme: Theme,
    pub keymap: Keymap,
    pub page_size: usize,
    pub settings: SettingsInfo,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            initial_route: Route::Home,
            theme: Theme::default(),
            keymap: Keymap::default(),
            page_size: 10,
            settings: SettingsInfo::default(),
        }
    }
}

pub struct AppState {
    route: Route,
    session: SessionStore,
    pub cache: QueryCache,
    pub lookups: Lookups,
    lookups_rev: Option<u64>,
    pages: Vec<Box<dyn Page>>,
    pub toasts: Toasts,
    pub feed: NotificationFeed,
    pub theme: Theme,
    pub keymap: Keymap,
    pub login: AuthForm,
    pub register: AuthForm,
    pub forgot: AuthForm,
    pub show_help: bool,
    pub should_quit: bool,
    dispatcher: Dispatcher,
    outcomes: Receiver<Outcome>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, outcomes: Receiver<Outcome>, options: AppOptions) -> Self {
        let session = dispatcher.client().session().clone();
        let mut app = Self {
            route: Route::Home,
            session,
            cache: QueryCache::new(),
            lookups: Lookups::default(),
            lookups_rev: None,
            pages: pages::build_all(options.page_size, options.settings),
            toasts: Toasts::default(),
            feed: NotificationFeed::seeded(chrono::Utc::now()),
            theme: options.theme,
            keymap: options.keymap,
            login: AuthForm::login(),
            register: AuthForm::register(),
            forgot: AuthForm::forgot(),
            show_help: false,
            should_quit: false,
            dispatcher,
            outcomes,
        };
        app.navigate(options.initial_route);
        app
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    pub fn page(&self, id: AdminPage) -> &dyn Page {
        self.pages[id.index()].as_ref()
    }

    /// The page behind the current route, when it is an admin page.
    pub fn current_page(&self) -> Option<&dyn Page> {
        match self.route {
            Route::Admin(id) => Some(self.page(id)),
            _ => None,
        }
    }

    pub fn render_ctx<'a>(&'a self, session: &'a Session) -> RenderCtx<'a> {
        RenderCtx {
            cache: &self.cache,
            lookups: &self.lookups,
            theme: &self.theme,
            feed: &self.feed,
            session,
        }
    }

    /// Change route through the auth guard.
    pub fn navigate(&mut self, route: Route) {
        let route = guard(route, self.session.is_authenticated());
        if route == self.route {
            return;
        }
        match &route {
            Route::Login { session_expired: true } => {
                self.toasts.warning("Your session has expired. Please log in again.");
            }
            Route::Login { .. } => self.login.error = None,
            Route::Register => self.register.error = None,
            Route::ForgotPassword => self.forgot.error = None,
            _ => {}
        }
        tracing::info!(from = %self.route, to = %route, "navigate");
        self.route = route;
    }

    /// One pass of background bookkeeping; called before every draw.
    pub fn tick(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.apply(outcome);
        }
        self.settle_background();
    }

    /// Block until one background result lands (or `timeout` passes), then tick.
    pub fn wait_for_outcome(&mut self, timeout: Duration) -> bool {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => {
                self.apply(outcome);
                self.tick();
                true
            }
            Err(_) => false,
        }
    }

    fn settle_background(&mut self) {
        if self.session.take_expired() {
            self.cache.clear();
            self.navigate(Route::Login {
                session_expired: true,
            });
        }
        self.request_dependencies();
        self.toasts.prune(Instant::now());
        if self.lookups_rev != Some(self.cache.revision()) {
            self.lookups = Lookups::from_cache(&self.cache);
            self.lookups_rev = Some(self.cache.revision());
        }
    }

    fn request_dependencies(&mut self) {
        if !self.session.is_authenticated() {
            return;
        }
        let keys = match &self.route {
            Route::Admin(id) => self.pages[id.index()].dependencies(),
            Route::UserDashboard => {
                let user_id = self.session.snapshot().user_id;
                if let Some(id) = user_id {
                    if self.cache.needs_fetch(PROFILE_KEY) && self.cache.begin_fetch(PROFILE_KEY) {
                        self.dispatcher
                            .fetch_profile(RecordId::parse(&id), self.cache.generation());
                    }
                }
                return;
            }
            _ => return,
        };
        for key in keys {
            if !self.cache.needs_fetch(key) || !self.cache.begin_fetch(key) {
                continue;
            }
            if !fetch_collection(&self.dispatcher, key, self.cache.generation()) {
                tracing::warn!(key, "no collection registered under key");
                self.cache
                    .settle(key, Err(ApiError::Decode(format!("unknown collection {key}"))));
            }
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Loaded {
                key,
                generation,
                result,
            } => self.cache.settle_for(generation, key, result),
            Outcome::Mutated {
                page,
                key,
                related,
                label,
                kind,
                result,
            } => match result {
                Ok(()) => {
                    tracing::info!(resource = key, ?kind, "mutation succeeded");
                    self.cache.invalidate(key);
                    for k in related {
                        self.cache.invalidate(k);
                    }
                    self.toasts.success(kind.success_message(label));
                    self.pages[page.index()].on_mutation(Ok(()));
                }
                Err(e) => {
                    let msg = e.user_message(GENERIC_FAILURE);
                    tracing::warn!(resource = key, ?kind, error = %e, "mutation failed");
                    if !e.is_unauthorized() {
                        self.toasts.error(msg.clone());
                    }
                    self.pages[page.index()].on_mutation(Err(msg.as_str()));
                }
            },
            Outcome::LoggedIn(result) => {
                let failure = self
                    .login
                    .settle(&result, "Login failed. Check your username and password.");
                match result {
                    Ok(outcome) => {
                        self.login.form = AuthForm::login().form;
                        self.cache.clear();
                        self.toasts.success("Login successful");
                        self.navigate(outcome.landing);
                    }
                    Err(_) => self.toasts.error(failure.unwrap_or_default()),
                }
            }
            Outcome::Registered(result) => match self.register.settle(&result, GENERIC_FAILURE) {
                None => {
                    self.register = AuthForm::register();
                    self.toasts.success("Registration successful. Please log in.");
                    self.navigate(Route::login());
                }
                Some(msg) => self.toasts.error(msg),
            },
            Outcome::ResetRequested(result) => match self.forgot.settle(&result, GENERIC_FAILURE) {
                None => {
                    self.forgot = AuthForm::forgot();
                    self.toasts.success("Password reset instructions have been sent to your email.");
                    self.navigate(Route::login());
                }
                Some(msg) => self.toasts.error(msg),
            },
        }
    }

    pub fn logout(&mut self) {
        self.dispatcher.logout();
        self.cache.clear();
        self.toasts.info("You have been logged out");
        self.navigate(Route::login());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }
        match self.route.clone() {
            Route::Admin(id) => self.admin_key(id, key),
            Route::Login { .. } => self.login_key(key),
            Route::Register => self.register_key(key),
            Route::ForgotPassword => self.forgot_key(key),
            Route::Home | Route::UserDashboard | Route::NotFound(_) => self.public_key(key),
        }
    }

    fn admin_key(&mut self, id: AdminPage, key: KeyEvent) {
        let idx = id.index();
        let mut ctx = PageCtx {
            cache: &mut self.cache,
            lookups: &self.lookups,
            dispatcher: &self.dispatcher,
            toasts: &mut self.toasts,
            feed: &mut self.feed,
        };
        if self.pages[idx].captures_input() {
            self.pages[idx].handle_input(key, &mut ctx);
            return;
        }
        let Some(action) = self.keymap.resolve(&key) else {
            return;
        };
        let event = match action {
            KeyAction::Quit => {
                self.should_quit = true;
                return;
            }
            KeyAction::OpenHelp => {
                self.show_help = true;
                return;
            }
            KeyAction::NextScreen => {
                let next = AdminPage::ALL[(idx + 1) % AdminPage::ALL.len()];
                PageEvent::Navigate(Route::Admin(next))
            }
            KeyAction::PrevScreen => {
                let n = AdminPage::ALL.len();
                PageEvent::Navigate(Route::Admin(AdminPage::ALL[(idx + n - 1) % n]))
            }
            KeyAction::ToggleTheme => PageEvent::ToggleTheme,
            KeyAction::Logout => PageEvent::Logout,
            other => self.pages[idx].handle_action(other, &mut ctx),
        };
        self.apply_page_event(event);
    }

    fn apply_page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Ignored | PageEvent::Handled => {}
            PageEvent::Navigate(route) => self.navigate(route),
            PageEvent::ToggleTheme => {
                self.theme = self.theme.toggled();
                tracing::info!(theme = self.theme.name, "theme switched");
            }
            PageEvent::Logout => self.logout(),
        }
    }

    fn public_key(&mut self, key: KeyEvent) {
        let action = self.keymap.resolve(&key);
        let route = self.route.clone();
        match (&route, action) {
            (_, Some(KeyAction::Quit)) => self.should_quit = true,
            (_, Some(KeyAction::OpenHelp)) => self.show_help = true,
            (_, Some(KeyAction::ToggleTheme)) => self.apply_page_event(PageEvent::ToggleTheme),
            (Route::Home, Some(KeyAction::EnterAction)) => {
                let target = if self.session.is_authenticated() {
                    landing_route(self.session.snapshot().role.as_deref())
                } else {
                    Route::login()
                };
                self.navigate(target);
            }
            (Route::NotFound(_), Some(KeyAction::EnterAction)) => self.navigate(Route::Home),
            (Route::UserDashboard, Some(KeyAction::Logout)) => self.logout(),
            (Route::UserDashboard, Some(KeyAction::Refresh)) => self.cache.invalidate(PROFILE_KEY),
            _ => {}
        }
    }

    fn login_key(&mut self, key: KeyEvent) {
        if self.login.pending {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => self.navigate(Route::Register),
                KeyCode::Char('f') => self.navigate(Route::ForgotPassword),
                _ => {}
            }
            return;
        }
        match auth_form_key(&mut self.login.form, key) {
            FormKey::Submit => {
                if self.login.form.validate().is_err() {
                    return;
                }
                let request = LoginRequest {
                    username: self.login.value("username").trim().to_string(),
                    password: self.login.value("password"),
                };
                self.login.pending = true;
                self.login.error = None;
                self.dispatcher.login(request);
            }
            FormKey::Cancel => self.navigate(Route::Home),
            FormKey::Edited => {}
        }
    }

    fn register_key(&mut self, key: KeyEvent) {
        if self.register.pending {
            return;
        }
        match auth_form_key(&mut self.register.form, key) {
            FormKey::Submit => {
                if self.register.form.validate().is_err() {
                    return;
                }
                if self.register.value("password") != self.register.value("confirm") {
                    self.register.form.add_error("confirm", "Passwords do not match");
                    return;
                }
                let request = RegisterRequest {
                    username: self.register.value("username").trim().to_string(),
                    email: self.register.value("email").trim().to_string(),
                    password: self.register.value("password"),
                };
                self.register.pending = true;
                self.dispatcher.register(request);
            }
            FormKey::Cancel => self.navigate(Route::login()),
            FormKey::Edited => {}
        }
    }

    fn forgot_key(&mut self, key: KeyEvent) {
        if self.forgot.pending {
            return;
        }
        match auth_form_key(&mut self.forgot.form, key) {
            FormKey::Submit => {
                if self.forgot.form.validate().is_err() {
                    return;
                }
                let request = ForgotPasswordRequest {
                    email: self.forgot.value("email").trim().to_string(),
                };
                self.forgot.pending = true;
                self.dispatcher.forgot_password(request);
            }
            FormKey::Cancel => self.navigate(Route::login()),
            FormKey::Edited => {}
        }
    }
}
