//! Persisted client session: the `token`, `userId` and `role` keys.
//!
//! Stored as a small `key = value` file in the config directory and shared
//! between the UI thread and request tasks through [`SessionStore`].
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub const KEY_TOKEN: &str = "token";
pub const KEY_USER_ID: &str = "userId";
pub const KEY_ROLE: &str = "role";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Parse the `key = value` representation. Unknown keys are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut session = Session::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if val.is_empty() {
                continue;
            }
            match key {
                KEY_TOKEN => session.token = Some(val.to_string()),
                KEY_USER_ID => session.user_id = Some(val.to_string()),
                KEY_ROLE => session.role = Some(val.to_string()),
                _ => {}
            }
        }
        session
    }

    pub fn render(&self) -> String {
        use std::fmt::Write as _;
        let mut buf = String::from("# sacco-admin session\n");
        let mut kv = |k: &str, v: &Option<String>| {
            if let Some(v) = v {
                let _ = writeln!(&mut buf, "{k} = {v}");
            }
        };
        kv(KEY_TOKEN, &self.token);
        kv(KEY_USER_ID, &self.user_id);
        kv(KEY_ROLE, &self.role);
        buf
    }
}

struct Inner {
    session: Mutex<Session>,
    expired: AtomicBool,
    path: Option<PathBuf>,
}

/// Thread-safe handle to the current session, optionally backed by a file.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// A store that never touches the filesystem.
    pub fn in_memory(session: Session) -> Self {
        Self::build(session, None)
    }

    /// Load the session file at `path`; a missing file yields an empty session.
    pub fn load(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let session = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("read session file {}", path.display()))?;
            Session::parse(&contents)
        } else {
            Session::default()
        };
        Ok(Self::build(session, Some(path)))
    }

    fn build(session: Session, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                expired: AtomicBool::new(false),
                path,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // A panic while holding the lock leaves a plain value behind; keep using it.
        self.inner
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone().filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    /// Replace the session (on login) and persist it.
    pub fn store(&self, session: Session) {
        *self.lock() = session;
        self.inner.expired.store(false, Ordering::SeqCst);
        self.persist();
    }

    /// Drop all credentials and persist the empty session.
    pub fn clear(&self) {
        *self.lock() = Session::default();
        self.persist();
    }

    /// Clear credentials and raise the session-expired signal (HTTP 401).
    pub fn expire(&self) {
        self.clear();
        self.inner.expired.store(true, Ordering::SeqCst);
    }

    /// Consume the session-expired signal.
    pub fn take_expired(&self) -> bool {
        self.inner.expired.swap(false, Ordering::SeqCst)
    }

    fn persist(&self) {
        let Some(path) = &self.inner.path else {
            return;
        };
        let body = self.lock().render();
        if let Err(e) = std::fs::write(path, body) {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist session");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.lock();
        f.debug_struct("SessionStore")
            .field("authenticated", &s.is_authenticated())
            .field("user_id", &s.user_id)
            .field("role", &s.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_comments_and_unknown_keys() {
        let s = Session::parse("# hi\ntoken = abc\nuserId=7\ncolor = red\nrole = ADMIN\n");
        assert_eq!(s.token.as_deref(), Some("abc"));
        assert_eq!(s.user_id.as_deref(), Some("7"));
        assert_eq!(s.role.as_deref(), Some("ADMIN"));
    }

    #[test]
    fn store_persists_and_clear_empties_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.conf");
        let store = SessionStore::load(&path).expect("load");
        assert!(!store.is_authenticated());

        store.store(Session {
            token: Some("t0k".into()),
            user_id: Some("42".into()),
            role: Some("ADMIN".into()),
        });
        let reloaded = SessionStore::load(&path).expect("reload");
        assert_eq!(reloaded.token().as_deref(), Some("t0k"));

        store.clear();
        let reloaded = SessionStore::load(&path).expect("reload");
        assert_eq!(reloaded.snapshot(), Session::default());
    }

    #[test]
    fn expire_clears_and_signals_once() {
        let store = SessionStore::in_memory(Session {
            token: Some("x".into()),
            ..Session::default()
        });
        store.expire();
        assert!(store.token().is_none());
        assert!(store.take_expired());
        assert!(!store.take_expired());
    }
}
