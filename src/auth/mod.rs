//! Operator authentication.
//!
//! [`AuthStore`] is an explicitly constructed holder of the current
//! [`Session`]. Components that care about sign-in state subscribe to it
//! instead of reaching for a process-wide singleton. A store can persist its
//! session to `.campus/session.json` so separate CLI invocations share it.

mod identity;
mod session;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use secrecy::ExposeSecret;

use crate::error::{CampusError, Result};
use crate::types::CAMPUS_DIR;

pub use identity::{
    DEFAULT_ENDPOINT, DEFAULT_TOKEN_ENDPOINT, GOOGLE_PROVIDER, IdentityProvider, IdentityToolkit,
    describe_error,
};
pub use session::Session;

use session::StoredSession;

/// Handle returned by [`AuthStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

/// Holder of the current session with change subscriptions
pub struct AuthStore {
    inner: Mutex<Inner>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AuthStore")
            .field("signed_in", &inner.session.is_some())
            .field("listeners", &inner.listeners.len())
            .field("path", &self.path)
            .finish()
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AuthStore {
    /// Store that keeps the session in memory only
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            path: None,
        }
    }

    /// Default session file location
    pub fn default_path() -> PathBuf {
        PathBuf::from(CAMPUS_DIR).join("session.json")
    }

    /// Store backed by a session file, loading any session already saved there
    pub fn persistent(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let session = load_session(&path)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                session,
                ..Inner::default()
            }),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The current session, if any (expired sessions included)
    pub fn current(&self) -> Option<Session> {
        self.inner.lock().session.clone()
    }

    /// The current session, or an error when signed out or expired
    pub fn require_session(&self) -> Result<Session> {
        match self.current() {
            None => Err(CampusError::NotSignedIn),
            Some(session) if session.is_expired() => Err(CampusError::SessionExpired),
            Some(session) => Ok(session),
        }
    }

    /// The current session, with its tokens refreshed through `provider`
    /// first when they have expired. The refreshed session is stored.
    pub async fn refreshed_session<P>(&self, provider: &P) -> Result<Session>
    where
        P: IdentityProvider + ?Sized,
    {
        let session = self.current().ok_or(CampusError::NotSignedIn)?;
        if !session.is_expired() {
            return Ok(session);
        }
        if session.refresh_token.expose_secret().is_empty() {
            return Err(CampusError::SessionExpired);
        }

        match provider.refresh(&session).await {
            Ok(fresh) => {
                self.set(fresh.clone())?;
                Ok(fresh)
            }
            Err(e) => {
                tracing::warn!(uid = %session.uid, "token refresh failed: {e}");
                Err(CampusError::SessionExpired)
            }
        }
    }

    /// Replace the session and notify subscribers
    pub fn set(&self, session: Session) -> Result<()> {
        if let Some(path) = &self.path {
            save_session(path, &session)?;
        }
        tracing::debug!(uid = %session.uid, "session set");
        self.inner.lock().session = Some(session);
        self.emit();
        Ok(())
    }

    /// Drop the session and notify subscribers
    pub fn clear(&self) -> Result<()> {
        if let Some(path) = &self.path
            && path.exists()
        {
            fs::remove_file(path)?;
        }
        tracing::debug!("session cleared");
        self.inner.lock().session = None;
        self.emit();
        Ok(())
    }

    /// Register a listener. It is called immediately with the current state
    /// and again after every change until unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let (id, session) = {
            let mut inner = self.inner.lock();
            let id = SubscriptionId(inner.next_id);
            inner.next_id += 1;
            inner.listeners.push((id, listener.clone()));
            (id, inner.session.clone())
        };
        listener(session.as_ref());
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        inner.listeners.len() != before
    }

    /// Call every listener outside the lock so listeners may use the store
    fn emit(&self) {
        let (session, listeners): (Option<Session>, Vec<Listener>) = {
            let inner = self.inner.lock();
            (
                inner.session.clone(),
                inner.listeners.iter().map(|(_, l)| l.clone()).collect(),
            )
        };
        for listener in listeners {
            listener(session.as_ref());
        }
    }
}

fn load_session(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    match serde_json::from_str::<StoredSession>(&content) {
        Ok(stored) => Ok(Some(stored.into())),
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unreadable session file: {e}");
            Ok(None)
        }
    }
}

fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&StoredSession::from(session))?;
    write_private(path, content.as_bytes())
}

/// Write a file only the owner can read. The mode is set at creation so the
/// tokens are never readable by others, and re-applied for older files.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use jiff::{SignedDuration, Timestamp};
    use secrecy::{ExposeSecret, SecretString};
    use tempfile::TempDir;

    use super::*;

    fn session(uid: &str, expires_at: Timestamp) -> Session {
        Session {
            uid: uid.to_string(),
            email: format!("{uid}@uni.edu"),
            display_name: Some("Operator".to_string()),
            id_token: SecretString::from(format!("token-{uid}")),
            refresh_token: SecretString::from("refresh".to_string()),
            expires_at,
        }
    }

    fn fresh(uid: &str) -> Session {
        session(uid, Timestamp::now() + SignedDuration::from_hours(1))
    }

    #[test]
    fn test_require_session_states() {
        let store = AuthStore::in_memory();
        assert!(matches!(
            store.require_session(),
            Err(CampusError::NotSignedIn)
        ));

        store.set(session("old", Timestamp::UNIX_EPOCH)).unwrap();
        assert!(matches!(
            store.require_session(),
            Err(CampusError::SessionExpired)
        ));

        store.set(fresh("u1")).unwrap();
        assert_eq!(store.require_session().unwrap().uid, "u1");
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let store = AuthStore::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let signed_in = Arc::new(Mutex::new(Vec::new()));

        let id = {
            let calls = calls.clone();
            let signed_in = signed_in.clone();
            store.subscribe(move |session| {
                calls.fetch_add(1, Ordering::SeqCst);
                signed_in.lock().push(session.map(|s| s.uid.clone()));
            })
        };
        assert_eq!(calls.load(Ordering::SeqCst), 1, "called on subscribe");

        store.set(fresh("u1")).unwrap();
        store.clear().unwrap();
        assert_eq!(
            *signed_in.lock(),
            vec![None, Some("u1".to_string()), None]
        );

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set(fresh("u2")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_listener_may_read_store() {
        let store = Arc::new(AuthStore::in_memory());
        let seen = Arc::new(Mutex::new(None));
        {
            let inner_store = store.clone();
            let seen = seen.clone();
            store.subscribe(move |_| {
                *seen.lock() = inner_store.current().map(|s| s.uid);
            });
        }
        store.set(fresh("u9")).unwrap();
        assert_eq!(seen.lock().as_deref(), Some("u9"));
    }

    #[test]
    fn test_persistent_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".campus").join("session.json");

        let store = AuthStore::persistent(&path).unwrap();
        assert!(store.current().is_none());
        store.set(fresh("u1")).unwrap();
        assert!(path.exists());

        let reloaded = AuthStore::persistent(&path).unwrap();
        let session = reloaded.current().unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(session.id_token.expose_secret(), "token-u1");

        reloaded.clear().unwrap();
        assert!(!path.exists());
        assert!(AuthStore::persistent(&path).unwrap().current().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = AuthStore::persistent(&path).unwrap();
        store.set(fresh("u1")).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        fs::remove_file(&path).unwrap();
        store.set(fresh("u2")).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_unreadable_session_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = AuthStore::persistent(&path).unwrap();
        assert!(store.current().is_none());
    }
}
