//! Signed-in operator session

use jiff::{SignedDuration, Timestamp};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Tokens are treated as stale this long before the provider's expiry
const EXPIRY_SKEW_SECS: i64 = 60;

/// An authenticated operator
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub id_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: Timestamp,
}

impl Session {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at - SignedDuration::from_secs(EXPIRY_SKEW_SECS)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    /// Display name, or the email when none was set
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

/// On-disk form of a session
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    uid: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_at: Timestamp,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            uid: session.uid.clone(),
            email: session.email.clone(),
            display_name: session.display_name.clone(),
            id_token: session.id_token.expose_secret().to_string(),
            refresh_token: session.refresh_token.expose_secret().to_string(),
            expires_at: session.expires_at,
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            uid: stored.uid,
            email: stored.email,
            display_name: stored.display_name,
            id_token: SecretString::from(stored.id_token),
            refresh_token: SecretString::from(stored.refresh_token),
            expires_at: stored.expires_at,
        }
    }
}
