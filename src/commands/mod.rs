mod auth;
mod collection;
mod config;
mod courses;
pub mod interactive;

pub use auth::{
    LoginMethod, cmd_auth_login, cmd_auth_logout, cmd_auth_profile, cmd_auth_signup,
    cmd_auth_whoami, run_login, run_profile, run_signup,
};
pub use collection::{
    ListOptions, cmd_add, cmd_edit, cmd_list, cmd_remove, run_add, run_edit, run_list, run_remove,
};
pub use config::{cmd_config_set, cmd_config_show};
pub use courses::cmd_courses;

use serde_json::Value;

use crate::auth::{AuthStore, IdentityToolkit, Session, SubscriptionId};
use crate::config::Config;
use crate::error::Result;

/// Output of a command, rendered as JSON or text
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn json(&self) -> &Value {
        &self.json
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Print to stdout; JSON is used when requested or when there is no text
    pub fn print(self, as_json: bool) -> Result<()> {
        match self.text {
            Some(text) if !as_json => println!("{text}"),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The session file shared by every command
pub fn session_store() -> Result<AuthStore> {
    let store = AuthStore::persistent(AuthStore::default_path())?;
    watch_auth_state(&store);
    Ok(store)
}

/// Log every sign-in state change of `store`
pub fn watch_auth_state(store: &AuthStore) -> SubscriptionId {
    store.subscribe(|session| match session {
        Some(session) if session.is_expired() => {
            tracing::debug!(email = %session.email, "auth state: session expired")
        }
        Some(session) => {
            tracing::debug!(
                email = %session.email,
                until = %session.expires_at,
                "auth state: signed in"
            )
        }
        None => tracing::debug!("auth state: signed out"),
    })
}

/// Fail unless an operator is signed in.
///
/// An expired session is refreshed when the identity provider is configured.
pub async fn require_sign_in() -> Result<Session> {
    let store = session_store()?;
    let config = Config::load()?;
    match IdentityToolkit::from_config(&config) {
        Ok(provider) => store.refreshed_session(&provider).await,
        Err(_) => store.require_session(),
    }
}
