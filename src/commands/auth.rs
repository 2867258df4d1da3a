//! Operator sign-in commands: `auth login|signup|profile|logout|whoami`

use owo_colors::OwoColorize;
use secrecy::SecretString;
use serde_json::json;

use super::interactive::prompt_secret;
use super::{CommandOutput, session_store};
use crate::auth::{AuthStore, GOOGLE_PROVIDER, IdentityProvider, IdentityToolkit, Session};
use crate::config::Config;
use crate::error::{CampusError, Result};
use crate::notify::{ConsoleNotifier, Notification, Notifier};
use crate::validation::is_valid_email;

/// How `auth login` authenticates
#[derive(Debug, Clone)]
pub enum LoginMethod {
    /// Email and password; the password is prompted for when absent
    Password {
        email: String,
        password: Option<String>,
    },
    /// Google id token obtained out of band
    GoogleIdToken(String),
}

fn password_or_prompt(password: Option<String>) -> Result<SecretString> {
    let password = match password {
        Some(p) => p,
        None => prompt_secret("Password")?,
    };
    Ok(SecretString::from(password))
}

fn session_json(session: &Session) -> serde_json::Value {
    json!({
        "uid": session.uid,
        "email": session.email,
        "display_name": session.display_name,
        "expires_at": session.expires_at.to_string(),
    })
}

/// Sign in through `provider` and store the session.
///
/// The outcome is also reported through `notifier`.
pub async fn run_login<P, N>(
    provider: &P,
    store: &AuthStore,
    notifier: &N,
    method: LoginMethod,
) -> Result<CommandOutput>
where
    P: IdentityProvider + ?Sized,
    N: Notifier,
{
    let result = match method {
        LoginMethod::Password { email, password } => {
            let password = password_or_prompt(password)?;
            provider.sign_in_with_password(&email, &password).await
        }
        LoginMethod::GoogleIdToken(token) => {
            provider
                .sign_in_with_idp(GOOGLE_PROVIDER, &SecretString::from(token))
                .await
        }
    };

    let session = match result {
        Ok(session) => session,
        Err(e) => {
            notifier.notify(Notification::destructive("Login Failed", e.to_string()));
            return Err(e);
        }
    };

    store.set(session.clone())?;
    notifier.notify(Notification::info(
        "Login Successful",
        format!(
            "Welcome back, {}!",
            session.display_name.as_deref().unwrap_or("User")
        ),
    ));

    Ok(CommandOutput::new(session_json(&session))
        .with_text(format!("Signed in as {}", session.email.cyan())))
}

/// Create an account, then keep the new session
pub async fn run_signup<P, N>(
    provider: &P,
    store: &AuthStore,
    notifier: &N,
    email: &str,
    password: SecretString,
    name: Option<&str>,
) -> Result<CommandOutput>
where
    P: IdentityProvider + ?Sized,
    N: Notifier,
{
    let session = match provider.sign_up(email, &password, name).await {
        Ok(session) => session,
        Err(e) => {
            notifier.notify(Notification::destructive("Signup Error", e.to_string()));
            return Err(e);
        }
    };

    store.set(session.clone())?;
    notifier.notify(Notification::info(
        "Account Created",
        format!("Welcome, {}!", session.label()),
    ));

    Ok(CommandOutput::new(session_json(&session))
        .with_text(format!("Signed in as {}", session.email.cyan())))
}

/// Change the signed-in operator's display name and/or email.
///
/// Values equal to the current ones are not sent.
pub async fn run_profile<P, N>(
    provider: &P,
    store: &AuthStore,
    notifier: &N,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<CommandOutput>
where
    P: IdentityProvider + ?Sized,
    N: Notifier,
{
    let name = name.map(str::trim);
    let email = email.map(str::trim);
    if name.is_none() && email.is_none() {
        return Err(CampusError::Other(
            "nothing to update; pass --name or --email".to_string(),
        ));
    }
    if let Some(email) = email
        && !is_valid_email(email)
    {
        return Err(CampusError::Auth("Invalid email address.".to_string()));
    }

    let session = store.refreshed_session(provider).await?;
    let name = name.filter(|n| Some(*n) != session.display_name.as_deref());
    let email = email.filter(|e| *e != session.email);
    if name.is_none() && email.is_none() {
        return Ok(CommandOutput::new(session_json(&session))
            .with_text("Profile unchanged".dimmed().to_string()));
    }

    let updated = match provider.update_profile(&session, name, email).await {
        Ok(updated) => updated,
        Err(e) => {
            notifier.notify(Notification::destructive(
                "Update Failed",
                format!("Failed to update profile: {e}"),
            ));
            return Err(e);
        }
    };

    store.set(updated.clone())?;
    notifier.notify(Notification::info(
        "Profile Updated",
        "Profile updated successfully!",
    ));

    Ok(CommandOutput::new(session_json(&updated)).with_text(format!(
        "Updated profile: {} <{}>",
        updated.label().bold(),
        updated.email
    )))
}

pub async fn cmd_auth_login(method: LoginMethod, as_json: bool) -> Result<()> {
    let config = Config::load()?;
    let provider = IdentityToolkit::from_config(&config)?;
    let store = session_store()?;
    run_login(&provider, &store, &ConsoleNotifier, method)
        .await?
        .print(as_json)
}

pub async fn cmd_auth_signup(
    email: &str,
    password: Option<String>,
    name: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let provider = IdentityToolkit::from_config(&config)?;
    let store = session_store()?;
    let password = password_or_prompt(password)?;
    run_signup(&provider, &store, &ConsoleNotifier, email, password, name)
        .await?
        .print(as_json)
}

pub async fn cmd_auth_profile(
    name: Option<&str>,
    email: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let provider = IdentityToolkit::from_config(&config)?;
    let store = session_store()?;
    run_profile(&provider, &store, &ConsoleNotifier, name, email)
        .await?
        .print(as_json)
}

pub fn cmd_auth_logout(as_json: bool) -> Result<()> {
    let store = session_store()?;
    let was_signed_in = store.current().is_some();
    store.clear()?;

    let text = if was_signed_in {
        "Signed out".to_string()
    } else {
        "Not signed in".dimmed().to_string()
    };
    CommandOutput::new(json!({ "signed_out": was_signed_in }))
        .with_text(text)
        .print(as_json)
}

pub fn cmd_auth_whoami(as_json: bool) -> Result<()> {
    let store = session_store()?;
    let session = store.current().ok_or(CampusError::NotSignedIn)?;

    let mut text = format!("{} <{}>", session.label().bold(), session.email);
    if session.is_expired() {
        text.push_str(&format!(" {}", "(expired)".red()));
    }

    let mut value = session_json(&session);
    value["expired"] = json!(session.is_expired());
    CommandOutput::new(value).with_text(text).print(as_json)
}
