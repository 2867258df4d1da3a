//! Hosted identity provider client (Identity Toolkit v1 REST).
//!
//! Account calls are JSON `POST`s to `accounts:<method>?key=<web api key>`;
//! token refresh is a form `POST` to the secure token service. The key ends
//! up in the request URL, so request URLs are never logged.

use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::config::Config;
use crate::error::{CampusError, Result};

use super::session::Session;

pub const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1/";

/// Secure token service, which exchanges refresh tokens
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/";

/// Provider id for Google federated sign-in
pub const GOOGLE_PROVIDER: &str = "google.com";

/// Operations against the hosted identity provider
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &SecretString)
    -> Result<Session>;

    /// Create an account, optionally setting its display name
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        display_name: Option<&str>,
    ) -> Result<Session>;

    /// Exchange a federated provider's id token for a session
    async fn sign_in_with_idp(&self, provider_id: &str, id_token: &SecretString)
    -> Result<Session>;

    /// Trade the session's refresh token for new tokens
    async fn refresh(&self, session: &Session) -> Result<Session>;

    /// Change the display name and/or email of the signed-in account.
    ///
    /// `None` leaves that attribute as it is.
    async fn update_profile(
        &self,
        session: &Session,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Session>;
}

fn expiry(now: Timestamp, expires_in: &str) -> Result<Timestamp> {
    let secs: i64 = expires_in
        .parse()
        .map_err(|_| CampusError::Auth(format!("invalid token lifetime '{expires_in}'")))?;
    now.checked_add(SignedDuration::from_secs(secs))
        .map_err(|e| CampusError::Auth(format!("invalid token lifetime: {e}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    /// Seconds, sent as a string
    expires_in: String,
}

impl TokenResponse {
    fn into_session(self, now: Timestamp) -> Result<Session> {
        let expires_at = expiry(now, &self.expires_in)?;

        Ok(Session {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|name| !name.is_empty()),
            id_token: SecretString::from(self.id_token),
            refresh_token: SecretString::from(self.refresh_token),
            expires_at,
        })
    }
}

/// Secure token service reply; unlike the account API it uses snake_case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

impl RefreshResponse {
    fn apply(self, session: &Session, now: Timestamp) -> Result<Session> {
        Ok(Session {
            expires_at: expiry(now, &self.expires_in)?,
            id_token: SecretString::from(self.id_token),
            refresh_token: SecretString::from(self.refresh_token),
            ..session.clone()
        })
    }
}

/// `accounts:update` reply. Tokens come back only when the change revoked
/// the old ones (an email change does).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

impl UpdateResponse {
    fn apply(self, session: &Session, now: Timestamp) -> Result<Session> {
        let mut updated = session.clone();
        if let Some(email) = self.email.filter(|e| !e.is_empty()) {
            updated.email = email;
        }
        updated.display_name = self.display_name.filter(|name| !name.is_empty());
        if let Some(token) = self.id_token {
            updated.id_token = SecretString::from(token);
        }
        if let Some(token) = self.refresh_token {
            updated.refresh_token = SecretString::from(token);
        }
        if let Some(expires_in) = self.expires_in {
            updated.expires_at = expiry(now, &expires_in)?;
        }
        Ok(updated)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a provider error code into a message fit for an operator.
///
/// Codes may carry a detail suffix (`WEAK_PASSWORD : Password should be ...`);
/// unknown codes are passed through as-is.
pub fn describe_error(message: &str) -> String {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    let readable = match code {
        "EMAIL_NOT_FOUND" => "No account exists for this email.",
        "INVALID_PASSWORD" => "Incorrect password.",
        "INVALID_LOGIN_CREDENTIALS" => "Invalid email or password.",
        "USER_DISABLED" => "This account has been disabled.",
        "EMAIL_EXISTS" => "An account already exists for this email.",
        "WEAK_PASSWORD" => "Password should be at least 6 characters.",
        "INVALID_EMAIL" => "Invalid email address.",
        "MISSING_PASSWORD" => "Password is required.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Try again later.",
        "OPERATION_NOT_ALLOWED" => "This sign-in method is disabled for the project.",
        "INVALID_IDP_RESPONSE" => "The identity provider rejected the token.",
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
            "The session is no longer valid. Sign in again."
        }
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => "Sign in again before changing your email.",
        _ => return message.to_string(),
    };
    readable.to_string()
}

fn error_from_body(status: StatusCode, body: &str) -> CampusError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => CampusError::Auth(describe_error(&envelope.error.message)),
        Err(_) => CampusError::Auth(format!("identity provider returned {status}")),
    }
}

/// Identity Toolkit REST client
#[derive(Debug, Clone)]
pub struct IdentityToolkit {
    client: Client,
    endpoint: Url,
    token_endpoint: Url,
    api_key: SecretString,
}

/// Parse `endpoint` as a directory so relative joins append to it
fn directory_url(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl IdentityToolkit {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, timeout)
    }

    /// Client against a non-default endpoint (emulators)
    pub fn with_endpoint(endpoint: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: directory_url(endpoint)?,
            token_endpoint: directory_url(DEFAULT_TOKEN_ENDPOINT)?,
            api_key,
        })
    }

    /// Use a non-default secure token service
    pub fn with_token_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.token_endpoint = directory_url(endpoint)?;
        Ok(self)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.require_auth_api_key()?, config.request_timeout())
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        // "./" keeps the colon in `accounts:x` from being read as a scheme
        let mut url = self.endpoint.join(&format!("./accounts:{method}"))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    fn token_url(&self) -> Result<Url> {
        let mut url = self.token_endpoint.join("token")?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T> {
        tracing::debug!(method, "identity provider request");
        self.send(self.client.post(self.method_url(method)?).json(&body))
            .await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &text));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for IdentityToolkit {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session> {
        let response: TokenResponse = self
            .call(
                "signInWithPassword",
                json!({
                    "email": email,
                    "password": password.expose_secret(),
                    "returnSecureToken": true,
                }),
            )
            .await?;
        response.into_session(Timestamp::now())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        display_name: Option<&str>,
    ) -> Result<Session> {
        let response: TokenResponse = self
            .call(
                "signUp",
                json!({
                    "email": email,
                    "password": password.expose_secret(),
                    "returnSecureToken": true,
                }),
            )
            .await?;
        let session = response.into_session(Timestamp::now())?;

        match display_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self.update_profile(&session, Some(name), None).await,
            None => Ok(session),
        }
    }

    async fn sign_in_with_idp(
        &self,
        provider_id: &str,
        id_token: &SecretString,
    ) -> Result<Session> {
        let post_body = format!(
            "id_token={}&providerId={}",
            id_token.expose_secret(),
            provider_id
        );
        let response: TokenResponse = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": post_body,
                    "requestUri": "http://localhost",
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        response.into_session(Timestamp::now())
    }

    async fn refresh(&self, session: &Session) -> Result<Session> {
        tracing::debug!(uid = %session.uid, "refreshing id token");
        let request = self.client.post(self.token_url()?).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", session.refresh_token.expose_secret()),
        ]);
        let response: RefreshResponse = self.send(request).await?;
        response.apply(session, Timestamp::now())
    }

    async fn update_profile(
        &self,
        session: &Session,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Session> {
        let mut body = json!({
            "idToken": session.id_token.expose_secret(),
            "returnSecureToken": true,
        });
        if let Some(name) = display_name {
            body["displayName"] = json!(name);
        }
        if let Some(email) = email {
            body["email"] = json!(email);
        }
        let response: UpdateResponse = self.call("update", body).await?;
        response.apply(session, Timestamp::now())
    }
}
