//! Error type for table service failures.

use std::fmt;

use serde::Deserialize;

/// Failure reported by (or while talking to) the table service.
///
/// Keeps the HTTP status, when there was one, so callers can tell transient
/// server trouble from rejected requests.
#[derive(Debug, Clone)]
pub struct StoreApiError {
    /// HTTP status code, if available
    pub status: Option<reqwest::StatusCode>,
    /// Human-readable error message
    pub message: String,
    /// Table the request targeted
    pub table: String,
}

impl StoreApiError {
    pub fn new(message: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            table: table.into(),
        }
    }

    pub fn with_status(
        message: impl Into<String>,
        table: impl Into<String>,
        status: reqwest::StatusCode,
    ) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            table: table.into(),
        }
    }

    /// Build an error from a non-success response body.
    ///
    /// PostgREST answers with `{"message", "code", "details", "hint"}`; any
    /// other body is used verbatim.
    pub fn from_response_body(status: reqwest::StatusCode, body: &str, table: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.describe(),
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            Err(_) => body.trim().to_string(),
        };
        Self::with_status(message, table, status)
    }

    pub fn is_transient(&self) -> bool {
        self.status.is_some_and(|s| s.is_server_error())
    }
}

impl fmt::Display for StoreApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "table '{}' error ({}): {}",
                self.table,
                status.as_u16(),
                self.message
            ),
            None => write!(f, "table '{}' error: {}", self.table, self.message),
        }
    }
}

impl std::error::Error for StoreApiError {}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl ErrorBody {
    fn describe(&self) -> String {
        let mut message = self
            .message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        if let Some(code) = &self.code {
            message.push_str(&format!(" [{code}]"));
        }
        if let Some(details) = &self.details {
            message.push_str(&format!("\n\nDetails: {details}"));
        }
        if let Some(hint) = &self.hint {
            message.push_str(&format!("\nHint: {hint}"));
        }
        message
    }
}
