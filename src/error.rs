use thiserror::Error;

use crate::controller::ListError;
use crate::store::StoreApiError;

#[derive(Error, Debug)]
pub enum CampusError {
    #[error("{0} '{1}' not found")]
    RecordNotFound(&'static str, String),

    #[error("unknown field '{0}' for {1}")]
    UnknownField(String, &'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("not signed in; run `campus auth login` first")]
    NotSignedIn,

    #[error("session expired; run `campus auth login` again")]
    SessionExpired,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Store(#[from] StoreApiError),

    #[error("{0}")]
    List(#[from] ListError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CampusError>;
