use thiserror::Error;

/// Why a list operation did not happen.
///
/// By the time a caller sees one of these, the user has already been told
/// through the notifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// A field failed validation; carries the first message
    #[error("validation failed: {0}")]
    Validation(String),

    /// The remote store rejected or failed the call
    #[error("remote store error: {0}")]
    Remote(String),

    /// Mutation attempted on a locally fabricated placeholder row
    #[error("'{0}' is a placeholder row and cannot be changed")]
    PlaceholderGuard(String),
}
