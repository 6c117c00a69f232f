use crate::types::TokenKind;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid configuration (e.g. backend URL unset).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure, timeout or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{operation} rejected with status {status}")]
    Rejected {
        operation: &'static str,
        status: u16,
        message: Option<String>,
    },

    /// A local precondition failed before any network call.
    #[error("{0} token not found")]
    MissingToken(TokenKind),

    /// A user-scoped call was made with an empty user id.
    #[error("user id is required")]
    MissingUserId,
}

impl Error {
    /// User-facing message for this error.
    ///
    /// Backend messages are passed through verbatim; transport detail never is.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Config(_) => "Service not configured".into(),
            Self::Http(_) => "An unexpected error occurred".into(),
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            Self::Rejected { .. } => fallback.into(),
            Self::MissingToken(kind) => format!("{kind} token not found"),
            Self::MissingUserId => "User id is required".into(),
        }
    }

    /// HTTP status of a rejected call, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
