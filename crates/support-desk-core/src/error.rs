//! Error type shared by the core and the application crate.

use thiserror::Error;

/// Message used when the server's error body carries no `detail`.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Every failure a Support Desk operation can report.
///
/// None of these are fatal: controllers turn them into notifications and
/// leave the last good view in place.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeskError {
    /// Bad credentials or an expired/invalid token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Input rejected, either locally or by the server.
    #[error("{0}")]
    Validation(String),

    /// Transport or server failure. `status` is `None` when no HTTP
    /// response was received at all.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// An AI response was requested with no ticket open.
    #[error("no ticket is currently open")]
    NoCurrentTicket,

    /// The local token store could not be read or written.
    #[error("session storage error: {0}")]
    Storage(String),
}

impl DeskError {
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        DeskError::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status attached to the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeskError::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The bare message, without the variant prefix added by `Display`.
    pub fn message(&self) -> String {
        match self {
            DeskError::Auth(m) | DeskError::Validation(m) | DeskError::Storage(m) => m.clone(),
            DeskError::Api { message, .. } => message.clone(),
            DeskError::NoCurrentTicket => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
