//! Transient user-visible notifications.

use serde::Serialize;

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGOUT_SUCCESS: &str = "Logged out successfully";
pub const REGISTER_SUCCESS: &str = "Registration successful! Please log in.";
pub const TICKET_CREATED: &str = "Ticket created successfully!";
pub const LOAD_TICKETS_FAILED: &str = "Failed to load tickets";
pub const LOAD_TICKET_FAILED: &str = "Failed to load ticket details";
pub const GENERATE_SUCCESS: &str = "AI response generated successfully!";
pub const GENERATE_FAILED: &str = "Failed to generate AI response";
pub const ESCALATION_WARNING: &str =
    "Low confidence response. Consider escalating this ticket to a human agent.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    /// `"<context>: <detail>"`, the shape used for failed requests.
    pub fn failure(context: &str, detail: &str) -> Self {
        Self::error(format!("{}: {}", context, detail))
    }
}
