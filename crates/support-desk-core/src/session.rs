//! Session value and the auth/dashboard screen state machine.
//!
//! A [`Session`] is either anonymous or carries both a bearer token and the
//! profile fetched with it. There is no half-authenticated state: a token
//! whose profile could not be fetched is discarded.

use crate::models::{Role, User};

/// Which top-level screen is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Login/registration forms.
    Auth,
    /// Ticket list, detail and AI response.
    Dashboard,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    auth: Option<(String, User)>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { auth: None }
    }

    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        Self {
            auth: Some((token.into(), user)),
        }
    }

    /// Bearer token to attach to requests, if any.
    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|(token, _)| token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.as_ref().map(|(_, user)| user)
    }

    pub fn role(&self) -> Option<&Role> {
        self.user().map(|u| &u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn screen(&self) -> Screen {
        if self.is_authenticated() {
            Screen::Dashboard
        } else {
            Screen::Auth
        }
    }

    pub fn can_generate_responses(&self) -> bool {
        self.role().is_some_and(Role::can_generate_responses)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role(), Some(Role::Admin))
    }

    /// Drop the token and profile, returning to the auth screen.
    pub fn clear(&mut self) {
        self.auth = None;
    }
}
