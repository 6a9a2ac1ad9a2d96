//! Session lifecycle: restore, login, register, logout.
//!
//! [`SessionManager`] owns the current [`Session`] and the [`TokenStore`]
//! that persists its token. It is the only component that moves the
//! client between the auth and dashboard screens:
//!
//! ```text
//!                login ok / restore ok
//!  ┌──────────────┐ ───────────────────▶ ┌───────────────┐
//!  │Unauthenticated│                      │ Authenticated │
//!  └──────────────┘ ◀─────────────────── └───────────────┘
//!         logout / failed login / failed restore
//! ```
//!
//! A 401 from any other endpoint does not log the user out; only a failed
//! profile fetch during [`SessionManager::restore`] or login does.

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::notify::Notifier;
use crate::store::TokenStore;
use support_desk_core::models::Registration;
use support_desk_core::notification::{self, Notification};
use support_desk_core::{DeskError, Result, Screen, Session};

pub struct SessionManager {
    session: Session,
    store: Box<dyn TokenStore>,
}

impl SessionManager {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            session: Session::anonymous(),
            store,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.session.screen()
    }

    /// Validate a previously stored token by fetching the profile.
    ///
    /// Called once at startup. Any failure (no token, unreadable store,
    /// rejected token, unreachable server) leaves the client logged out and
    /// the stored token removed.
    pub async fn restore(&mut self, api: &ApiClient) -> Option<&Session> {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.session.clear();
                return None;
            }
            Err(e) => {
                warn!(error = %e, "could not read stored session");
                self.forget();
                return None;
            }
        };

        match api.me(&token).await {
            Ok(user) => {
                info!(username = %user.username, role = %user.role, "session restored");
                self.session = Session::authenticated(token, user);
                Some(&self.session)
            }
            Err(e) => {
                info!(error = %e, "stored token rejected; logging out");
                self.forget();
                None
            }
        }
    }

    /// Exchange credentials for a token, fetch the profile, and persist the
    /// token. On failure the client is left logged out.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        username: &str,
        password: &str,
        notifier: &dyn Notifier,
    ) -> Result<&Session> {
        match self.authenticate(api, username, password).await {
            Ok(session) => {
                if let Err(e) = self.store.save(session.token().unwrap_or_default()) {
                    warn!(error = %e, "could not persist session token");
                    notifier.notify(Notification::warning(format!(
                        "Logged in, but the session will not be remembered: {}",
                        e.message()
                    )));
                }
                self.session = session;
                notifier.notify(Notification::success(notification::LOGIN_SUCCESS));
                Ok(&self.session)
            }
            Err(e) => {
                self.forget();
                notifier.notify(Notification::failure("Login failed", &e.message()));
                Err(e)
            }
        }
    }

    async fn authenticate(&self, api: &ApiClient, username: &str, password: &str) -> Result<Session> {
        let token = api
            .login(username, password)
            .await
            .map_err(as_auth_error)?
            .access_token;
        let user = api.me(&token).await.map_err(as_auth_error)?;
        info!(username = %user.username, role = %user.role, "logged in");
        Ok(Session::authenticated(token, user))
    }

    /// Create an account. Rejections come back as [`DeskError::Validation`]
    /// for the caller to show next to the form.
    pub async fn register(
        &self,
        api: &ApiClient,
        registration: &Registration,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        api.register(registration).await.map_err(|e| match e.status() {
            Some(status) if (400..500).contains(&status) => DeskError::Validation(e.message()),
            _ => e,
        })?;
        notifier.notify(Notification::success(notification::REGISTER_SUCCESS));
        Ok(())
    }

    /// Register, then log in with the same credentials.
    pub async fn register_and_login(
        &mut self,
        api: &ApiClient,
        registration: &Registration,
        notifier: &dyn Notifier,
    ) -> Result<&Session> {
        self.register(api, registration, notifier).await?;
        self.login(api, &registration.username, &registration.password, notifier)
            .await
    }

    /// Drop the session and the stored token.
    pub fn logout(&mut self, notifier: &dyn Notifier) {
        self.forget();
        notifier.notify(Notification::success(notification::LOGOUT_SUCCESS));
    }

    fn forget(&mut self) {
        self.session.clear();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear stored session");
        }
    }
}

/// Credential and token rejections become [`DeskError::Auth`]; transport
/// and server failures stay as they are.
fn as_auth_error(err: DeskError) -> DeskError {
    match err.status() {
        Some(400) | Some(401) | Some(403) => DeskError::Auth(err.message()),
        _ => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_rejections_become_auth_errors() {
        let err = as_auth_error(DeskError::api(Some(401), "Incorrect username or password"));
        assert_eq!(err, DeskError::Auth("Incorrect username or password".into()));

        let server = as_auth_error(DeskError::api(Some(500), "boom"));
        assert_eq!(server.status(), Some(500));

        let transport = as_auth_error(DeskError::api(None, "connection refused"));
        assert!(matches!(transport, DeskError::Api { status: None, .. }));
    }
}
