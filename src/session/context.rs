use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use log::{info, warn};
use thiserror::Error;

/// Authenticated admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
}

/// A signed-in admin session as issued by the auth service.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user: AdminUser,
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl AdminSession {
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("auth service is not configured")]
    NotConfigured,
    #[error("auth request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("auth service returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// The hosted auth service, seen from the client.
pub trait AuthBackend {
    fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, SessionError>;
    fn sign_out(&self, access_token: &str) -> Result<(), SessionError>;
}

/// Holder of the (at most one) active admin session.
///
/// Cloning yields another handle onto the same session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<AdminSession>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign in and replace any previous session.
    pub fn login(
        &self,
        backend: &dyn AuthBackend,
        email: &str,
        password: &str,
    ) -> Result<AdminUser, SessionError> {
        let session = backend.sign_in(email, password)?;
        let user = session.user.clone();
        info!("admin session started for {}", user.email);
        if let Ok(mut slot) = self.inner.write() {
            *slot = Some(session);
        }
        Ok(user)
    }

    /// Clear the local session and revoke it remotely.
    ///
    /// The local session is gone even if the backend call fails.
    pub fn logout(&self, backend: &dyn AuthBackend) {
        let taken = self.inner.write().ok().and_then(|mut slot| slot.take());
        let Some(session) = taken else {
            return;
        };
        if let Err(e) = backend.sign_out(&session.access_token) {
            warn!("admin sign-out failed for {}: {e}", session.user.email);
        }
        info!("admin session ended for {}", session.user.email);
    }

    /// Return the session if it is still valid at `now`; an expired session is dropped.
    pub fn active(&self, now: SystemTime) -> Option<AdminSession> {
        let expired = {
            let slot = self.inner.read().ok()?;
            match slot.as_ref() {
                Some(s) if !s.is_expired(now) => return Some(s.clone()),
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            if let Ok(mut slot) = self.inner.write() {
                if slot.as_ref().is_some_and(|s| s.is_expired(now)) {
                    if let Some(s) = slot.take() {
                        info!("admin session for {} expired", s.user.email);
                    }
                }
            }
        }
        None
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.active(SystemTime::now()).map(|s| s.access_token)
    }

    pub fn is_logged_in(&self) -> bool {
        self.active(SystemTime::now()).is_some()
    }
}
