use std::time::{Duration, SystemTime};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::CatalogSettings;
use crate::http::{build_client, endpoint};

use super::context::{AdminSession, AdminUser, AuthBackend, SessionError};

/// Password sign-in against the project's GoTrue endpoints.
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub user: TokenUser,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl TokenResponse {
    pub(super) fn into_session(self, requested_email: &str, now: SystemTime) -> AdminSession {
        AdminSession {
            user: AdminUser {
                id: self.user.id,
                email: self.user.email.unwrap_or_else(|| requested_email.to_string()),
            },
            access_token: self.access_token,
            expires_at: now + Duration::from_secs(self.expires_in),
        }
    }
}

impl SupabaseAuth {
    pub fn new(settings: &CatalogSettings) -> Result<Self, SessionError> {
        if settings.base_url.trim().is_empty() {
            return Err(SessionError::NotConfigured);
        }
        Ok(Self {
            client: build_client(Some(Duration::from_secs(settings.timeout_secs)))?,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

impl AuthBackend for SupabaseAuth {
    fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, SessionError> {
        let resp = self
            .client
            .post(endpoint(&self.base_url, "/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&PasswordGrant { email, password })
            .send()?;

        let status = resp.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(SessionError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(SessionError::Status {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }

        let token: TokenResponse = resp.json()?;
        Ok(token.into_session(email, SystemTime::now()))
    }

    fn sign_out(&self, access_token: &str) -> Result<(), SessionError> {
        let resp = self
            .client
            .post(endpoint(&self.base_url, "/auth/v1/logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SessionError::Status {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}
