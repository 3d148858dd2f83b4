//! crates/brigo_client/src/auth.rs
//!
//! Sign-up, sign-in and sign-out against the Brigo API. A successful call
//! updates the shared `Session`.

use brigo_core::domain::AuthUser;
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::http::SESSION_COOKIE;
use crate::session::{Session, SignedIn};

#[derive(Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    user_id: String,
    email: String,
}

#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<Session>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client, session: Arc<Session>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            session,
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<AuthUser> {
        self.authenticate("/auth/signup", email, password).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthUser> {
        self.authenticate("/auth/login", email, password).await
    }

    /// Ends the session on the backend and forgets it locally.
    ///
    /// The local session is cleared even when the backend call fails.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let Some(signed_in) = self.session.sign_out() else {
            return Ok(());
        };

        let response = self
            .http
            .post(format!("{}/auth/logout", self.base_url))
            .header(
                reqwest::header::COOKIE,
                format!("{}={}", SESSION_COOKIE, signed_in.token),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = status.as_u16(), "Backend logout failed");
            return Err(ClientError::Api(format!("logout failed (HTTP {})", status.as_u16())));
        }
        info!(user_id = %signed_in.user.id, "Signed out");
        Ok(())
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<AuthUser> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = body.trim();
            return Err(ClientError::Api(if message.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                format!("{} ({})", message, status.as_u16())
            }));
        }

        let token = session_token(response.headers()).ok_or_else(|| {
            ClientError::Api("response did not include a session cookie".to_string())
        })?;
        let body = response.json::<AuthResponse>().await?;
        let user = AuthUser {
            id: body.user_id,
            email: Some(body.email),
        };

        self.session.sign_in(SignedIn {
            user: user.clone(),
            token,
        });
        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }
}

/// Reads the auth session id from the `Set-Cookie` headers.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            let value = pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('=')?;
            (!value.is_empty()).then(|| value.to_string())
        })
}
