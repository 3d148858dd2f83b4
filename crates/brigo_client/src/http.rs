//! crates/brigo_client/src/http.rs
//!
//! An adapter that implements the `NotebookService` port against the Brigo REST API.

use async_trait::async_trait;
use brigo_core::domain::{Material, MaterialInput, NewNotebook, Notebook, NotebookUpdate};
use brigo_core::ports::{NotebookService, PortError, PortResult};
use reqwest::{header, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::session::Session;

/// Name of the cookie the backend reads the auth session from.
pub(crate) const SESSION_COOKIE: &str = "session";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct HttpNotebookService {
    base_url: String,
    http: reqwest::Client,
    session: Arc<Session>,
}

impl HttpNotebookService {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client, session: Arc<Session>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the session cookie, provided the session belongs to `user_id`.
    fn authorize(&self, user_id: &str, request: RequestBuilder) -> PortResult<RequestBuilder> {
        match self.session.current() {
            Some(signed_in) if signed_in.user.id == user_id => Ok(request.header(
                header::COOKIE,
                format!("{}={}", SESSION_COOKIE, signed_in.token),
            )),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn send(&self, user_id: &str, request: RequestBuilder) -> PortResult<Response> {
        let response = self
            .authorize(user_id, request)?
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Notebook request failed: {}", body);
        Err(error_for_status(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        user_id: &str,
        request: RequestBuilder,
    ) -> PortResult<T> {
        self.send(user_id, request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("invalid response body: {}", e)))
    }
}

/// Maps an error status from the API to a port error.
pub(crate) fn error_for_status(status: StatusCode, body: &str) -> PortError {
    let message = body.trim();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(message.to_string()),
        _ if message.is_empty() => PortError::Unexpected(format!("HTTP {}", status.as_u16())),
        _ => PortError::Unexpected(format!("{} ({})", message, status.as_u16())),
    }
}

//=========================================================================================
// `NotebookService` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotebookService for HttpNotebookService {
    async fn fetch_notebooks(&self, user_id: &str) -> PortResult<Vec<Notebook>> {
        self.send_json(user_id, self.http.get(self.url("/notebooks")))
            .await
    }

    async fn delete_notebook(&self, user_id: &str, notebook_id: &str) -> PortResult<()> {
        let url = self.url(&format!("/notebooks/{}", notebook_id));
        self.send(user_id, self.http.delete(url)).await?;
        Ok(())
    }

    async fn update_notebook(
        &self,
        user_id: &str,
        notebook_id: &str,
        updates: &NotebookUpdate,
    ) -> PortResult<()> {
        let url = self.url(&format!("/notebooks/{}", notebook_id));
        self.send(user_id, self.http.patch(url).json(updates)).await?;
        Ok(())
    }

    async fn create_notebook(&self, user_id: &str, notebook: &NewNotebook) -> PortResult<Notebook> {
        let request = self.http.post(self.url("/notebooks")).json(notebook);
        self.send_json(user_id, request).await
    }

    async fn create_material(
        &self,
        user_id: &str,
        notebook_id: &str,
        material: &MaterialInput,
    ) -> PortResult<Material> {
        let url = self.url(&format!("/notebooks/{}/materials", notebook_id));
        self.send_json(user_id, self.http.post(url).json(material))
            .await
    }
}
