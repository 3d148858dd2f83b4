//! crates/brigo_client/src/lib.rs
//!
//! The app-side half of Brigo: talks to the API over HTTP and keeps the
//! notebook store in sync with it.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

use brigo_core::domain::{AuthUser, Material, MaterialInput};
use brigo_core::ports::NotebookService;
use brigo_core::store::NotebookStore;
use std::sync::Arc;
use tracing::warn;

pub use auth::AuthClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use http::HttpNotebookService;
pub use session::{Session, SignedIn};

/// Everything one running app needs: the session, the API adapters and the
/// notebook store wired to them.
pub struct BrigoClient {
    session: Arc<Session>,
    auth: AuthClient,
    notebooks: Arc<HttpNotebookService>,
    store: NotebookStore,
}

impl BrigoClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let session = Arc::new(Session::new());
        let auth = AuthClient::new(&config.api_url, http.clone(), session.clone());
        let notebooks = Arc::new(HttpNotebookService::new(
            &config.api_url,
            http,
            session.clone(),
        ));
        let store = NotebookStore::new(notebooks.clone(), session.clone())
            .with_retry_policy(config.load_retry.clone());

        Ok(Self {
            session,
            auth,
            notebooks,
            store,
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn store(&self) -> &NotebookStore {
        &self.store
    }

    pub fn notebook_service(&self) -> &HttpNotebookService {
        &self.notebooks
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<AuthUser> {
        self.auth.sign_up(email, password).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthUser> {
        self.auth.sign_in(email, password).await
    }

    /// Signs out and clears the notebook list.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let result = self.auth.sign_out().await;
        self.store.reset();
        result
    }

    /// Adds a material to a notebook: shown immediately, then persisted.
    ///
    /// If the backend rejects it the optimistic copy is removed again. On
    /// success the optimistic copy stays until the next load replaces it with
    /// the stored one, which is returned here.
    pub async fn attach_material(
        &self,
        notebook_id: &str,
        input: MaterialInput,
    ) -> ClientResult<Material> {
        let user_id = self
            .session
            .current()
            .map(|signed_in| signed_in.user.id)
            .ok_or(ClientError::NotSignedIn)?;

        let optimistic = self.store.add_material(notebook_id, input.clone());

        match self
            .notebooks
            .create_material(&user_id, notebook_id, &input)
            .await
        {
            Ok(stored) => Ok(stored),
            Err(e) => {
                warn!(notebook_id, "Failed to store material, rolling back: {}", e);
                if let Some(material) = optimistic {
                    self.store.delete_material(notebook_id, &material.id);
                }
                Err(e.into())
            }
        }
    }
}
