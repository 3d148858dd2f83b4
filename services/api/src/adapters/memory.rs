//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the notebook and account ports. Used when no
//! `DATABASE_URL` is configured, and by the integration tests.

use async_trait::async_trait;
use brigo_core::domain::{
    AuthUser, Material, MaterialInput, NewNotebook, Notebook, NotebookStatus, NotebookUpdate,
    UserCredentials,
};
use brigo_core::ports::{AccountService, NotebookService, PortError, PortResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    /// Notebook rows in insertion order, keyed by owner.
    notebooks: Vec<(String, Notebook)>,
    users: HashMap<String, UserCredentials>,
    sessions: HashMap<String, (String, DateTime<Utc>)>,
}

impl Tables {
    fn owned_mut(&mut self, user_id: &str, notebook_id: &str) -> PortResult<&mut Notebook> {
        self.notebooks
            .iter_mut()
            .find(|(owner, notebook)| owner == user_id && notebook.id == notebook_id)
            .map(|(_, notebook)| notebook)
            .ok_or_else(|| PortError::NotFound(format!("Notebook {} not found", notebook_id)))
    }
}

/// Keeps every table in a single lock.
#[derive(Default)]
pub struct MemoryAdapter {
    tables: RwLock<Tables>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotebookService for MemoryAdapter {
    async fn fetch_notebooks(&self, user_id: &str) -> PortResult<Vec<Notebook>> {
        let tables = self.tables.read().await;
        // Newest first; rows are stored oldest first.
        Ok(tables
            .notebooks
            .iter()
            .rev()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, notebook)| notebook.clone())
            .collect())
    }

    async fn delete_notebook(&self, user_id: &str, notebook_id: &str) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.notebooks.len();
        tables
            .notebooks
            .retain(|(owner, notebook)| !(owner == user_id && notebook.id == notebook_id));

        if tables.notebooks.len() == before {
            return Err(PortError::NotFound(format!("Notebook {} not found", notebook_id)));
        }
        Ok(())
    }

    async fn update_notebook(
        &self,
        user_id: &str,
        notebook_id: &str,
        updates: &NotebookUpdate,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.owned_mut(user_id, notebook_id)?.apply(updates);
        Ok(())
    }

    async fn create_notebook(&self, user_id: &str, notebook: &NewNotebook) -> PortResult<Notebook> {
        let created = Notebook {
            id: Uuid::new_v4().to_string(),
            title: notebook.title.clone(),
            flashcard_count: 0,
            progress: 0.0,
            created_at: Utc::now(),
            status: NotebookStatus::Pending,
            materials: Vec::new(),
        };
        self.tables
            .write()
            .await
            .notebooks
            .push((user_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn create_material(
        &self,
        user_id: &str,
        notebook_id: &str,
        material: &MaterialInput,
    ) -> PortResult<Material> {
        let mut tables = self.tables.write().await;
        let notebook = tables.owned_mut(user_id, notebook_id)?;
        let created = Material {
            id: Uuid::new_v4().to_string(),
            kind: material.kind,
            uri: material.uri.clone(),
            filename: material.filename.clone(),
            content: material.content.clone(),
            created_at: Utc::now(),
        };
        notebook.materials.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl AccountService for MemoryAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<AuthUser> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(email) {
            return Err(PortError::Unexpected(format!("email {} is already registered", email)));
        }

        let user_id = Uuid::new_v4().to_string();
        tables.users.insert(
            email.to_string(),
            UserCredentials {
                user_id: user_id.clone(),
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(AuthUser {
            id: user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.tables
            .read()
            .await
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables
            .write()
            .await
            .sessions
            .insert(session_id.to_string(), (user_id.to_string(), expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String> {
        match self.tables.read().await.sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(user_id.clone()),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.write().await.sessions.remove(session_id);
        Ok(())
    }
}
