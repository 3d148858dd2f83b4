//! crates/brigo_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture: the notebook
//! store only talks to a `NotebookService` and an `IdentityProvider`, whether
//! they are backed by HTTP, PostgreSQL or an in-memory map.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AuthUser, Material, MaterialInput, NewNotebook, Notebook, NotebookUpdate, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote notebook service. An `Err` from any method means nothing was persisted.
#[async_trait]
pub trait NotebookService: Send + Sync {
    /// Lists the user's notebooks, newest first, each with its materials oldest first.
    async fn fetch_notebooks(&self, user_id: &str) -> PortResult<Vec<Notebook>>;

    async fn delete_notebook(&self, user_id: &str, notebook_id: &str) -> PortResult<()>;

    async fn update_notebook(
        &self,
        user_id: &str,
        notebook_id: &str,
        updates: &NotebookUpdate,
    ) -> PortResult<()>;

    async fn create_notebook(&self, user_id: &str, notebook: &NewNotebook) -> PortResult<Notebook>;

    /// Persists a material. The backend assigns its own id.
    async fn create_material(
        &self,
        user_id: &str,
        notebook_id: &str,
        material: &MaterialInput,
    ) -> PortResult<Material>;
}

/// Who is signed in right now. Read at the moment it is needed, never cached.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthUser>;

    fn current_user_id(&self) -> Option<String> {
        self.current_user().map(|user| user.id)
    }
}

impl<F> IdentityProvider for F
where
    F: Fn() -> Option<AuthUser> + Send + Sync,
{
    fn current_user(&self) -> Option<AuthUser> {
        self()
    }
}

/// User accounts and login sessions, used by the backend only.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str)
        -> PortResult<AuthUser>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the id of the session's user if the session exists and hasn't expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}
