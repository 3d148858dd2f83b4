//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use brigo_core::ports::{AccountService, NotebookService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub notebooks: Arc<dyn NotebookService>,
    pub accounts: Arc<dyn AccountService>,
    pub config: Arc<Config>,
}

/// The user a request was authenticated as, inserted by `require_auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);
