//! crates/brigo_core/src/store.rs
//!
//! The notebook store: the app's in-memory list of notebooks, how it is
//! loaded from the `NotebookService`, and the mutations the UI applies to it.
//!
//! Two kinds of mutation live here and are kept apart on purpose:
//! local-only mutations (`add_material`, `delete_material`) apply immediately
//! and never fail, while confirm-then-apply mutations (`update_notebook`,
//! `delete_notebook`, `create_notebook`) only touch local state after the
//! remote call succeeded.
//!
//! Loads are not cancellable and are not merged with edits made while they
//! are in flight: whichever `set_notebooks` lands last wins. Callers should
//! not start a second load while one is running.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Material, MaterialInput, NewNotebook, Notebook, NotebookUpdate};
use crate::ports::{IdentityProvider, NotebookService, PortResult};
use crate::retry::{with_retry, RetryPolicy};

//=========================================================================================
// State
//=========================================================================================

/// Where the last `load_notebooks` call got to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Default)]
struct NotebookState {
    notebooks: Vec<Notebook>,
    synced_at: Option<DateTime<Utc>>,
    synced_user_id: Option<String>,
    load_state: LoadState,
}

/// Shared notebook state for one running app.
///
/// All state sits behind a single mutex which is never held across an `.await`.
pub struct NotebookStore {
    service: Arc<dyn NotebookService>,
    identity: Arc<dyn IdentityProvider>,
    retry: RetryPolicy,
    state: Mutex<NotebookState>,
}

impl NotebookStore {
    pub fn new(service: Arc<dyn NotebookService>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            service,
            identity,
            retry: RetryPolicy::default(),
            state: Mutex::new(NotebookState::default()),
        }
    }

    /// Overrides the retry policy used by `load_notebooks`.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn state(&self) -> MutexGuard<'_, NotebookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    //=====================================================================================
    // Accessors
    //=====================================================================================

    pub fn notebooks(&self) -> Vec<Notebook> {
        self.state().notebooks.clone()
    }

    pub fn notebook(&self, notebook_id: &str) -> Option<Notebook> {
        self.state()
            .notebooks
            .iter()
            .find(|notebook| notebook.id == notebook_id)
            .cloned()
    }

    /// When the list was last loaded successfully.
    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.state().synced_at
    }

    /// The user the current list was loaded for.
    pub fn synced_user_id(&self) -> Option<String> {
        self.state().synced_user_id.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.state().load_state
    }

    //=====================================================================================
    // Loading
    //=====================================================================================

    /// Replaces the whole notebook list.
    pub fn set_notebooks(&self, notebooks: Vec<Notebook>) {
        self.state().notebooks = notebooks;
    }

    /// Loads the notebooks of `user_id`, or of the signed-in user when `None`.
    ///
    /// Without any user the list is emptied and the service isn't called.
    /// Fetch failures are retried; once retries run out the list is emptied,
    /// the previous sync stamps are kept, and the last error is returned.
    pub async fn load_notebooks(&self, user_id: Option<&str>) -> PortResult<()> {
        let Some(user_id) = user_id
            .map(str::to_string)
            .or_else(|| self.identity.current_user_id())
        else {
            debug!("No user to load notebooks for, clearing list");
            self.set_notebooks(Vec::new());
            return Ok(());
        };

        self.state().load_state = LoadState::Loading;
        debug!(user_id = %user_id, "Loading notebooks");

        let service = &self.service;
        let result = with_retry(&self.retry, |_| service.fetch_notebooks(&user_id)).await;

        match result {
            Ok(notebooks) => {
                debug!(user_id = %user_id, count = notebooks.len(), "Notebooks loaded");
                let mut state = self.state();
                state.notebooks = notebooks;
                state.synced_at = Some(Utc::now());
                state.synced_user_id = Some(user_id);
                state.load_state = LoadState::Loaded;
                Ok(())
            }
            Err(error) => {
                warn!(user_id = %user_id, "Giving up loading notebooks: {}", error);
                let mut state = self.state();
                state.notebooks = Vec::new();
                state.load_state = LoadState::Failed;
                Err(error)
            }
        }
    }

    /// Forgets every notebook and the sync stamps, e.g. after signing out.
    pub fn reset(&self) {
        *self.state() = NotebookState::default();
    }

    //=====================================================================================
    // Local-only mutations
    //=====================================================================================

    fn apply_local<R>(
        &self,
        notebook_id: &str,
        mutation: impl FnOnce(&mut Notebook) -> R,
    ) -> Option<R> {
        let mut state = self.state();
        let notebook = state
            .notebooks
            .iter_mut()
            .find(|notebook| notebook.id == notebook_id)?;
        Some(mutation(notebook))
    }

    /// Appends a new material to a notebook right away.
    ///
    /// Nothing is sent to the backend: callers persist the material separately
    /// through `NotebookService::create_material`. Unknown notebooks are ignored.
    pub fn add_material(&self, notebook_id: &str, input: MaterialInput) -> Option<Material> {
        let material = Material::local(input);
        let added = self.apply_local(notebook_id, |notebook| {
            notebook.materials.push(material.clone());
        });
        if added.is_none() {
            debug!(notebook_id, "Ignoring material for unknown notebook");
        }
        added.map(|()| material)
    }

    /// Removes a material from a notebook. Unknown notebooks or materials are ignored.
    pub fn delete_material(&self, notebook_id: &str, material_id: &str) {
        self.apply_local(notebook_id, |notebook| {
            notebook.materials.retain(|material| material.id != material_id);
        });
    }

    //=====================================================================================
    // Confirm-then-apply mutations
    //=====================================================================================

    /// The signed-in user's id. Remote mutations are skipped without one.
    fn owner(&self, operation: &str) -> Option<String> {
        let owner = self.identity.current_user_id();
        if owner.is_none() {
            debug!(operation, "No signed-in user, skipping");
        }
        owner
    }

    /// Deletes a notebook on the backend, then locally.
    ///
    /// Does nothing without a signed-in user. If the backend call fails the
    /// notebook stays in the list.
    pub async fn delete_notebook(&self, notebook_id: &str) -> PortResult<()> {
        let Some(user_id) = self.owner("delete_notebook") else {
            return Ok(());
        };

        self.service.delete_notebook(&user_id, notebook_id).await?;

        self.state()
            .notebooks
            .retain(|notebook| notebook.id != notebook_id);
        Ok(())
    }

    /// Updates a notebook on the backend, then merges `updates` locally.
    ///
    /// Does nothing without a signed-in user. Local state is untouched if the
    /// backend call fails.
    pub async fn update_notebook(
        &self,
        notebook_id: &str,
        updates: NotebookUpdate,
    ) -> PortResult<()> {
        let Some(user_id) = self.owner("update_notebook") else {
            return Ok(());
        };

        self.service
            .update_notebook(&user_id, notebook_id, &updates)
            .await?;

        self.apply_local(notebook_id, |notebook| notebook.apply(&updates));
        Ok(())
    }

    /// Creates a notebook on the backend and puts it at the top of the list.
    ///
    /// Returns `Ok(None)` without a signed-in user.
    pub async fn create_notebook(&self, notebook: NewNotebook) -> PortResult<Option<Notebook>> {
        let Some(user_id) = self.owner("create_notebook") else {
            return Ok(None);
        };

        let created = self.service.create_notebook(&user_id, &notebook).await?;

        self.state().notebooks.insert(0, created.clone());
        Ok(Some(created))
    }
}
