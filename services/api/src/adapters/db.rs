//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `NotebookService` and `AccountService` ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use brigo_core::domain::{
    AuthUser, Material, MaterialInput, NewNotebook, Notebook, NotebookStatus, NotebookUpdate,
    UserCredentials,
};
use brigo_core::ports::{AccountService, NotebookService, PortError, PortResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the notebook and account ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct NotebookRecord {
    id: String,
    title: String,
    flashcard_count: i32,
    progress: f64,
    status: String,
    created_at: DateTime<Utc>,
}
impl NotebookRecord {
    fn to_domain(self, materials: Vec<Material>) -> PortResult<Notebook> {
        let status = self
            .status
            .parse::<NotebookStatus>()
            .map_err(|e| PortError::Unexpected(format!("notebook {}: {}", self.id, e)))?;
        let flashcard_count = u32::try_from(self.flashcard_count).map_err(|_| {
            PortError::Unexpected(format!(
                "notebook {}: invalid flashcard count {}",
                self.id, self.flashcard_count
            ))
        })?;
        Ok(Notebook {
            id: self.id,
            title: self.title,
            flashcard_count,
            progress: self.progress,
            created_at: self.created_at,
            status,
            materials,
        })
    }
}

#[derive(FromRow)]
struct MaterialRecord {
    id: String,
    notebook_id: String,
    kind: String,
    uri: Option<String>,
    filename: Option<String>,
    content: Option<String>,
    created_at: DateTime<Utc>,
}
impl MaterialRecord {
    fn to_domain(self) -> PortResult<Material> {
        let kind = self
            .kind
            .parse()
            .map_err(|e| PortError::Unexpected(format!("material {}: {}", self.id, e)))?;
        Ok(Material {
            id: self.id,
            kind,
            uri: self.uri,
            filename: self.filename,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: String,
    email: String,
    hashed_password: String,
}

const NOTEBOOK_COLUMNS: &str = "id, title, flashcard_count, progress, status, created_at";
const MATERIAL_COLUMNS: &str = "id, notebook_id, kind, uri, filename, content, created_at";

//=========================================================================================
// `NotebookService` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotebookService for DbAdapter {
    async fn fetch_notebooks(&self, user_id: &str) -> PortResult<Vec<Notebook>> {
        let notebooks = sqlx::query_as::<_, NotebookRecord>(&format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let ids: Vec<String> = notebooks.iter().map(|n| n.id.clone()).collect();
        let material_records = sqlx::query_as::<_, MaterialRecord>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE notebook_id = ANY($1) ORDER BY created_at ASC"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut materials_by_notebook: HashMap<String, Vec<Material>> = HashMap::new();
        for record in material_records {
            let notebook_id = record.notebook_id.clone();
            materials_by_notebook
                .entry(notebook_id)
                .or_default()
                .push(record.to_domain()?);
        }

        notebooks
            .into_iter()
            .map(|record| {
                let materials = materials_by_notebook.remove(&record.id).unwrap_or_default();
                record.to_domain(materials)
            })
            .collect()
    }

    async fn delete_notebook(&self, user_id: &str, notebook_id: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM notebooks WHERE id = $1 AND user_id = $2")
            .bind(notebook_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
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
        let flashcard_count = updates
            .flashcard_count
            .map(i32::try_from)
            .transpose()
            .map_err(|e| PortError::Unexpected(format!("flashcard_count out of range: {}", e)))?;

        let result = sqlx::query(
            "UPDATE notebooks SET \
                title = COALESCE($3, title), \
                flashcard_count = COALESCE($4, flashcard_count), \
                progress = COALESCE($5, progress), \
                status = COALESCE($6, status) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(notebook_id)
        .bind(user_id)
        .bind(updates.title.as_deref())
        .bind(flashcard_count)
        .bind(updates.progress)
        .bind(updates.status.map(|status| status.as_str()))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Notebook {} not found", notebook_id)));
        }
        Ok(())
    }

    async fn create_notebook(&self, user_id: &str, notebook: &NewNotebook) -> PortResult<Notebook> {
        let record = sqlx::query_as::<_, NotebookRecord>(&format!(
            "INSERT INTO notebooks (id, user_id, title, status) VALUES ($1, $2, $3, $4) \
             RETURNING {NOTEBOOK_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&notebook.title)
        .bind(NotebookStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain(Vec::new())
    }

    async fn create_material(
        &self,
        user_id: &str,
        notebook_id: &str,
        material: &MaterialInput,
    ) -> PortResult<Material> {
        // The owner check and the insert happen in one statement.
        let record = sqlx::query_as::<_, MaterialRecord>(&format!(
            "INSERT INTO materials (id, notebook_id, kind, uri, filename, content) \
             SELECT $1, $2, $3, $4, $5, $6 \
             WHERE EXISTS (SELECT 1 FROM notebooks WHERE id = $2 AND user_id = $7) \
             RETURNING {MATERIAL_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(notebook_id)
        .bind(material.kind.as_str())
        .bind(material.uri.as_deref())
        .bind(material.filename.as_deref())
        .bind(material.content.as_deref())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Notebook {} not found", notebook_id)))?;

        record.to_domain()
    }
}

//=========================================================================================
// `AccountService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<AuthUser> {
        let user_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3)")
            .bind(&user_id)
            .bind(email)
            .bind(hashed_password)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(AuthUser {
            id: user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;

        Ok(UserCredentials {
            user_id: record.user_id,
            email: record.email,
            hashed_password: record.hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String> {
        let user_id: Option<String> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
