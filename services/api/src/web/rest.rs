//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the notebook REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::port_error_response;
use crate::web::auth::{self, AuthResponse, CredentialsRequest};
use crate::web::state::{AppState, AuthenticatedUser};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use brigo_core::domain::{
    Material, MaterialInput, MaterialKind, NewNotebook, Notebook, NotebookStatus, NotebookUpdate,
};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        list_notebooks_handler,
        create_notebook_handler,
        update_notebook_handler,
        delete_notebook_handler,
        create_material_handler,
    ),
    components(
        schemas(
            CredentialsRequest,
            AuthResponse,
            Notebook,
            NotebookStatus,
            NotebookUpdate,
            NewNotebook,
            Material,
            MaterialInput,
            MaterialKind,
        )
    ),
    tags(
        (name = "Brigo API", description = "Notebooks and study materials.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the signed-in user's notebooks, newest first.
#[utoipa::path(
    get,
    path = "/notebooks",
    responses(
        (status = 200, description = "The user's notebooks", body = [Notebook]),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_notebooks_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Notebook>>, (StatusCode, String)> {
    state
        .notebooks
        .fetch_notebooks(&user_id)
        .await
        .map(Json)
        .map_err(|e| port_error_response("Failed to load notebooks", e))
}

/// Create an empty notebook.
#[utoipa::path(
    post,
    path = "/notebooks",
    request_body = NewNotebook,
    responses(
        (status = 201, description = "Notebook created", body = Notebook),
        (status = 400, description = "Missing title"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(mut req): Json<NewNotebook>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title must not be empty".to_string()));
    }

    let notebook = state
        .notebooks
        .create_notebook(&user_id, &req)
        .await
        .map_err(|e| port_error_response("Failed to create notebook", e))?;

    info!(user_id = %user_id, notebook_id = %notebook.id, "Notebook created");
    Ok((StatusCode::CREATED, Json(notebook)))
}

/// Update some of a notebook's fields.
#[utoipa::path(
    patch,
    path = "/notebooks/{id}",
    request_body = NotebookUpdate,
    params(("id" = String, Path, description = "Notebook id")),
    responses(
        (status = 204, description = "Notebook updated"),
        (status = 400, description = "Empty or invalid update"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such notebook"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(notebook_id): Path<String>,
    Json(updates): Json<NotebookUpdate>,
) -> Result<StatusCode, (StatusCode, String)> {
    if updates.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "update has no fields".to_string()));
    }
    if updates.progress.is_some_and(|p| !(0.0..=100.0).contains(&p)) {
        return Err((StatusCode::BAD_REQUEST, "progress must be between 0 and 100".to_string()));
    }

    state
        .notebooks
        .update_notebook(&user_id, &notebook_id, &updates)
        .await
        .map_err(|e| port_error_response("Failed to update notebook", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a notebook and its materials.
#[utoipa::path(
    delete,
    path = "/notebooks/{id}",
    params(("id" = String, Path, description = "Notebook id")),
    responses(
        (status = 204, description = "Notebook deleted"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such notebook"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(notebook_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .notebooks
        .delete_notebook(&user_id, &notebook_id)
        .await
        .map_err(|e| port_error_response("Failed to delete notebook", e))?;

    info!(user_id = %user_id, notebook_id = %notebook_id, "Notebook deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a material to a notebook.
#[utoipa::path(
    post,
    path = "/notebooks/{id}/materials",
    request_body = MaterialInput,
    params(("id" = String, Path, description = "Notebook id")),
    responses(
        (status = 201, description = "Material stored", body = Material),
        (status = 400, description = "Material has no payload"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such notebook"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_material_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(notebook_id): Path<String>,
    Json(input): Json<MaterialInput>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if input.uri.is_none() && input.content.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            "material needs a uri or content".to_string(),
        ));
    }

    let material = state
        .notebooks
        .create_material(&user_id, &notebook_id, &input)
        .await
        .map_err(|e| port_error_response("Failed to store material", e))?;
    Ok((StatusCode::CREATED, Json(material)))
}
