//! crates/brigo_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs carry no knowledge of the database or of the HTTP layer;
//! serde is only used so every adapter shares one wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix of every material id generated on the device.
pub const LOCAL_MATERIAL_ID_PREFIX: &str = "material-";

//=========================================================================================
// Notebooks
//=========================================================================================

/// A user's study collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Notebook {
    pub id: String,
    pub title: String,
    pub flashcard_count: u32,
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub status: NotebookStatus,
    /// Display order: oldest first.
    #[serde(default)]
    pub materials: Vec<Material>,
}

impl Notebook {
    /// Applies `updates` as a shallow merge. Only provided fields change.
    pub fn apply(&mut self, updates: &NotebookUpdate) {
        if let Some(title) = &updates.title {
            self.title = title.clone();
        }
        if let Some(flashcard_count) = updates.flashcard_count {
            self.flashcard_count = flashcard_count;
        }
        if let Some(progress) = updates.progress {
            self.progress = progress;
        }
        if let Some(status) = updates.status {
            self.status = status;
        }
    }
}

/// Processing state of a notebook, owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NotebookStatus {
    Pending,
    Uploading,
    Extracting,
    Generating,
    ReadyForStudio,
    Failed,
}

impl NotebookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Extracting => "extracting",
            Self::Generating => "generating",
            Self::ReadyForStudio => "ready_for_studio",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for NotebookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotebookStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "uploading" => Ok(Self::Uploading),
            "extracting" => Ok(Self::Extracting),
            "generating" => Ok(Self::Generating),
            "ready_for_studio" => Ok(Self::ReadyForStudio),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Partial set of notebook fields sent with an update.
///
/// `id`, `created_at` and `materials` are deliberately absent: they can't be
/// changed through an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotebookUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashcard_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NotebookStatus>,
}

impl NotebookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.flashcard_count.is_none()
            && self.progress.is_none()
            && self.status.is_none()
    }
}

/// Payload for creating a notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewNotebook {
    pub title: String,
}

//=========================================================================================
// Materials
//=========================================================================================

/// One source attached to a notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Material {
    pub id: String,
    pub kind: MaterialKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Material {
    /// Builds a material on the device, before the backend has seen it.
    pub fn local(input: MaterialInput) -> Self {
        let now = Utc::now();
        let entropy = Uuid::new_v4().simple().to_string();
        Self {
            id: format!(
                "{LOCAL_MATERIAL_ID_PREFIX}{}{}",
                &entropy[..12],
                now.timestamp_millis()
            ),
            kind: input.kind,
            uri: input.uri,
            filename: input.filename,
            content: input.content,
            created_at: now,
        }
    }

    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_MATERIAL_ID_PREFIX)
    }
}

/// A material before it has an id or a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MaterialInput {
    pub kind: MaterialKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl MaterialInput {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            uri: None,
            filename: None,
            content: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(MaterialKind::Text)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum MaterialKind {
    Pdf,
    Text,
    Image,
    Audio,
    Website,
    Youtube,
    CopiedText,
    Document,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Website => "website",
            Self::Youtube => "youtube",
            Self::CopiedText => "copied-text",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "website" => Ok(Self::Website),
            "youtube" => Ok(Self::Youtube),
            "copied-text" => Ok(Self::CopiedText),
            "document" => Ok(Self::Document),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Returned when a stored string doesn't name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant '{0}'")]
pub struct UnknownVariant(pub String);

//=========================================================================================
// Users
//=========================================================================================

// The signed-in user as seen by the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: String,
    pub email: String,
    pub hashed_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn notebook() -> Notebook {
        Notebook {
            id: "nb-1".to_string(),
            title: "Biology".to_string(),
            flashcard_count: 12,
            progress: 10.0,
            created_at: Utc::now(),
            status: NotebookStatus::ReadyForStudio,
            materials: vec![Material::local(MaterialInput::text("cells"))],
        }
    }

    #[test]
    fn apply_only_touches_provided_fields() {
        let mut nb = notebook();
        let before = nb.clone();

        nb.apply(&NotebookUpdate {
            title: Some("T".to_string()),
            progress: Some(75.0),
            ..Default::default()
        });

        assert_eq!(nb.title, "T");
        assert_eq!(nb.progress, 75.0);
        assert_eq!(nb.flashcard_count, before.flashcard_count);
        assert_eq!(nb.status, before.status);
        assert_eq!(nb.materials, before.materials);
        assert_eq!(nb.created_at, before.created_at);
    }

    #[test]
    fn local_material_ids_are_prefixed_and_distinct() {
        let a = Material::local(MaterialInput::text("a"));
        let b = Material::local(MaterialInput::text("b"));

        assert!(a.id.starts_with("material-"));
        assert!(a.is_local());
        assert_ne!(a.id, b.id);
        assert_eq!(b.content.as_deref(), Some("b"));
    }

    #[test]
    fn enums_use_backend_wire_names() {
        assert_eq!(
            serde_json::to_string(&NotebookStatus::ReadyForStudio).unwrap(),
            "\"ready_for_studio\""
        );
        assert_eq!(
            serde_json::to_string(&MaterialKind::CopiedText).unwrap(),
            "\"copied-text\""
        );
        assert_eq!("copied-text".parse::<MaterialKind>(), Ok(MaterialKind::CopiedText));
        assert_eq!("extracting".parse::<NotebookStatus>(), Ok(NotebookStatus::Extracting));
        assert!("archived".parse::<NotebookStatus>().is_err());
    }

    #[test]
    fn update_skips_absent_fields_on_the_wire() {
        let update = NotebookUpdate {
            title: Some("T".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"title":"T"}"#);
        assert!(NotebookUpdate::default().is_empty());
        assert!(!update.is_empty());
    }
}
