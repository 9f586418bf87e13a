// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Persistence: local device store and cloud file storage
//!
//! Saving always writes the local copy first and then tries the cloud.
//! The two are independent; a cloud failure never discards the local copy.

mod drive;
mod local;
mod memory;

pub use drive::{DriveClient, DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE};
pub use local::{IndexEntry, LocalStore};
pub use memory::MemoryStorage;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{PlannerError, Result};
use crate::project::{Project, ProjectStore};

/// Default search: JSON files that are not in the trash
pub const JSON_QUERY: &str = "mimeType = 'application/json' and trashed = false";

/// Id given to loaded documents that carry none
pub const IMPORTED_PROJECT_ID: &str = "imported-project";

/// A file as listed by the storage service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// File id
    pub id: String,
    /// File name
    #[serde(default)]
    pub name: String,
    /// MIME type
    #[serde(default)]
    pub mime_type: String,
    /// Parent folder ids
    #[serde(default)]
    pub parents: Vec<String>,
}

/// A create-or-overwrite request
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    /// File name
    pub name: String,
    /// JSON body
    pub content: serde_json::Value,
    /// Folder for a new file
    pub parent_id: Option<String>,
    /// Overwrite this file instead of creating one
    pub file_id: Option<String>,
}

/// Cloud file store contract
pub trait FileStorage {
    /// List files matching a query expression
    fn search(&self, query: &str) -> Result<Vec<FileMetadata>>;

    /// Raw contents of a file
    fn read(&self, file_id: &str) -> Result<Vec<u8>>;

    /// Create a file, or overwrite `file_id` when given
    fn write(&self, request: &WriteRequest) -> Result<FileMetadata>;
}

/// Search expression: [`JSON_QUERY`], narrowed by the given query and
/// scoped to the team folder when one is configured
#[must_use]
pub fn build_search_query(query: Option<&str>, team_folder_id: Option<&str>) -> String {
    let base = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("({q}) and {JSON_QUERY}"),
        None => JSON_QUERY.to_string(),
    };
    match team_folder_id.filter(|f| !f.is_empty()) {
        Some(folder) => format!("('{folder}' in parents) and {base}"),
        None => base,
    }
}

/// Outcome of the cloud half of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudSave {
    /// No credential; nothing sent
    Skipped,
    /// A new file was created and linked to the project
    Created(String),
    /// The linked file was overwritten
    Overwritten(String),
    /// The request failed; the local copy still stands
    Failed(String),
}

/// Outcome of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Where the local copy went, or why it failed
    pub local: std::result::Result<PathBuf, String>,
    /// What happened in the cloud
    pub cloud: CloudSave,
}

/// Write request for the current project.
///
/// Overwrites the linked file when there is one. Otherwise a new file is
/// created in the team folder if configured, else in the project's folder.
pub fn write_request_for(project: &Project, team_folder_id: Option<&str>) -> Result<WriteRequest> {
    let file_id = project.linked_file_id().map(str::to_string);
    let team = team_folder_id.filter(|f| !f.is_empty());
    let parent_id = match (&file_id, team) {
        (None, Some(team)) => Some(team.to_string()),
        _ => Some(project.drive_folder_id.clone()).filter(|f| !f.is_empty()),
    };

    Ok(WriteRequest {
        name: project.file_name(),
        content: project.to_document()?,
        parent_id,
        file_id,
    })
}

/// Save locally, then to the cloud when storage is available. A newly
/// created cloud file's id is recorded on the project.
pub fn save_project(
    store: &mut ProjectStore,
    local: &LocalStore,
    cloud: Option<&dyn FileStorage>,
    team_folder_id: Option<&str>,
) -> SaveReport {
    let local_result = local.save(store.project()).map_err(|e| {
        warn!("Local save failed: {e}");
        e.to_string()
    });

    let Some(cloud) = cloud else {
        return SaveReport {
            local: local_result,
            cloud: CloudSave::Skipped,
        };
    };

    let outcome = write_request_for(store.project(), team_folder_id).and_then(|request| {
        let overwrite = request.file_id.is_some();
        cloud.write(&request).map(|meta| (overwrite, meta))
    });

    let cloud_result = match outcome {
        Ok((overwrite, meta)) => {
            if !meta.id.is_empty() {
                store.set_drive_file_id(&meta.id);
            }
            info!("Saved {} to cloud as {}", store.project().id, meta.id);
            if overwrite {
                CloudSave::Overwritten(meta.id)
            } else {
                CloudSave::Created(meta.id)
            }
        }
        Err(e) => {
            warn!("Cloud save failed: {e}");
            CloudSave::Failed(e.to_string())
        }
    };

    SaveReport {
        local: local_result,
        cloud: cloud_result,
    }
}

/// Read a cloud file and load it as the active project.
///
/// The loaded project is linked to the file it came from and its folder
/// choice is cleared. Any failure leaves the store untouched.
pub fn load_from_cloud(store: &mut ProjectStore, cloud: &dyn FileStorage, file_id: &str) -> Result<()> {
    let bytes = cloud.read(file_id)?;
    let mut project = Project::from_document(&bytes)?;

    let has_id = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|v| v.get("id").and_then(|id| id.as_str().map(|s| !s.is_empty())))
        .unwrap_or(false);
    if !has_id {
        project.id = IMPORTED_PROJECT_ID.to_string();
    }
    project.drive_file_id = file_id.to_string();
    project.drive_folder_id.clear();
    project.drive_folder_name.clear();

    store.load(project);
    Ok(())
}

/// Load a project from the local device store
pub fn load_from_local(store: &mut ProjectStore, local: &LocalStore, project_id: &str) -> Result<()> {
    let project = local
        .load(project_id)?
        .ok_or_else(|| PlannerError::Storage(format!("no local project with id {project_id}")))?;
    store.load(project);
    Ok(())
}
