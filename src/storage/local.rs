// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Local device store: one file per project plus a recency index

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::project::Project;

const INDEX_FILE: &str = "av-planner-index.json";

/// One row of the local project index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Project id
    pub id: String,
    /// Project name
    #[serde(default)]
    pub name: String,
    /// Client name
    #[serde(default)]
    pub client: String,
    /// Last save, epoch milliseconds
    pub updated_at: i64,
}

/// Projects saved under a directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One file per id; percent-encoding keeps distinct ids apart and
    /// keeps separators out of the name
    fn project_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("project-{}.json", urlencoding::encode(id)))
    }

    /// Write the project and move it to the front of the index
    pub fn save(&self, project: &Project) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.project_path(&project.id);
        fs::write(&path, serde_json::to_string_pretty(project)?)?;

        let mut index = self.index()?;
        index.retain(|e| e.id != project.id);
        index.insert(
            0,
            IndexEntry {
                id: project.id.clone(),
                name: project.project_name.clone(),
                client: project.client_name.clone(),
                updated_at: Utc::now().timestamp_millis(),
            },
        );
        fs::write(self.root.join(INDEX_FILE), serde_json::to_string_pretty(&index)?)?;

        debug!("Saved project {} to {}", project.id, path.display());
        Ok(path)
    }

    /// Load a saved project; `None` if there is none with that id
    pub fn load(&self, id: &str) -> Result<Option<Project>> {
        let path = self.project_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Project::from_document(&bytes).map(Some)
    }

    /// Saved projects, most recently saved first
    pub fn index(&self) -> Result<Vec<IndexEntry>> {
        let path = self.root.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
