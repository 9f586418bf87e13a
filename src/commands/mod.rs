// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations
//!
//! Every command works on the working project kept in
//! `<data_dir>/workspace.json`.

pub mod check;
pub mod completions;
pub mod config;
pub mod cost;
pub mod diagram;
pub mod export;
pub mod persist;
pub mod project;
pub mod quote;

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;
use crate::graph::DiagramGraph;
use crate::project::{Project, ProjectStore};

const WORKSPACE_FILE: &str = "workspace.json";

/// Resolved settings shared by all commands
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Loaded configuration
    pub config: Config,
    /// Print machine-readable JSON
    pub json: bool,
    /// Colour terminal output
    pub color: bool,
}

impl Workspace {
    /// Workspace over a configuration
    #[must_use]
    pub fn new(config: Config, json: bool, color: bool) -> Self {
        Self { config, json, color }
    }

    /// Path of the working project file
    #[must_use]
    pub fn project_path(&self) -> PathBuf {
        self.config.data_dir.join(WORKSPACE_FILE)
    }

    /// Load the working project, or a blank one if none was started
    pub fn open_store(&self) -> Result<ProjectStore> {
        let path = self.project_path();
        if !path.exists() {
            debug!("No working project at {}, starting blank", path.display());
            return Ok(ProjectStore::new());
        }
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let project = Project::from_document(&bytes)
            .with_context(|| format!("Failed to load working project from {}", path.display()))?;
        Ok(ProjectStore::with_project(project))
    }

    /// Persist the working project
    pub fn commit(&self, store: &ProjectStore) -> Result<()> {
        fs::create_dir_all(&self.config.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.config.data_dir.display())
        })?;
        let path = self.project_path();
        let content = serde_json::to_string_pretty(store.project())?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Saved working project to {}", path.display());
        Ok(())
    }

    /// Print a value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Green text when colour is on
    #[must_use]
    pub fn good(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Yellow text when colour is on
    #[must_use]
    pub fn warn(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    /// Red text when colour is on
    #[must_use]
    pub fn bad(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold text when colour is on
    #[must_use]
    pub fn strong(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Resolve a node id, id prefix or label to a node id
pub fn resolve_node(graph: &DiagramGraph, name_or_id: &str) -> Result<String> {
    if graph.node(name_or_id).is_some() {
        return Ok(name_or_id.to_string());
    }

    let matches: Vec<_> = graph
        .nodes()
        .iter()
        .filter(|n| n.id.starts_with(name_or_id) || n.display_name() == name_or_id)
        .collect();

    match matches.len() {
        0 => bail!("No node found matching: {name_or_id}"),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple nodes match '{name_or_id}':");
            for n in &matches {
                eprintln!("  {} ({})", n.display_name(), n.id);
            }
            bail!("Ambiguous node name. Use the full id.");
        }
    }
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(value: &str) -> Result<chrono::NaiveDate> {
    crate::project::serde_date::parse(value)
        .with_context(|| format!("Invalid date: {value} (expected YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::Position;
    use tempfile::TempDir;

    fn workspace(dir: &TempDir) -> Workspace {
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        Workspace::new(config, false, false)
    }

    #[test]
    fn test_open_store_blank_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = workspace(&dir).open_store().unwrap();
        assert!(store.graph().is_empty());
    }

    #[test]
    fn test_commit_then_reopen() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let mut store = ProjectStore::new();
        store.add_node(Catalog::builtin().place("mic-shure-sm58", Position::default()).unwrap());

        ws.commit(&store).unwrap();

        assert_eq!(ws.open_store().unwrap().graph().node_count(), 1);
    }

    #[test]
    fn test_resolve_node_by_label() {
        let mut graph = DiagramGraph::new();
        let node = Catalog::builtin().place("cam-sony-fx6", Position::default()).unwrap();
        let id = node.id.clone();
        graph.add_node(node);

        assert_eq!(resolve_node(&graph, "Sony FX6").unwrap(), id);
        assert_eq!(resolve_node(&graph, &id).unwrap(), id);
        assert!(resolve_node(&graph, "Nothing").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-12-06").is_ok());
        assert!(parse_date("06/12/2025").is_err());
    }
}
