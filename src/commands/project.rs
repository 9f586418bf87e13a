// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project commands - start, describe and list projects

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde_json::json;
use tracing::info;

use super::{parse_date, Workspace};
use crate::project::MetadataPatch;

/// Metadata fields given on the command line
#[derive(Debug, Clone, Default)]
pub struct InfoArgs {
    /// Project name
    pub name: Option<String>,
    /// Client name
    pub client: Option<String>,
    /// Venue
    pub venue: Option<String>,
    /// Staff
    pub staff: Option<String>,
    /// Start date
    pub start: Option<String>,
    /// End date
    pub end: Option<String>,
    /// Setup date
    pub setup: Option<String>,
}

impl InfoArgs {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.client.is_none()
            && self.venue.is_none()
            && self.staff.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.setup.is_none()
    }

    fn into_patch(self) -> Result<MetadataPatch> {
        let date = |v: Option<String>| v.as_deref().map(parse_date).transpose();
        Ok(MetadataPatch {
            project_name: self.name,
            client_name: self.client,
            venue: self.venue,
            staff_name: self.staff,
            start_date: date(self.start)?,
            end_date: date(self.end)?,
            setup_date: date(self.setup)?,
        })
    }
}

/// Start a blank working project
pub fn new_project(ws: &Workspace, name: Option<String>) -> Result<()> {
    let mut store = ws.open_store()?;
    store.reset();
    store.update_metadata(MetadataPatch {
        project_name: name,
        ..Default::default()
    });
    ws.commit(&store)?;

    info!("Started project {}", store.project().id);
    println!("New project {}", store.project().id);
    Ok(())
}

/// Show project metadata, updating it first when fields are given
pub fn info(ws: &Workspace, args: InfoArgs) -> Result<()> {
    let mut store = ws.open_store()?;
    if !args.is_empty() {
        store.update_metadata(args.into_patch()?);
        ws.commit(&store)?;
    }

    let p = store.project();
    let window = p.effective_window();
    if ws.json {
        return ws.print_json(&json!({
            "id": p.id,
            "projectName": p.project_name,
            "clientName": p.client_name,
            "venue": p.venue,
            "staffName": p.staff_name,
            "startDate": p.start_date.to_string(),
            "endDate": p.end_date.to_string(),
            "setupDate": p.setup_date.map(|d| d.to_string()),
            "effectiveWindow": window,
            "nodes": p.graph.node_count(),
            "cables": p.graph.edge_count(),
            "driveFileId": p.linked_file_id(),
        }));
    }

    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    println!("{}", ws.strong(&format!("Project {}", p.id)));
    println!("  name:    {}", or_dash(&p.project_name));
    println!("  client:  {}", or_dash(&p.client_name));
    println!("  venue:   {}", or_dash(&p.venue));
    println!("  staff:   {}", or_dash(&p.staff_name));
    println!(
        "  dates:   {} to {} (setup {})",
        p.start_date,
        p.end_date,
        p.setup_date.map_or_else(|| "-".to_string(), |d| d.to_string())
    );
    println!("  window:  {} to {}", window.start, window.end);
    println!("  diagram: {} nodes, {} cables", p.graph.node_count(), p.graph.edge_count());
    if let Some(file_id) = p.linked_file_id() {
        println!("  cloud:   {file_id}");
    }
    Ok(())
}

/// List projects saved on this device, most recent first
pub fn projects(ws: &Workspace) -> Result<()> {
    let local = ws.config.local_store();
    let index = local
        .index()
        .with_context(|| format!("Failed to read project index in {}", local.root().display()))?;

    if ws.json {
        return ws.print_json(&index);
    }
    if index.is_empty() {
        println!("No saved projects. Use 'av-planner save' to save one.");
        return Ok(());
    }

    println!("Saved projects ({}):", index.len());
    for entry in &index {
        let when = DateTime::from_timestamp_millis(entry.updated_at)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let name = if entry.name.is_empty() { "Untitled" } else { &entry.name };
        println!("  {:<24} {:<28} {:<20} {}", entry.id, name, entry.client, when);
    }
    Ok(())
}
