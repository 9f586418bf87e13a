// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Persistence commands - save, open and browse saved projects

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use super::Workspace;
use crate::storage::{self, build_search_query, CloudSave, FileStorage};

const LOCAL_PREFIX: &str = "local:";

/// Save the working project locally and, with a token configured, to the cloud
pub fn save(ws: &Workspace) -> Result<()> {
    let mut store = ws.open_store()?;
    let local = ws.config.local_store();
    let cloud = ws.config.cloud();

    let report = storage::save_project(
        &mut store,
        &local,
        cloud.as_ref().map(|c| c as &dyn FileStorage),
        ws.config.team_folder(),
    );
    ws.commit(&store)?;

    if ws.json {
        return ws.print_json(&json!({
            "local": report.local.as_ref().map(|p| p.display().to_string()).ok(),
            "localError": report.local.as_ref().err(),
            "cloud": match &report.cloud {
                CloudSave::Skipped => json!({"status": "skipped"}),
                CloudSave::Created(id) => json!({"status": "created", "fileId": id}),
                CloudSave::Overwritten(id) => json!({"status": "overwritten", "fileId": id}),
                CloudSave::Failed(e) => json!({"status": "failed", "error": e}),
            },
        }));
    }

    match &report.local {
        Ok(path) => println!("{} {}", ws.good("Saved locally:"), path.display()),
        Err(e) => eprintln!("{} {e}", ws.bad("Local save failed:")),
    }
    match &report.cloud {
        CloudSave::Skipped => println!("{}", ws.warn("Cloud save skipped: no access token configured")),
        CloudSave::Created(id) => println!("{} new file {id}", ws.good("Saved to cloud:")),
        CloudSave::Overwritten(id) => println!("{} updated file {id}", ws.good("Saved to cloud:")),
        CloudSave::Failed(e) => eprintln!("{} {e}", ws.bad("Cloud save failed:")),
    }
    Ok(())
}

/// Open a cloud file, or `local:<project-id>` from this device
pub fn open(ws: &Workspace, source: &str) -> Result<()> {
    let mut store = ws.open_store()?;

    if let Some(project_id) = source.strip_prefix(LOCAL_PREFIX) {
        storage::load_from_local(&mut store, &ws.config.local_store(), project_id)
            .with_context(|| format!("Failed to open local project {project_id}"))?;
    } else {
        let cloud = ws
            .config
            .cloud()
            .ok_or_else(|| anyhow!("Opening cloud files needs an access token (AVPLANNER_ACCESS_TOKEN)"))?;
        storage::load_from_cloud(&mut store, &cloud, source)
            .with_context(|| format!("Failed to open file {source}"))?;
    }
    ws.commit(&store)?;

    let p = store.project();
    let name = if p.project_name.is_empty() { "Untitled" } else { &p.project_name };
    println!("Opened {name} ({})", p.id);
    Ok(())
}

/// List project files in cloud storage
pub fn files(ws: &Workspace, query: Option<&str>) -> Result<()> {
    let cloud = ws
        .config
        .cloud()
        .ok_or_else(|| anyhow!("Listing cloud files needs an access token (AVPLANNER_ACCESS_TOKEN)"))?;
    let q = build_search_query(query, ws.config.team_folder());
    let found = cloud.search(&q).context("Cloud search failed")?;

    if ws.json {
        return ws.print_json(&found);
    }
    if found.is_empty() {
        println!("No project files found.");
        return Ok(());
    }
    println!("Files ({}):", found.len());
    for f in &found {
        println!("  {:<36} {}", f.id, f.name);
    }
    Ok(())
}
