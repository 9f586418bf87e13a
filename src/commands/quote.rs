// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Quote and pick list commands

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::Workspace;
use crate::quotation::{MarkupRate, PickList};

/// Print or write the quotation
pub fn run(ws: &Workspace, rate: f64, format: &str, output: Option<PathBuf>) -> Result<()> {
    let store = ws.open_store()?;
    let rate = MarkupRate::new(rate);
    let quote = store.quotation(rate);

    let content = match format.to_lowercase().as_str() {
        "text" | "txt" if !ws.json => quote.render_text(store.project()),
        "csv" => quote.to_csv(),
        "json" | "text" | "txt" => serde_json::to_string_pretty(&quote)?,
        other => bail!("Unknown quote format: {other}. Supported: text, csv, json"),
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            info!("Quotation written to {}", path.display());
            println!("Exported to {}", path.display());
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}

/// Print the pick list
pub fn picklist(ws: &Workspace) -> Result<()> {
    let store = ws.open_store()?;
    let picks = PickList::build(store.project());

    if ws.json {
        return ws.print_json(&picks);
    }
    print!("{}", picks.render_text());
    Ok(())
}
