// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Check command - inventory conflicts against the booking schedule

use anyhow::Result;
use serde_json::json;

use super::Workspace;
use crate::conflict::{Finding, InventoryStatus};

/// Run the inventory check. Findings are advisory; the exit status stays 0.
pub fn run(ws: &Workspace) -> Result<()> {
    let schedule = ws.config.schedule()?;
    let store = ws.open_store()?;
    let report = store.check_inventory(&schedule);
    let status = report.status();

    if ws.json {
        return ws.print_json(&json!({
            "status": status,
            "window": report.window,
            "usage": report.usage,
            "findings": report.findings,
        }));
    }

    let headline = status.to_string();
    let headline = match status {
        InventoryStatus::Ok => ws.good(&headline),
        InventoryStatus::LowStock => ws.warn(&headline),
        InventoryStatus::Conflict => ws.bad(&headline),
    };
    println!("{headline}");
    println!("  window: {} to {}", report.window.start, report.window.end);

    if report.usage.is_empty() {
        println!("  (no equipment on the diagram)");
    }
    for u in &report.usage {
        println!("  {:<24} x{}", u.name, u.count);
    }

    for finding in &report.findings {
        let line = finding.to_string();
        match finding {
            Finding::Shortage { .. } => println!("  {}", ws.bad(&line)),
            Finding::LowStock { .. } => println!("  {}", ws.warn(&line)),
        }
    }
    Ok(())
}
