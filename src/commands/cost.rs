// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Cost commands - manage manually entered cost lines

use anyhow::{anyhow, bail, Result};

use super::Workspace;
use crate::project::{CostDraft, CostPatch};
use crate::quotation::format_amount;
use crate::types::CostCategory;

/// Options shared by the cost actions
#[derive(Debug, Clone, Default)]
pub struct CostArgs {
    /// Item name (update)
    pub name: Option<String>,
    /// Category
    pub category: Option<String>,
    /// Price per unit
    pub price: Option<f64>,
    /// Quantity
    pub qty: Option<f64>,
    /// Note
    pub note: Option<String>,
}

impl CostArgs {
    fn category(&self) -> Result<Option<CostCategory>> {
        self.category
            .as_deref()
            .map(|c| c.parse::<CostCategory>().map_err(|e| anyhow!(e)))
            .transpose()
    }
}

/// Run cost command
pub fn run(ws: &Workspace, action: &str, target: Option<String>, args: CostArgs) -> Result<()> {
    let mut store = ws.open_store()?;

    match action {
        "add" | "create" => {
            let name = target
                .or_else(|| args.name.clone())
                .ok_or_else(|| anyhow!("A name is required: av-planner cost add <name>"))?;

            // Same path as typing into the trailing empty row
            let defaults = CostDraft::default();
            let mut draft = CostDraft {
                category: args.category()?.unwrap_or(defaults.category),
                unit_price: args.price.unwrap_or(defaults.unit_price),
                quantity: args.qty.unwrap_or(defaults.quantity),
            };
            let id = store
                .type_into_draft(&mut draft, &name)
                .ok_or_else(|| anyhow!("A name is required"))?;
            if args.note.is_some() {
                store.update_cost(
                    &id,
                    CostPatch {
                        note: args.note,
                        ..Default::default()
                    },
                );
            }
            ws.commit(&store)?;

            println!("Added cost line {name}");
            println!("  id: {id}");
        }

        "update" | "edit" => {
            let id = target.ok_or_else(|| anyhow!("A cost line id is required"))?;
            let patch = CostPatch {
                category: args.category()?,
                name: args.name,
                unit_price: args.price,
                quantity: args.qty,
                note: args.note,
            };
            if !store.update_cost(&id, patch) {
                bail!("Cost line not found: {id}");
            }
            ws.commit(&store)?;
            println!("Updated cost line {id}");
        }

        "remove" | "delete" | "rm" => {
            let id = target.ok_or_else(|| anyhow!("A cost line id is required"))?;
            if !store.remove_cost(&id) {
                bail!("Cost line not found: {id}");
            }
            ws.commit(&store)?;
            println!("Removed cost line {id}");
        }

        "list" | "ls" => {
            let costs = &store.project().additional_costs;
            if ws.json {
                return ws.print_json(costs);
            }
            if costs.is_empty() {
                println!("No cost lines. Use 'av-planner cost add <name>' to create one.");
                return Ok(());
            }
            println!("Cost lines ({}):", costs.len());
            for c in costs {
                println!(
                    "  {:<44} {:<10} {:<24} {:>10} x {:<6} = {:>12}",
                    c.id,
                    c.category.label(),
                    c.name,
                    format_amount(c.unit_price),
                    c.quantity,
                    format_amount(c.line_total())
                );
                if let Some(note) = &c.note {
                    println!("    note: {note}");
                }
            }
        }

        other => {
            bail!("Unknown action: {other}. Valid: add, update, remove, list");
        }
    }

    Ok(())
}
