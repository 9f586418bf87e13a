// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Inventory conflict detection
//!
//! Advisory check of the diagram's equipment demand against stock left over
//! by competing bookings during the project's effective window. Recomputed
//! from the current state on every call.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::schedule::ScheduleSource;
use crate::types::{DateWindow, DiagramNode};

/// Stock assumed for equipment the schedule does not track
pub const UNCONSTRAINED_STOCK: u32 = 999;

/// Units of one catalog item drawn by the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Usage {
    /// Catalog id
    pub equipment_id: String,
    /// Display name (first placed instance)
    pub name: String,
    /// Placed instances
    pub count: u32,
}

/// Count placed instances per catalog id, in order of first placement
#[must_use]
pub fn current_usage(nodes: &[DiagramNode]) -> Vec<Usage> {
    let mut usage: Vec<Usage> = Vec::new();
    for data in nodes.iter().filter_map(DiagramNode::equipment) {
        let id = data.catalog_id();
        if id.is_empty() {
            continue;
        }
        match usage.iter_mut().find(|u| u.equipment_id == id) {
            Some(entry) => entry.count += 1,
            None => usage.push(Usage {
                equipment_id: id.to_string(),
                name: data.equipment.name.clone(),
                count: 1,
            }),
        }
    }
    usage
}

/// Per-item result of the inventory check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// Demand exceeds what is left after overlapping bookings
    Shortage {
        /// Catalog id
        equipment_id: String,
        /// Display name
        name: String,
        /// Units this project needs
        needed: u32,
        /// Units left after overlapping bookings (may be negative)
        available: i64,
        /// Total stock
        total_stock: u32,
        /// Names of overlapping bookings drawing this item
        conflicting: Vec<String>,
    },
    /// Demand fits but leaves no spare unit
    LowStock {
        /// Catalog id
        equipment_id: String,
        /// Display name
        name: String,
        /// Units left after this project's draw
        remaining: i64,
    },
}

impl Finding {
    /// Catalog id the finding is about
    #[must_use]
    pub fn equipment_id(&self) -> &str {
        match self {
            Self::Shortage { equipment_id, .. } | Self::LowStock { equipment_id, .. } => equipment_id,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shortage {
                name,
                needed,
                available,
                total_stock,
                conflicting,
                ..
            } => write!(
                f,
                "{name}: Need {needed}, Available {available} (Total {total_stock}). Conflicting with: {}",
                conflicting.join(", ")
            ),
            Self::LowStock { name, remaining, .. } => {
                write!(f, "{name}: Stock running low ({remaining} left).")
            }
        }
    }
}

/// Overall inventory status, highest severity wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    /// Nothing flagged
    Ok,
    /// At least one low-stock warning, no shortage
    LowStock,
    /// At least one shortage
    Conflict,
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "Inventory OK",
            Self::LowStock => "Low Stock",
            Self::Conflict => "Conflict Detected",
        })
    }
}

/// Result of one inventory check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Window the check covered
    pub window: DateWindow,
    /// Demand per item
    pub usage: Vec<Usage>,
    /// At most one finding per item
    pub findings: Vec<Finding>,
}

impl ConflictReport {
    /// Overall status
    #[must_use]
    pub fn status(&self) -> InventoryStatus {
        self.findings
            .iter()
            .map(|f| match f {
                Finding::Shortage { .. } => InventoryStatus::Conflict,
                Finding::LowStock { .. } => InventoryStatus::LowStock,
            })
            .max()
            .unwrap_or(InventoryStatus::Ok)
    }

    /// Shortage findings
    #[must_use]
    pub fn shortages(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::Shortage { .. }))
            .collect()
    }

    /// Low-stock findings
    #[must_use]
    pub fn warnings(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::LowStock { .. }))
            .collect()
    }

    /// Finding for a catalog id, if any
    #[must_use]
    pub fn finding_for(&self, equipment_id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.equipment_id() == equipment_id)
    }
}

/// Check diagram demand against the schedule over the given window
pub fn detect(nodes: &[DiagramNode], window: DateWindow, schedule: &dyn ScheduleSource) -> ConflictReport {
    let usage = current_usage(nodes);
    let bookings: Vec<_> = schedule
        .list_bookings(&window)
        .into_iter()
        .filter(|b| b.window().overlaps(&window))
        .collect();

    let mut findings = Vec::new();
    for item in &usage {
        let mut other_usage: i64 = 0;
        let mut conflicting = Vec::new();
        for booking in &bookings {
            let used = booking.usage_of(&item.equipment_id);
            if used > 0 {
                other_usage += i64::from(used);
                conflicting.push(booking.project_name.clone());
            }
        }

        let total_stock = schedule
            .inventory_limit(&item.equipment_id)
            .unwrap_or(UNCONSTRAINED_STOCK);
        let available = i64::from(total_stock) - other_usage;
        let needed = i64::from(item.count);

        debug!(
            "{}: need {needed}, other bookings {other_usage}, stock {total_stock}",
            item.equipment_id
        );

        if needed > available {
            findings.push(Finding::Shortage {
                equipment_id: item.equipment_id.clone(),
                name: item.name.clone(),
                needed: item.count,
                available,
                total_stock,
                conflicting,
            });
        } else if available - needed < 1 {
            findings.push(Finding::LowStock {
                equipment_id: item.equipment_id.clone(),
                name: item.name.clone(),
                remaining: available - needed,
            });
        }
    }

    ConflictReport {
        window,
        usage,
        findings,
    }
}
