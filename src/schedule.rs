// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Shared booking schedule and inventory limits

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::types::{DateWindow, GlobalBooking};

/// Source of competing bookings and total stock per equipment id
pub trait ScheduleSource {
    /// Bookings that may overlap the window. Sources may return a superset;
    /// callers apply the overlap rule themselves.
    fn list_bookings(&self, window: &DateWindow) -> Vec<GlobalBooking>;

    /// Total stock for an equipment id, `None` when the source does not track it
    fn inventory_limit(&self, equipment_id: &str) -> Option<u32>;
}

/// Schedule held in memory, either the built-in demo data or a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSchedule {
    /// Competing bookings
    #[serde(default)]
    pub bookings: Vec<GlobalBooking>,
    /// Total stock per equipment id
    #[serde(default)]
    pub inventory_limits: BTreeMap<String, u32>,
}

impl StaticSchedule {
    /// Create a schedule
    #[must_use]
    pub fn new(bookings: Vec<GlobalBooking>, inventory_limits: BTreeMap<String, u32>) -> Self {
        Self {
            bookings,
            inventory_limits,
        }
    }

    /// Load from a JSON file with `bookings` and `inventoryLimits`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse schedule {}", path.display()))
    }

    /// Demo schedule of other events competing for the same stock
    #[must_use]
    pub fn mock() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();

        let bookings = vec![
            GlobalBooking {
                id: "gp-1".into(),
                project_name: "Corporate Seminar 2024".into(),
                start_date: date(2025, 12, 6),
                end_date: date(2025, 12, 9),
                venue: "Grand Hotel".into(),
                equipment_usage: BTreeMap::from([
                    ("cam-sony-fx6".to_string(), 2),
                    ("sw-atem-mini-pro".to_string(), 1),
                ]),
            },
            GlobalBooking {
                id: "gp-2".into(),
                project_name: "Music Festival Live".into(),
                start_date: date(2025, 12, 8),
                end_date: date(2025, 12, 12),
                venue: "Outdoor Park".into(),
                equipment_usage: BTreeMap::from([("cam-sony-fx6".to_string(), 2)]),
            },
        ];

        let limits = BTreeMap::from([
            ("cam-sony-fx6".to_string(), 3),
            ("sw-atem-mini-pro".to_string(), 5),
            ("mic-shure-sm58".to_string(), 20),
        ]);

        Self::new(bookings, limits)
    }
}

impl ScheduleSource for StaticSchedule {
    fn list_bookings(&self, window: &DateWindow) -> Vec<GlobalBooking> {
        self.bookings
            .iter()
            .filter(|b| b.window().overlaps(window))
            .cloned()
            .collect()
    }

    fn inventory_limit(&self, equipment_id: &str) -> Option<u32> {
        self.inventory_limits.get(equipment_id).copied()
    }
}
