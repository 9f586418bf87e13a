// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for the planner core

use thiserror::Error;

use crate::validator::Rejection;

/// Errors returned by core planner operations
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A proposed cable failed connection validation
    #[error("connection rejected: {0}")]
    Rejected(#[from] Rejection),

    /// A referenced node does not exist in the diagram
    #[error("node not found: {0}")]
    UnknownNode(String),

    /// A referenced equipment id does not exist in the catalog
    #[error("equipment not found in catalog: {0}")]
    UnknownEquipment(String),

    /// A loaded document does not look like a project
    #[error("invalid project file: {0}")]
    InvalidProjectFile(String),

    /// A cable length outside the stocked set
    #[error("invalid cable length `{0}` (expected one of 1m, 2m, 3m, 5m, 10m, 20m, 30m, 50m, 100m)")]
    InvalidCableLength(String),

    /// The remote file store answered with a failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlannerError {
    /// Whether this is an expected validation outcome rather than a fault
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Rejected(_) | Self::InvalidProjectFile(_) | Self::InvalidCableLength(_)
        )
    }
}

/// Result alias for planner operations
pub type Result<T, E = PlannerError> = std::result::Result<T, E>;
