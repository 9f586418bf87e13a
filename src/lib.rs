// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! AV Planner library - signal-flow diagrams for AV equipment plans
//!
//! This crate provides the diagram graph of placed equipment and cables,
//! connector-aware connection validation, inventory conflict detection
//! against a shared booking schedule, and quotation building.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod commands;
pub mod config;
pub mod conflict;
pub mod error;
pub mod graph;
pub mod project;
pub mod quotation;
pub mod schedule;
pub mod storage;
pub mod validator;

/// Core data types shared by the diagram, conflict and quotation engines
pub mod types {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fmt;
    use std::str::FromStr;

    use crate::error::PlannerError;

    // =========================================================================
    // Equipment Catalog
    // =========================================================================

    /// Major equipment category
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum EquipmentCategory {
        /// Cameras, switchers, displays, converters
        Video,
        /// Microphones, mixers, speakers, amplifiers
        Audio,
        /// Fixtures, dimmers, consoles
        Lighting,
        /// Generators, distros, UPS
        Power,
        /// PCs, network gear
        Control,
        /// Anything else, including categories this build does not know
        #[default]
        #[serde(other)]
        Other,
    }

    impl EquipmentCategory {
        /// Lowercase label used in listings
        #[must_use]
        pub fn label(&self) -> &'static str {
            match self {
                Self::Video => "video",
                Self::Audio => "audio",
                Self::Lighting => "lighting",
                Self::Power => "power",
                Self::Control => "control",
                Self::Other => "other",
            }
        }
    }

    /// Signal direction of a connector
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Direction {
        /// Receives a signal
        Input,
        /// Sends a signal
        Output,
        /// Both ways (e.g. RJ45, USB)
        Bidirectional,
    }

    /// A named, typed port on a piece of equipment
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Connector {
        /// Unique within the owning equipment; used as the diagram handle id
        pub id: String,
        /// Display name, e.g. "HDMI In 1"
        pub name: String,
        /// Free-form signal type, e.g. "HDMI", "SDI", "XLR"
        #[serde(rename = "type")]
        pub signal_type: String,
        /// Port direction
        pub direction: Direction,
    }

    /// A catalog entry
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Equipment {
        /// Stable catalog id
        pub id: String,
        /// Display name
        pub name: String,
        /// Major category
        #[serde(default)]
        pub major_category: EquipmentCategory,
        /// Sub category (camera, mixer, ...)
        #[serde(default)]
        pub sub_category: String,
        /// Manufacturer
        #[serde(default)]
        pub manufacturer: String,
        /// Model designation
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub model: Option<String>,
        /// Explicit connector list (may be empty)
        #[serde(default)]
        pub connectors: Vec<Connector>,
        /// Owned stock
        #[serde(default)]
        pub stock_quantity: u32,
        /// Rental price per day
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub day_rate: Option<f64>,
        /// Generic input port count, used when no connectors are listed
        #[serde(default)]
        pub input_port_count: u32,
        /// Generic output port count, used when no connectors are listed
        #[serde(default)]
        pub output_port_count: u32,
    }

    // =========================================================================
    // Diagram Nodes
    // =========================================================================

    /// Position in 2D canvas space
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct Position {
        /// X coordinate
        pub x: f64,
        /// Y coordinate
        pub y: f64,
    }

    /// Payload of an equipment instance placed on the canvas
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EquipmentNodeData {
        /// Back-reference to the catalog entry
        #[serde(default)]
        pub equipment_id: String,
        /// Custom label on the canvas
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<String>,
        /// Copy of the catalog entry; `connectors` holds the node's own
        /// (copied or synthesized) connector set
        #[serde(flatten)]
        pub equipment: Equipment,
    }

    impl EquipmentNodeData {
        /// Catalog id this instance draws from
        ///
        /// Older documents carry no `equipmentId`; the copied `id` is used then.
        #[must_use]
        pub fn catalog_id(&self) -> &str {
            if self.equipment_id.is_empty() {
                &self.equipment.id
            } else {
                &self.equipment_id
            }
        }

        /// Connectors available as handles on this node
        #[must_use]
        pub fn connectors(&self) -> &[Connector] {
            &self.equipment.connectors
        }
    }

    /// Node kinds, tagged by `type` in serialized documents
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "data")]
    pub enum NodePayload {
        /// Placed equipment
        #[serde(rename = "equipment", alias = "equipmentNode")]
        Equipment(EquipmentNodeData),
    }

    /// A node on the diagram canvas
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct DiagramNode {
        /// Unique within the graph, generated at placement
        pub id: String,
        /// Canvas position
        #[serde(default)]
        pub position: Position,
        /// Selection state on the canvas
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        pub selected: bool,
        /// Kind-specific payload
        #[serde(flatten)]
        pub payload: NodePayload,
    }

    impl DiagramNode {
        /// Equipment payload, if this node is placed equipment
        #[must_use]
        pub fn equipment(&self) -> Option<&EquipmentNodeData> {
            match &self.payload {
                NodePayload::Equipment(data) => Some(data),
            }
        }

        /// Look up a connector on this node by handle id
        #[must_use]
        pub fn connector(&self, handle: &str) -> Option<&Connector> {
            self.equipment()?
                .connectors()
                .iter()
                .find(|c| c.id == handle)
        }

        /// Name shown on the canvas
        #[must_use]
        pub fn display_name(&self) -> &str {
            match self.equipment() {
                Some(data) => data.label.as_deref().unwrap_or(&data.equipment.name),
                None => &self.id,
            }
        }
    }

    // =========================================================================
    // Cables (Edges)
    // =========================================================================

    /// Physical cable length, restricted to stocked lengths
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub enum CableLength {
        /// 1 metre
        #[default]
        M1,
        /// 2 metres
        M2,
        /// 3 metres
        M3,
        /// 5 metres
        M5,
        /// 10 metres
        M10,
        /// 20 metres
        M20,
        /// 30 metres
        M30,
        /// 50 metres
        M50,
        /// 100 metres
        M100,
    }

    impl CableLength {
        /// Every stocked length, shortest first
        pub const ALL: [Self; 9] = [
            Self::M1,
            Self::M2,
            Self::M3,
            Self::M5,
            Self::M10,
            Self::M20,
            Self::M30,
            Self::M50,
            Self::M100,
        ];

        /// Lengths offered by the one-click cycle on the canvas
        pub const QUICK_CYCLE: [Self; 5] = [Self::M1, Self::M3, Self::M5, Self::M10, Self::M20];

        /// Length in metres
        #[must_use]
        pub fn meters(self) -> u32 {
            match self {
                Self::M1 => 1,
                Self::M2 => 2,
                Self::M3 => 3,
                Self::M5 => 5,
                Self::M10 => 10,
                Self::M20 => 20,
                Self::M30 => 30,
                Self::M50 => 50,
                Self::M100 => 100,
            }
        }

        /// Label as stored in documents, e.g. "5m"
        #[must_use]
        pub fn label(self) -> &'static str {
            match self {
                Self::M1 => "1m",
                Self::M2 => "2m",
                Self::M3 => "3m",
                Self::M5 => "5m",
                Self::M10 => "10m",
                Self::M20 => "20m",
                Self::M30 => "30m",
                Self::M50 => "50m",
                Self::M100 => "100m",
            }
        }

        /// Next length in the quick cycle; lengths outside it restart at 1m
        #[must_use]
        pub fn next_quick(self) -> Self {
            match Self::QUICK_CYCLE.iter().position(|l| *l == self) {
                Some(i) => Self::QUICK_CYCLE[(i + 1) % Self::QUICK_CYCLE.len()],
                None => Self::M1,
            }
        }
    }

    impl fmt::Display for CableLength {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.label())
        }
    }

    impl FromStr for CableLength {
        type Err = PlannerError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|l| l.label() == s.trim())
                .ok_or_else(|| PlannerError::InvalidCableLength(s.to_string()))
        }
    }

    impl TryFrom<String> for CableLength {
        type Error = PlannerError;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            value.parse()
        }
    }

    impl From<CableLength> for String {
        fn from(value: CableLength) -> Self {
            value.label().to_string()
        }
    }

    /// Edge kind marker. Written as "cable"; any other marker (older
    /// documents use "default") reads as a cable.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum EdgeKind {
        /// A physical cable
        #[default]
        #[serde(other)]
        Cable,
    }

    /// Cable metadata
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CableData {
        /// Signal type shared by both endpoints at creation
        #[serde(rename = "type")]
        pub signal_type: String,
        /// Physical length
        #[serde(default)]
        pub length: CableLength,
    }

    /// Partial update for [`CableData`]
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct CablePatch {
        /// New signal type
        pub signal_type: Option<String>,
        /// New length
        pub length: Option<CableLength>,
    }

    /// A cable between two connectors
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cable {
        /// Id of the form e-<source>-<target>-<millis>
        pub id: String,
        /// Always "cable"
        #[serde(rename = "type", default)]
        pub kind: EdgeKind,
        /// Source node id
        pub source: String,
        /// Source connector id
        pub source_handle: String,
        /// Target node id
        pub target: String,
        /// Target connector id
        pub target_handle: String,
        /// Selection state on the canvas
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        pub selected: bool,
        /// Signal type and length
        pub data: CableData,
    }

    // =========================================================================
    // Costs
    // =========================================================================

    /// Category of a manually entered cost line
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum CostCategory {
        /// Crew and operators
        #[default]
        Labor,
        /// Trucks, shipping
        Transport,
        /// Anything else
        Misc,
    }

    impl CostCategory {
        /// Label used in exports
        #[must_use]
        pub fn label(&self) -> &'static str {
            match self {
                Self::Labor => "Labor",
                Self::Transport => "Transport",
                Self::Misc => "Misc",
            }
        }
    }

    impl FromStr for CostCategory {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_lowercase().as_str() {
                "labor" | "labour" => Ok(Self::Labor),
                "transport" => Ok(Self::Transport),
                "misc" => Ok(Self::Misc),
                other => Err(format!("Unknown cost category: {other}. Valid: labor, transport, misc")),
            }
        }
    }

    /// A manually entered cost line
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AdditionalCost {
        /// Unique id
        pub id: String,
        /// Item name
        pub name: String,
        /// Category
        #[serde(default)]
        pub category: CostCategory,
        /// Price per unit
        #[serde(default)]
        pub unit_price: f64,
        /// Quantity
        #[serde(default)]
        pub quantity: f64,
        /// Free-form note
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
    }

    impl AdditionalCost {
        /// `unit_price * quantity`
        #[must_use]
        pub fn line_total(&self) -> f64 {
            self.unit_price * self.quantity
        }
    }

    // =========================================================================
    // Schedule
    // =========================================================================

    /// Closed date interval `[start, end]`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DateWindow {
        /// First day
        pub start: NaiveDate,
        /// Last day (inclusive)
        pub end: NaiveDate,
    }

    impl DateWindow {
        /// Create a window
        #[must_use]
        pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
            Self { start, end }
        }

        /// Inclusive overlap: windows touching on a boundary day overlap
        #[must_use]
        pub fn overlaps(&self, other: &Self) -> bool {
            self.start <= other.end && other.start <= self.end
        }
    }

    /// A competing reservation of shared inventory
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GlobalBooking {
        /// Booking id
        pub id: String,
        /// Name of the booking project
        pub project_name: String,
        /// First day
        #[serde(with = "crate::project::serde_date")]
        pub start_date: NaiveDate,
        /// Last day
        #[serde(with = "crate::project::serde_date")]
        pub end_date: NaiveDate,
        /// Venue
        #[serde(default)]
        pub venue: String,
        /// Units drawn per equipment id
        #[serde(default)]
        pub equipment_usage: BTreeMap<String, u32>,
    }

    impl GlobalBooking {
        /// The booking's date window
        #[must_use]
        pub fn window(&self) -> DateWindow {
            DateWindow::new(self.start_date, self.end_date)
        }

        /// Units of an equipment id this booking draws
        #[must_use]
        pub fn usage_of(&self, equipment_id: &str) -> u32 {
            self.equipment_usage.get(equipment_id).copied().unwrap_or(0)
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{PlannerError, Result};
    pub use crate::graph::DiagramGraph;
    pub use crate::project::{Project, ProjectStore};
    pub use crate::types::*;
}
