// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project state: the active project and the commands that mutate it

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conflict::{self, ConflictReport};
use crate::error::{PlannerError, Result};
use crate::graph::{ConnectionProposal, DiagramGraph, EdgeChange, NodeChange};
use crate::quotation::{MarkupRate, Quotation};
use crate::schedule::ScheduleSource;
use crate::types::{
    AdditionalCost, CableLength, CablePatch, CostCategory, DateWindow, DiagramNode,
};

/// Date (de)serialization: writes `YYYY-MM-DD`, also reads full timestamps
/// such as `2025-12-06T00:00:00.000Z`
pub mod serde_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    /// Parse a date or timestamp string into its calendar date
    pub fn parse(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
            .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, FORMAT).ok()))
    }

    /// Serialize as `YYYY-MM-DD`
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    /// Deserialize from a date or timestamp string
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    /// Optional dates; empty strings and nulls read as `None`
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize as `YYYY-MM-DD` or null
        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize from a date string, empty string or null
        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The aggregate root: metadata, diagram, selections, costs, cloud linkage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    /// Project id
    pub id: String,
    /// Project name
    pub project_name: String,
    /// Client name
    pub client_name: String,
    /// Venue
    pub venue: String,
    /// Responsible staff
    pub staff_name: String,
    /// First show day
    #[serde(with = "serde_date")]
    pub start_date: NaiveDate,
    /// Last show day
    #[serde(with = "serde_date")]
    pub end_date: NaiveDate,
    /// Setup (load-in) day
    #[serde(with = "serde_date::option")]
    pub setup_date: Option<NaiveDate>,
    /// Nodes and cables
    #[serde(flatten)]
    pub graph: DiagramGraph,
    /// Catalog ids offered for placement
    pub selected_equipment_ids: Vec<String>,
    /// Manually entered cost lines
    pub additional_costs: Vec<AdditionalCost>,
    /// Linked cloud file; empty when not yet saved to the cloud
    pub drive_file_id: String,
    /// Cloud folder chosen for this project
    pub drive_folder_id: String,
    /// Display name of that folder
    pub drive_folder_name: String,
}

impl Default for Project {
    fn default() -> Self {
        Self::blank(today())
    }
}

impl Project {
    /// Empty project with a fresh id and all dates on the given day
    #[must_use]
    pub fn blank(day: NaiveDate) -> Self {
        Self {
            id: format!("proj-{}", uuid::Uuid::new_v4().simple()),
            project_name: String::new(),
            client_name: String::new(),
            venue: String::new(),
            staff_name: String::new(),
            start_date: day,
            end_date: day,
            setup_date: Some(day),
            graph: DiagramGraph::new(),
            selected_equipment_ids: Vec::new(),
            additional_costs: Vec::new(),
            drive_file_id: String::new(),
            drive_folder_id: String::new(),
            drive_folder_name: String::new(),
        }
    }

    /// Parse a serialized project document.
    ///
    /// A document counts as a project only if it carries `id` or `nodes`.
    pub fn from_document(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| PlannerError::InvalidProjectFile(e.to_string()))?;
        let is_project = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("id") || obj.contains_key("nodes"));
        if !is_project {
            return Err(PlannerError::InvalidProjectFile(
                "document has neither `id` nor `nodes`".into(),
            ));
        }
        serde_json::from_value(value).map_err(|e| PlannerError::InvalidProjectFile(e.to_string()))
    }

    /// Serialize to the flat document shape
    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Window during which the project's equipment is out: from the setup
    /// day when it precedes the start, through the end date
    #[must_use]
    pub fn effective_window(&self) -> DateWindow {
        let start = match self.setup_date {
            Some(setup) if setup < self.start_date => setup,
            _ => self.start_date,
        };
        DateWindow::new(start, self.end_date)
    }

    /// Linked cloud file id, if any
    #[must_use]
    pub fn linked_file_id(&self) -> Option<&str> {
        Some(self.drive_file_id.as_str()).filter(|id| !id.is_empty())
    }

    /// File name used when saving to the cloud
    #[must_use]
    pub fn file_name(&self) -> String {
        let name = self.project_name.trim();
        format!("{}.json", if name.is_empty() { "Untitled" } else { name })
    }
}

/// Partial metadata update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    /// Project name
    pub project_name: Option<String>,
    /// Client name
    pub client_name: Option<String>,
    /// Venue
    pub venue: Option<String>,
    /// Staff
    pub staff_name: Option<String>,
    /// Start date
    pub start_date: Option<NaiveDate>,
    /// End date
    pub end_date: Option<NaiveDate>,
    /// Setup date
    pub setup_date: Option<NaiveDate>,
}

/// A cost line before it has an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewCost {
    /// Item name
    pub name: String,
    /// Category
    pub category: CostCategory,
    /// Price per unit
    pub unit_price: f64,
    /// Quantity
    pub quantity: f64,
    /// Note
    pub note: Option<String>,
}

/// Partial update of a cost line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostPatch {
    /// Item name
    pub name: Option<String>,
    /// Category
    pub category: Option<CostCategory>,
    /// Price per unit
    pub unit_price: Option<f64>,
    /// Quantity
    pub quantity: Option<f64>,
    /// Note
    pub note: Option<String>,
}

/// The trailing empty row of the cost table. Typing a name into it
/// materializes a real line and clears the row.
#[derive(Debug, Clone, PartialEq)]
pub struct CostDraft {
    /// Category the new line will get
    pub category: CostCategory,
    /// Price the new line will get
    pub unit_price: f64,
    /// Quantity the new line will get
    pub quantity: f64,
}

impl Default for CostDraft {
    fn default() -> Self {
        Self {
            category: CostCategory::Labor,
            unit_price: 0.0,
            quantity: 1.0,
        }
    }
}

/// Holds the single active project; every mutation goes through a method here
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    project: Project,
}

impl ProjectStore {
    /// Store holding a blank project
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the given project
    #[must_use]
    pub fn with_project(project: Project) -> Self {
        Self { project }
    }

    /// Current project
    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Current diagram
    #[must_use]
    pub fn graph(&self) -> &DiagramGraph {
        &self.project.graph
    }

    /// Replace the whole project with a loaded one
    pub fn load(&mut self, project: Project) {
        info!("Loaded project {} ({})", project.id, project.project_name);
        self.project = project;
    }

    /// Parse a document and load it; on failure the current project is kept
    pub fn load_document(&mut self, bytes: &[u8]) -> Result<()> {
        let project = Project::from_document(bytes)?;
        self.load(project);
        Ok(())
    }

    /// Discard the current project and start a blank one
    pub fn reset(&mut self) {
        debug!("Resetting project");
        self.project = Project::default();
    }

    // -------------------------------------------------------------------------
    // Diagram
    // -------------------------------------------------------------------------

    /// Place a node
    pub fn add_node(&mut self, node: DiagramNode) {
        self.project.graph.add_node(node);
    }

    /// Apply node changes
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        self.project.graph.apply_node_changes(changes);
    }

    /// Apply cable changes
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        self.project.graph.apply_edge_changes(changes);
    }

    /// Validate and add a cable, returning its id
    pub fn connect(&mut self, proposal: &ConnectionProposal) -> Result<String> {
        self.project.graph.connect(proposal)
    }

    /// Merge cable data; false if the cable is unknown
    pub fn update_edge_data(&mut self, edge_id: &str, patch: CablePatch) -> bool {
        self.project.graph.update_edge_data(edge_id, patch)
    }

    /// Advance a cable through the quick length cycle
    pub fn cycle_cable_length(&mut self, edge_id: &str) -> Option<CableLength> {
        self.project.graph.cycle_cable_length(edge_id)
    }

    // -------------------------------------------------------------------------
    // Metadata and selection
    // -------------------------------------------------------------------------

    /// Apply a metadata patch
    pub fn update_metadata(&mut self, patch: MetadataPatch) {
        let p = &mut self.project;
        if let Some(v) = patch.project_name {
            p.project_name = v;
        }
        if let Some(v) = patch.client_name {
            p.client_name = v;
        }
        if let Some(v) = patch.venue {
            p.venue = v;
        }
        if let Some(v) = patch.staff_name {
            p.staff_name = v;
        }
        if let Some(v) = patch.start_date {
            p.start_date = v;
        }
        if let Some(v) = patch.end_date {
            p.end_date = v;
        }
        if let Some(v) = patch.setup_date {
            p.setup_date = Some(v);
        }
    }

    /// Toggle whether a catalog item is offered; returns the new state
    pub fn toggle_equipment_selection(&mut self, equipment_id: &str) -> bool {
        let ids = &mut self.project.selected_equipment_ids;
        if let Some(pos) = ids.iter().position(|id| id == equipment_id) {
            ids.remove(pos);
            false
        } else {
            ids.push(equipment_id.to_string());
            true
        }
    }

    /// Record the cloud file this project is saved to
    pub fn set_drive_file_id(&mut self, file_id: &str) {
        self.project.drive_file_id = file_id.to_string();
    }

    /// Record the cloud folder chosen for this project
    pub fn set_drive_folder(&mut self, folder_id: &str, folder_name: &str) {
        self.project.drive_folder_id = folder_id.to_string();
        self.project.drive_folder_name = folder_name.to_string();
    }

    // -------------------------------------------------------------------------
    // Costs
    // -------------------------------------------------------------------------

    /// Add a cost line, returning its id
    pub fn add_cost(&mut self, cost: NewCost) -> String {
        let id = format!("cost-{}", uuid::Uuid::new_v4());
        self.project.additional_costs.push(AdditionalCost {
            id: id.clone(),
            name: cost.name,
            category: cost.category,
            unit_price: cost.unit_price,
            quantity: cost.quantity,
            note: cost.note,
        });
        id
    }

    /// Update a cost line; false if the id is unknown
    pub fn update_cost(&mut self, id: &str, patch: CostPatch) -> bool {
        let Some(cost) = self.project.additional_costs.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(v) = patch.name {
            cost.name = v;
        }
        if let Some(v) = patch.category {
            cost.category = v;
        }
        if let Some(v) = patch.unit_price {
            cost.unit_price = v;
        }
        if let Some(v) = patch.quantity {
            cost.quantity = v;
        }
        if patch.note.is_some() {
            cost.note = patch.note;
        }
        true
    }

    /// Remove a cost line; false if the id is unknown
    pub fn remove_cost(&mut self, id: &str) -> bool {
        let before = self.project.additional_costs.len();
        self.project.additional_costs.retain(|c| c.id != id);
        self.project.additional_costs.len() < before
    }

    /// Type a name into the trailing draft row. A non-empty name creates a
    /// line from the draft and resets the draft.
    pub fn type_into_draft(&mut self, draft: &mut CostDraft, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        let taken = std::mem::take(draft);
        Some(self.add_cost(NewCost {
            name: name.to_string(),
            category: taken.category,
            unit_price: taken.unit_price,
            quantity: taken.quantity,
            note: None,
        }))
    }

    // -------------------------------------------------------------------------
    // Derived views
    // -------------------------------------------------------------------------

    /// Inventory check over the effective window
    #[must_use]
    pub fn check_inventory(&self, schedule: &dyn ScheduleSource) -> ConflictReport {
        conflict::detect(
            self.project.graph.nodes(),
            self.project.effective_window(),
            schedule,
        )
    }

    /// Priced breakdown at the given markup
    #[must_use]
    pub fn quotation(&self, rate: MarkupRate) -> Quotation {
        Quotation::build(&self.project, rate)
    }
}
