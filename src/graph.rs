// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Diagram graph: placed equipment nodes and the cables between them

use chrono::Utc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::types::{Cable, CableData, CableLength, CablePatch, DiagramNode, EdgeKind, Position};
use crate::validator;

/// Structural change to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum NodeChange {
    /// Move a node
    Position {
        /// Node id
        id: String,
        /// New position
        position: Position,
    },
    /// Toggle selection
    Select {
        /// Node id
        id: String,
        /// New selection state
        selected: bool,
    },
    /// Delete a node and every cable attached to it
    Remove {
        /// Node id
        id: String,
    },
}

/// Structural change to a cable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EdgeChange {
    /// Toggle selection
    Select {
        /// Cable id
        id: String,
        /// New selection state
        selected: bool,
    },
    /// Delete a cable
    Remove {
        /// Cable id
        id: String,
    },
}

/// A proposed cable between two handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProposal {
    /// Source node id
    pub source: String,
    /// Source connector id
    pub source_handle: String,
    /// Target node id
    pub target: String,
    /// Target connector id
    pub target_handle: String,
}

/// The diagram: nodes and cables in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramGraph {
    nodes: Vec<DiagramNode>,
    edges: Vec<Cable>,
}

impl DiagramGraph {
    /// Create an empty diagram
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. Ids are generated collision-resistant, so no
    /// duplicate check is made.
    pub fn add_node(&mut self, node: DiagramNode) {
        debug!("Adding node {}", node.id);
        self.nodes.push(node);
    }

    /// Apply node changes in order. Changes naming unknown nodes are skipped.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        for change in changes {
            match change {
                NodeChange::Position { id, position } => {
                    if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) {
                        node.position = *position;
                    }
                }
                NodeChange::Select { id, selected } => {
                    if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) {
                        node.selected = *selected;
                    }
                }
                NodeChange::Remove { id } => {
                    let before = self.nodes.len();
                    self.nodes.retain(|n| &n.id != id);
                    if self.nodes.len() < before {
                        self.edges.retain(|e| &e.source != id && &e.target != id);
                        debug!("Removed node {id} and its cables");
                    }
                }
            }
        }
    }

    /// Apply cable changes in order. Changes naming unknown cables are skipped.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = self.edges.iter_mut().find(|e| &e.id == id) {
                        edge.selected = *selected;
                    }
                }
                EdgeChange::Remove { id } => {
                    self.edges.retain(|e| &e.id != id);
                }
            }
        }
    }

    /// Validate and add a cable. Returns the id of the new cable, or of the
    /// existing cable when the same handles are already connected.
    pub fn connect(&mut self, proposal: &ConnectionProposal) -> Result<String> {
        let source = self
            .node(&proposal.source)
            .ok_or_else(|| PlannerError::UnknownNode(proposal.source.clone()))?;
        let target = self
            .node(&proposal.target)
            .ok_or_else(|| PlannerError::UnknownNode(proposal.target.clone()))?;

        let signal_type = validator::validate(
            source,
            &proposal.source_handle,
            target,
            &proposal.target_handle,
        )?;

        if let Some(existing) = self.edges.iter().find(|e| {
            e.source == proposal.source
                && e.source_handle == proposal.source_handle
                && e.target == proposal.target
                && e.target_handle == proposal.target_handle
        }) {
            return Ok(existing.id.clone());
        }

        let base = format!(
            "e-{}-{}-{}",
            proposal.source,
            proposal.target,
            Utc::now().timestamp_millis()
        );
        // Two cables between the same pair within one millisecond
        let mut id = base.clone();
        let mut n = 1;
        while self.edges.iter().any(|e| e.id == id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        debug!("Connecting {} -> {} ({signal_type})", proposal.source, proposal.target);

        self.edges.push(Cable {
            id: id.clone(),
            kind: EdgeKind::Cable,
            source: proposal.source.clone(),
            source_handle: proposal.source_handle.clone(),
            target: proposal.target.clone(),
            target_handle: proposal.target_handle.clone(),
            selected: false,
            data: CableData {
                signal_type,
                length: CableLength::M1,
            },
        });

        Ok(id)
    }

    /// Merge fields into a cable's data. Returns false if the cable is unknown.
    pub fn update_edge_data(&mut self, edge_id: &str, patch: CablePatch) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == edge_id) else {
            return false;
        };
        if let Some(signal_type) = patch.signal_type {
            edge.data.signal_type = signal_type;
        }
        if let Some(length) = patch.length {
            edge.data.length = length;
        }
        true
    }

    /// Advance a cable to the next quick-cycle length
    pub fn cycle_cable_length(&mut self, edge_id: &str) -> Option<CableLength> {
        let edge = self.edges.iter_mut().find(|e| e.id == edge_id)?;
        edge.data.length = edge.data.length.next_quick();
        Some(edge.data.length)
    }

    /// Get a node by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get a cable by id
    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Cable> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// All nodes
    #[must_use]
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    /// All cables
    #[must_use]
    pub fn edges(&self) -> &[Cable] {
        &self.edges
    }

    /// Cables leaving a node
    #[must_use]
    pub fn edges_from(&self, node_id: &str) -> Vec<&Cable> {
        self.edges.iter().filter(|e| e.source == node_id).collect()
    }

    /// Cables arriving at a node
    #[must_use]
    pub fn edges_to(&self, node_id: &str) -> Vec<&Cable> {
        self.edges.iter().filter(|e| e.target == node_id).collect()
    }

    /// Node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Cable count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the diagram is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build a petgraph view of the current topology
    fn topology(&self) -> (DiGraph<&str, &str>, HashMap<&str, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.id.as_str());
            indices.insert(node.id.as_str(), idx);
        }

        for edge in &self.edges {
            if let (Some(&from), Some(&to)) = (
                indices.get(edge.source.as_str()),
                indices.get(edge.target.as_str()),
            ) {
                graph.add_edge(from, to, edge.id.as_str());
            }
        }

        (graph, indices)
    }

    /// Nodes fed, directly or through other equipment, by the given node
    #[must_use]
    pub fn downstream(&self, node_id: &str) -> Vec<&DiagramNode> {
        let (graph, indices) = self.topology();
        let Some(&start) = indices.get(node_id) else {
            return vec![];
        };

        let mut reached = Vec::new();
        let mut dfs = Dfs::new(&graph, start);
        while let Some(idx) = dfs.next(&graph) {
            if idx != start {
                reached.push(graph[idx]);
            }
        }

        self.nodes
            .iter()
            .filter(|n| reached.contains(&n.id.as_str()))
            .collect()
    }

    /// Export to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph diagram {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        for node in &self.nodes {
            let manufacturer = node
                .equipment()
                .map(|d| d.equipment.manufacturer.as_str())
                .unwrap_or_default();
            let _ = writeln!(
                dot,
                "  \"{}\" [label=\"{}\\n{}\"];",
                dot_escape(&node.id),
                dot_escape(node.display_name()),
                dot_escape(manufacturer)
            );
        }

        dot.push('\n');

        for edge in &self.edges {
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"{} {}\"];",
                dot_escape(&edge.source),
                dot_escape(&edge.target),
                dot_escape(&edge.data.signal_type),
                edge.data.length
            );
        }

        dot.push_str("}\n");
        dot
    }
}

/// Escape a value for a double-quoted DOT string
fn dot_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
