// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Equipment catalog - read-only source of placeable equipment

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PlannerError;
use crate::types::{
    Connector, DiagramNode, Direction, Equipment, EquipmentCategory, EquipmentNodeData,
    NodePayload, Position,
};

/// Signal type given to synthesized ports
pub const GENERIC_SIGNAL: &str = "Generic";

/// Flat collection of equipment records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// All equipment
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

impl Catalog {
    /// Create a catalog from records
    #[must_use]
    pub fn new(equipment: Vec<Equipment>) -> Self {
        Self { equipment }
    }

    /// Load a catalog from a JSON file: either `{"equipment": [...]}` or a bare array
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim_start().starts_with('[') {
            let equipment: Vec<Equipment> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            return Ok(Self::new(equipment));
        }
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get an equipment record by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|e| e.id == id)
    }

    /// Records offered for placement: those whose id is selected
    #[must_use]
    pub fn offered(&self, selected: &[String]) -> Vec<&Equipment> {
        self.equipment
            .iter()
            .filter(|e| selected.contains(&e.id))
            .collect()
    }

    /// Build a diagram node for the equipment with the given id
    pub fn place(&self, equipment_id: &str, position: Position) -> Result<DiagramNode, PlannerError> {
        let equipment = self
            .get(equipment_id)
            .ok_or_else(|| PlannerError::UnknownEquipment(equipment_id.to_string()))?;
        Ok(node_for(equipment, position))
    }

    /// Built-in demo inventory
    #[must_use]
    pub fn builtin() -> Self {
        fn port(id: &str, name: &str, signal_type: &str, direction: Direction) -> Connector {
            Connector {
                id: id.into(),
                name: name.into(),
                signal_type: signal_type.into(),
                direction,
            }
        }

        #[allow(clippy::too_many_arguments)]
        fn item(
            id: &str,
            name: &str,
            category: EquipmentCategory,
            sub: &str,
            manufacturer: &str,
            stock: u32,
            day_rate: f64,
            connectors: Vec<Connector>,
        ) -> Equipment {
            Equipment {
                id: id.into(),
                name: name.into(),
                major_category: category,
                sub_category: sub.into(),
                manufacturer: manufacturer.into(),
                model: None,
                connectors,
                stock_quantity: stock,
                day_rate: Some(day_rate),
                input_port_count: 0,
                output_port_count: 0,
            }
        }

        let mut speaker = item(
            "spk-powered-12",
            "Powered Speaker 12\"",
            EquipmentCategory::Audio,
            "speaker",
            "Generic",
            8,
            4000.0,
            vec![],
        );
        speaker.input_port_count = 1;

        Self::new(vec![
            item(
                "cam-sony-fx6",
                "Sony FX6",
                EquipmentCategory::Video,
                "camera",
                "Sony",
                3,
                30000.0,
                vec![
                    port("sdi-out", "SDI Out", "SDI", Direction::Output),
                    port("hdmi-out", "HDMI Out", "HDMI", Direction::Output),
                ],
            ),
            item(
                "sw-atem-mini-pro",
                "ATEM Mini Pro",
                EquipmentCategory::Video,
                "switcher",
                "Blackmagic Design",
                5,
                8000.0,
                vec![
                    port("hdmi-in-1", "HDMI In 1", "HDMI", Direction::Input),
                    port("hdmi-in-2", "HDMI In 2", "HDMI", Direction::Input),
                    port("hdmi-in-3", "HDMI In 3", "HDMI", Direction::Input),
                    port("hdmi-in-4", "HDMI In 4", "HDMI", Direction::Input),
                    port("hdmi-out", "HDMI Out", "HDMI", Direction::Output),
                    port("usb-c", "USB-C Webcam Out", "USB-C", Direction::Bidirectional),
                ],
            ),
            item(
                "conv-sdi-hdmi",
                "Micro Converter SDI to HDMI",
                EquipmentCategory::Video,
                "converter",
                "Blackmagic Design",
                6,
                2000.0,
                vec![
                    port("sdi-in", "SDI In", "SDI", Direction::Input),
                    port("hdmi-out", "HDMI Out", "HDMI", Direction::Output),
                ],
            ),
            item(
                "disp-55-4k",
                "55\" 4K Monitor",
                EquipmentCategory::Video,
                "display",
                "Sony",
                4,
                10000.0,
                vec![port("hdmi-in", "HDMI In", "HDMI", Direction::Input)],
            ),
            item(
                "mic-shure-sm58",
                "Shure SM58",
                EquipmentCategory::Audio,
                "microphone",
                "Shure",
                20,
                1500.0,
                vec![port("xlr-out", "XLR Out", "XLR", Direction::Output)],
            ),
            item(
                "mix-yamaha-mg10",
                "Yamaha MG10XU",
                EquipmentCategory::Audio,
                "mixer",
                "Yamaha",
                2,
                6000.0,
                vec![
                    port("xlr-in-1", "Mic In 1", "XLR", Direction::Input),
                    port("xlr-in-2", "Mic In 2", "XLR", Direction::Input),
                    port("xlr-in-3", "Mic In 3", "XLR", Direction::Input),
                    port("xlr-in-4", "Mic In 4", "XLR", Direction::Input),
                    port("xlr-out-l", "XLR Out L", "XLR", Direction::Output),
                    port("xlr-out-r", "XLR Out R", "XLR", Direction::Output),
                ],
            ),
            speaker,
        ])
    }
}

/// Connectors for a placed node: the listed ones, or generic ports
/// synthesized from the port counts when none are listed
#[must_use]
pub fn node_connectors(equipment: &Equipment) -> Vec<Connector> {
    if !equipment.connectors.is_empty() {
        return equipment.connectors.clone();
    }

    let inputs = (1..=equipment.input_port_count).map(|i| Connector {
        id: format!("in-{i}"),
        name: format!("In {i}"),
        signal_type: GENERIC_SIGNAL.into(),
        direction: Direction::Input,
    });
    let outputs = (1..=equipment.output_port_count).map(|i| Connector {
        id: format!("out-{i}"),
        name: format!("Out {i}"),
        signal_type: GENERIC_SIGNAL.into(),
        direction: Direction::Output,
    });

    inputs.chain(outputs).collect()
}

/// Build a diagram node for an equipment record
#[must_use]
pub fn node_for(equipment: &Equipment, position: Position) -> DiagramNode {
    let mut copy = equipment.clone();
    copy.connectors = node_connectors(equipment);

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    DiagramNode {
        id: format!("node-{}-{}", Utc::now().timestamp_millis(), &suffix[..6]),
        position,
        selected: false,
        payload: NodePayload::Equipment(EquipmentNodeData {
            equipment_id: equipment.id.clone(),
            label: Some(equipment.name.clone()),
            equipment: copy,
        }),
    }
}
