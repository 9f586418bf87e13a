// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Connection validation - gates cable creation on connector type compatibility

use thiserror::Error;

use crate::types::DiagramNode;

/// Why a proposed connection was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The handle does not name a connector on the node
    #[error("unknown connector `{handle}` on node {node_id}")]
    UnknownConnector {
        /// Node that was asked for the connector
        node_id: String,
        /// Handle id that did not match
        handle: String,
    },

    /// Both connectors exist but carry different signal types
    #[error("cannot connect {source_type} to {target_type}")]
    IncompatibleTypes {
        /// Signal type at the source end
        source_type: String,
        /// Signal type at the target end
        target_type: String,
    },
}

/// Validate a proposed cable between two node handles.
///
/// Returns the shared signal type on success. Types must match exactly
/// (case-sensitive). Direction is not checked here.
pub fn validate(
    source: &DiagramNode,
    source_handle: &str,
    target: &DiagramNode,
    target_handle: &str,
) -> Result<String, Rejection> {
    let source_connector = source
        .connector(source_handle)
        .ok_or_else(|| Rejection::UnknownConnector {
            node_id: source.id.clone(),
            handle: source_handle.to_string(),
        })?;
    let target_connector = target
        .connector(target_handle)
        .ok_or_else(|| Rejection::UnknownConnector {
            node_id: target.id.clone(),
            handle: target_handle.to_string(),
        })?;

    if source_connector.signal_type != target_connector.signal_type {
        return Err(Rejection::IncompatibleTypes {
            source_type: source_connector.signal_type.clone(),
            target_type: target_connector.signal_type.clone(),
        });
    }

    Ok(source_connector.signal_type.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Connector, Direction, DiagramNode, Equipment, EquipmentNodeData, NodePayload, Position,
    };

    fn node(id: &str, connectors: Vec<Connector>) -> DiagramNode {
        DiagramNode {
            id: id.into(),
            position: Position::default(),
            selected: false,
            payload: NodePayload::Equipment(EquipmentNodeData {
                equipment_id: format!("eq-{id}"),
                label: None,
                equipment: Equipment {
                    id: format!("eq-{id}"),
                    name: id.into(),
                    major_category: Default::default(),
                    sub_category: String::new(),
                    manufacturer: String::new(),
                    model: None,
                    connectors,
                    stock_quantity: 1,
                    day_rate: None,
                    input_port_count: 0,
                    output_port_count: 0,
                },
            }),
        }
    }

    fn port(id: &str, signal_type: &str, direction: Direction) -> Connector {
        Connector {
            id: id.into(),
            name: id.into(),
            signal_type: signal_type.into(),
            direction,
        }
    }

    #[test]
    fn test_matching_types_accepted() {
        let cam = node("cam", vec![port("sdi-out", "SDI", Direction::Output)]);
        let sw = node("sw", vec![port("sdi-in", "SDI", Direction::Input)]);

        assert_eq!(validate(&cam, "sdi-out", &sw, "sdi-in").unwrap(), "SDI");
    }

    #[test]
    fn test_mismatch_names_both_types() {
        let cam = node("cam", vec![port("hdmi-out", "HDMI", Direction::Output)]);
        let sw = node("sw", vec![port("sdi-in", "SDI", Direction::Input)]);

        let err = validate(&cam, "hdmi-out", &sw, "sdi-in").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("HDMI"));
        assert!(msg.contains("SDI"));
    }

    #[test]
    fn test_type_match_is_case_sensitive() {
        let a = node("a", vec![port("o", "XLR", Direction::Output)]);
        let b = node("b", vec![port("i", "xlr", Direction::Input)]);

        assert!(matches!(
            validate(&a, "o", &b, "i"),
            Err(Rejection::IncompatibleTypes { .. })
        ));
    }

    #[test]
    fn test_unknown_handle_rejected() {
        let a = node("a", vec![port("o", "XLR", Direction::Output)]);
        let b = node("b", vec![port("i", "XLR", Direction::Input)]);

        let err = validate(&a, "missing", &b, "i").unwrap_err();
        assert_eq!(
            err,
            Rejection::UnknownConnector {
                node_id: "a".into(),
                handle: "missing".into()
            }
        );
    }
}
