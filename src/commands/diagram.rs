// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Diagram commands - place equipment and wire cables

use anyhow::{anyhow, bail, Context, Result};
use serde_json::json;
use tracing::info;

use super::{resolve_node, Workspace};
use crate::graph::{ConnectionProposal, EdgeChange, NodeChange};
use crate::types::{CableLength, CablePatch, Position};

/// List the catalog, or only the offered (selected) items
pub fn catalog(ws: &Workspace, offered_only: bool) -> Result<()> {
    let catalog = ws.config.catalog()?;
    let store = ws.open_store()?;
    let selected = &store.project().selected_equipment_ids;

    let items: Vec<_> = if offered_only {
        catalog.offered(selected)
    } else {
        catalog.equipment.iter().collect()
    };

    if ws.json {
        return ws.print_json(&items);
    }
    if items.is_empty() {
        if offered_only {
            println!("Nothing offered yet. Use 'av-planner select <equipment-id>'.");
        } else {
            println!("Catalog is empty.");
        }
        return Ok(());
    }

    for eq in items {
        let mark = if selected.contains(&eq.id) { "*" } else { " " };
        let rate = eq.day_rate.map_or_else(|| "-".to_string(), crate::quotation::format_amount);
        println!(
            "{mark} {:<20} {:<30} {:<6} stock {:>3}  rate {:>8}",
            eq.id,
            eq.name,
            eq.major_category.label(),
            eq.stock_quantity,
            rate
        );
    }
    Ok(())
}

/// Toggle whether a catalog item is offered for placement
pub fn select(ws: &Workspace, equipment_id: &str) -> Result<()> {
    let catalog = ws.config.catalog()?;
    if catalog.get(equipment_id).is_none() {
        bail!("Equipment not found in catalog: {equipment_id}");
    }

    let mut store = ws.open_store()?;
    let now_selected = store.toggle_equipment_selection(equipment_id);
    ws.commit(&store)?;

    if now_selected {
        println!("Offered: {equipment_id}");
    } else {
        println!("No longer offered: {equipment_id}");
    }
    Ok(())
}

/// Place an equipment instance on the diagram
pub fn place(ws: &Workspace, equipment_id: &str, x: f64, y: f64) -> Result<()> {
    let catalog = ws.config.catalog()?;
    let node = catalog.place(equipment_id, Position { x, y })?;
    let node_id = node.id.clone();
    let name = node.display_name().to_string();

    let mut store = ws.open_store()?;
    store.add_node(node);
    ws.commit(&store)?;

    info!("Placed {equipment_id} as {node_id}");
    if ws.json {
        return ws.print_json(&json!({ "id": node_id, "equipmentId": equipment_id }));
    }
    println!("Placed {name}");
    println!("  id: {node_id}");
    Ok(())
}

/// Remove a node and every cable attached to it
pub fn remove_node(ws: &Workspace, node: &str) -> Result<()> {
    let mut store = ws.open_store()?;
    let id = resolve_node(store.graph(), node)?;
    let cables = store.graph().edges_from(&id).len() + store.graph().edges_to(&id).len();

    store.apply_node_changes(&[NodeChange::Remove { id: id.clone() }]);
    ws.commit(&store)?;

    println!("Removed {id} ({cables} cable(s) detached)");
    Ok(())
}

/// Move a node on the canvas
pub fn move_node(ws: &Workspace, node: &str, x: f64, y: f64) -> Result<()> {
    let mut store = ws.open_store()?;
    let id = resolve_node(store.graph(), node)?;

    store.apply_node_changes(&[NodeChange::Position {
        id: id.clone(),
        position: Position { x, y },
    }]);
    ws.commit(&store)?;

    println!("Moved {id} to ({x}, {y})");
    Ok(())
}

fn split_endpoint(endpoint: &str) -> Result<(&str, &str)> {
    endpoint
        .rsplit_once(':')
        .filter(|(node, handle)| !node.is_empty() && !handle.is_empty())
        .ok_or_else(|| anyhow!("Expected <node>:<connector>, got '{endpoint}'"))
}

/// Wire a cable between two connectors
pub fn connect(ws: &Workspace, from: &str, to: &str) -> Result<()> {
    let (source, source_handle) = split_endpoint(from)?;
    let (target, target_handle) = split_endpoint(to)?;

    let mut store = ws.open_store()?;
    let proposal = ConnectionProposal {
        source: resolve_node(store.graph(), source)?,
        source_handle: source_handle.to_string(),
        target: resolve_node(store.graph(), target)?,
        target_handle: target_handle.to_string(),
    };

    let edge_id = match store.connect(&proposal) {
        Ok(id) => id,
        Err(e) if e.is_validation() => {
            eprintln!("{}", ws.bad(&e.to_string()));
            bail!("Cable not added");
        }
        Err(e) => return Err(e.into()),
    };
    ws.commit(&store)?;

    let cable = store
        .graph()
        .edge(&edge_id)
        .with_context(|| format!("Cable {edge_id} missing after connect"))?;
    if ws.json {
        return ws.print_json(cable);
    }
    println!(
        "Connected {} cable {} -> {}",
        cable.data.signal_type, proposal.source, proposal.target
    );
    println!("  id: {edge_id}");
    println!("  length: {}", cable.data.length);
    Ok(())
}

/// Change a cable's length or signal type
pub fn cable(
    ws: &Workspace,
    edge_id: &str,
    length: Option<String>,
    cycle: bool,
    signal_type: Option<String>,
) -> Result<()> {
    let mut store = ws.open_store()?;
    if store.graph().edge(edge_id).is_none() {
        bail!("Cable not found: {edge_id}");
    }

    if cycle {
        store.cycle_cable_length(edge_id);
    }
    let length = length.as_deref().map(str::parse::<CableLength>).transpose()?;
    if length.is_some() || signal_type.is_some() {
        store.update_edge_data(
            edge_id,
            CablePatch {
                signal_type,
                length,
            },
        );
    }
    ws.commit(&store)?;

    if let Some(cable) = store.graph().edge(edge_id) {
        if ws.json {
            return ws.print_json(cable);
        }
        println!("{edge_id}: {} {}", cable.data.signal_type, cable.data.length);
    }
    Ok(())
}

/// Remove a cable
pub fn disconnect(ws: &Workspace, edge_id: &str) -> Result<()> {
    let mut store = ws.open_store()?;
    if store.graph().edge(edge_id).is_none() {
        bail!("Cable not found: {edge_id}");
    }

    store.apply_edge_changes(&[EdgeChange::Remove {
        id: edge_id.to_string(),
    }]);
    ws.commit(&store)?;

    println!("Removed cable {edge_id}");
    Ok(())
}

/// Show a node: connectors, attached cables and the signal path downstream
pub fn show(ws: &Workspace, node: &str) -> Result<()> {
    let store = ws.open_store()?;
    let graph = store.graph();
    let id = resolve_node(graph, node)?;
    let node = graph
        .node(&id)
        .with_context(|| format!("Node not found: {id}"))?;
    let downstream: Vec<_> = graph.downstream(&id).iter().map(|n| n.id.clone()).collect();

    if ws.json {
        return ws.print_json(&json!({
            "node": node,
            "incoming": graph.edges_to(&id),
            "outgoing": graph.edges_from(&id),
            "downstream": downstream,
        }));
    }

    println!("{}", ws.strong(&format!("{} ({})", node.display_name(), node.id)));
    if let Some(data) = node.equipment() {
        println!("  equipment: {}", data.catalog_id());
        println!("  position:  ({}, {})", node.position.x, node.position.y);
        println!("  connectors:");
        for c in data.connectors() {
            println!("    {:<14} {:<20} {:<8} {:?}", c.id, c.name, c.signal_type, c.direction);
        }
    }

    let incoming = graph.edges_to(&id);
    if !incoming.is_empty() {
        println!("  incoming:");
        for e in incoming {
            println!("    {}:{} -> {} ({} {})", e.source, e.source_handle, e.target_handle, e.data.signal_type, e.data.length);
        }
    }
    let outgoing = graph.edges_from(&id);
    if !outgoing.is_empty() {
        println!("  outgoing:");
        for e in outgoing {
            println!("    {} -> {}:{} ({} {})", e.source_handle, e.target, e.target_handle, e.data.signal_type, e.data.length);
        }
    }
    if !downstream.is_empty() {
        println!("  feeds: {}", downstream.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_endpoint() {
        assert_eq!(split_endpoint("node-1:hdmi-out").unwrap(), ("node-1", "hdmi-out"));
        assert!(split_endpoint("node-1").is_err());
        assert!(split_endpoint(":x").is_err());
    }
}
