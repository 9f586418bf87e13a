// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for the planner core
//!
//! These tests verify critical invariants:
//! 1. Connection validation - type-exact and symmetric
//! 2. Usage and conflicts - counts, inclusive overlap, one finding per item
//! 3. Quotation - grouping, markup, order-independent totals

use av_planner::catalog::Catalog;
use av_planner::conflict::{self, current_usage, Finding, InventoryStatus};
use av_planner::graph::{ConnectionProposal, DiagramGraph, NodeChange};
use av_planner::project::{NewCost, Project, ProjectStore};
use av_planner::quotation::{round_amount, MarkupRate};
use av_planner::schedule::StaticSchedule;
use av_planner::types::{
    CableLength, CablePatch, Connector, CostCategory, DateWindow, DiagramNode, Direction,
    Equipment, EquipmentCategory, GlobalBooking, Position,
};
use av_planner::validator;
use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Test Helpers
// =============================================================================

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
}

fn make_equipment(id: &str, connectors: Vec<Connector>) -> Equipment {
    Equipment {
        id: id.into(),
        name: id.to_uppercase(),
        major_category: EquipmentCategory::Video,
        sub_category: "test".into(),
        manufacturer: "Test".into(),
        model: None,
        connectors,
        stock_quantity: 1,
        day_rate: Some(1000.0),
        input_port_count: 0,
        output_port_count: 0,
    }
}

fn make_port(id: &str, signal_type: &str, direction: Direction) -> Connector {
    Connector {
        id: id.into(),
        name: id.into(),
        signal_type: signal_type.into(),
        direction,
    }
}

fn make_node(equipment: &Equipment) -> DiagramNode {
    av_planner::catalog::node_for(equipment, Position::default())
}

fn make_booking(id: &str, start: NaiveDate, end: NaiveDate, usage: &[(&str, u32)]) -> GlobalBooking {
    GlobalBooking {
        id: id.into(),
        project_name: format!("Booking {id}"),
        start_date: start,
        end_date: end,
        venue: String::new(),
        equipment_usage: usage.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
    }
}

fn camera_schedule(bookings: Vec<GlobalBooking>) -> StaticSchedule {
    StaticSchedule::new(bookings, BTreeMap::from([("cam-sony-fx6".to_string(), 3)]))
}

fn place_many(ids: &[&str]) -> Vec<DiagramNode> {
    let catalog = Catalog::builtin();
    ids.iter()
        .map(|id| catalog.place(id, Position::default()).unwrap())
        .collect()
}

// =============================================================================
// Connection Validation Tests
// =============================================================================

#[test]
fn test_incompatible_types_named_in_rejection() {
    let camera = make_node(&make_equipment("cam", vec![make_port("out", "HDMI", Direction::Output)]));
    let monitor = make_node(&make_equipment("mon", vec![make_port("in", "SDI", Direction::Input)]));

    let err = validator::validate(&camera, "out", &monitor, "in").unwrap_err();
    let message = err.to_string();

    assert!(message.contains("HDMI"), "message was: {message}");
    assert!(message.contains("SDI"), "message was: {message}");
}

#[test]
fn test_rejected_connection_leaves_graph_unchanged() {
    let mut graph = DiagramGraph::new();
    let camera = make_node(&make_equipment("cam", vec![make_port("out", "HDMI", Direction::Output)]));
    let monitor = make_node(&make_equipment("mon", vec![make_port("in", "SDI", Direction::Input)]));
    let (cam_id, mon_id) = (camera.id.clone(), monitor.id.clone());
    graph.add_node(camera);
    graph.add_node(monitor);
    let before = graph.clone();

    let result = graph.connect(&ConnectionProposal {
        source: cam_id,
        source_handle: "out".into(),
        target: mon_id,
        target_handle: "in".into(),
    });

    assert!(result.is_err());
    assert!(result.unwrap_err().is_validation());
    assert_eq!(graph, before);
}

#[test]
fn test_unknown_handle_rejected() {
    let camera = make_node(&make_equipment("cam", vec![make_port("out", "HDMI", Direction::Output)]));
    let monitor = make_node(&make_equipment("mon", vec![make_port("in", "HDMI", Direction::Input)]));

    assert!(validator::validate(&camera, "missing", &monitor, "in").is_err());
    assert!(validator::validate(&camera, "out", &monitor, "missing").is_err());
    assert!(validator::validate(&camera, "out", &monitor, "in").is_ok());
}

proptest! {
    #[test]
    fn prop_validation_is_type_exact_and_symmetric(
        a in prop::sample::select(vec!["HDMI", "SDI", "XLR", "USB-C", "Generic", "hdmi"]),
        b in prop::sample::select(vec!["HDMI", "SDI", "XLR", "USB-C", "Generic", "hdmi"]),
    ) {
        let left = make_node(&make_equipment("l", vec![make_port("p", a, Direction::Bidirectional)]));
        let right = make_node(&make_equipment("r", vec![make_port("p", b, Direction::Bidirectional)]));

        let forward = validator::validate(&left, "p", &right, "p").is_ok();
        let backward = validator::validate(&right, "p", &left, "p").is_ok();

        prop_assert_eq!(forward, a == b);
        prop_assert_eq!(forward, backward);
    }
}

// =============================================================================
// Graph Consistency Tests
// =============================================================================

#[test]
fn test_every_cable_references_existing_nodes_after_removal() {
    let mut store = ProjectStore::new();
    let nodes = place_many(&["cam-sony-fx6", "conv-sdi-hdmi", "disp-55-4k"]);
    let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    for node in nodes {
        store.add_node(node);
    }
    store
        .connect(&ConnectionProposal {
            source: ids[0].clone(),
            source_handle: "sdi-out".into(),
            target: ids[1].clone(),
            target_handle: "sdi-in".into(),
        })
        .unwrap();
    store
        .connect(&ConnectionProposal {
            source: ids[1].clone(),
            source_handle: "hdmi-out".into(),
            target: ids[2].clone(),
            target_handle: "hdmi-in".into(),
        })
        .unwrap();

    store.apply_node_changes(&[NodeChange::Remove { id: ids[1].clone() }]);

    let graph = store.graph();
    assert_eq!(graph.node_count(), 2);
    for edge in graph.edges() {
        assert!(graph.node(&edge.source).is_some());
        assert!(graph.node(&edge.target).is_some());
    }
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_signal_path_follows_cable_direction() {
    let mut graph = DiagramGraph::new();
    let nodes = place_many(&["cam-sony-fx6", "conv-sdi-hdmi", "disp-55-4k"]);
    let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    for node in nodes {
        graph.add_node(node);
    }
    for (from, from_h, to, to_h) in [(0, "sdi-out", 1, "sdi-in"), (1, "hdmi-out", 2, "hdmi-in")] {
        graph
            .connect(&ConnectionProposal {
                source: ids[from].clone(),
                source_handle: from_h.into(),
                target: ids[to].clone(),
                target_handle: to_h.into(),
            })
            .unwrap();
    }

    let from_camera: Vec<_> = graph.downstream(&ids[0]).iter().map(|n| n.id.clone()).collect();
    assert_eq!(from_camera, vec![ids[1].clone(), ids[2].clone()]);
    assert!(graph.downstream(&ids[2]).is_empty());
}

#[test]
fn test_quick_cycle_wraps() {
    let mut length = CableLength::M1;
    let mut seen = vec![length];
    for _ in 0..5 {
        length = length.next_quick();
        seen.push(length);
    }
    assert_eq!(
        seen,
        vec![
            CableLength::M1,
            CableLength::M3,
            CableLength::M5,
            CableLength::M10,
            CableLength::M20,
            CableLength::M1
        ]
    );
    assert_eq!(CableLength::M50.next_quick(), CableLength::M1);
}

// =============================================================================
// Usage and Conflict Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_usage_count_matches_instances(n in 1usize..40, others in 0usize..10, seed in any::<u64>()) {
        let mut ids: Vec<&str> = vec!["mic-shure-sm58"; n];
        ids.extend(std::iter::repeat("cam-sony-fx6").take(others));
        // deterministic shuffle
        let len = ids.len();
        let mut state = seed;
        for i in (1..len).rev() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let j = usize::try_from(state >> 33).unwrap() % (i + 1);
            ids.swap(i, j);
        }

        let usage = current_usage(&place_many(&ids));
        let mic = usage.iter().find(|u| u.equipment_id == "mic-shure-sm58").unwrap();
        prop_assert_eq!(mic.count as usize, n);
    }
}

#[test]
fn test_overlap_inclusive_at_both_boundaries() {
    let window = DateWindow::new(day(10), day(12));

    assert!(window.overlaps(&DateWindow::new(day(5), day(10))));
    assert!(window.overlaps(&DateWindow::new(day(12), day(20))));
    assert!(!window.overlaps(&DateWindow::new(day(5), day(9))));
    assert!(!window.overlaps(&DateWindow::new(day(13), day(20))));
}

#[test]
fn test_boundary_touching_booking_counts() {
    let schedule = camera_schedule(vec![make_booking("b", day(1), day(10), &[("cam-sony-fx6", 2)])]);
    let nodes = place_many(&["cam-sony-fx6", "cam-sony-fx6"]);

    let report = conflict::detect(&nodes, DateWindow::new(day(10), day(12)), &schedule);

    assert_eq!(report.status(), InventoryStatus::Conflict);
}

#[test]
fn test_scenario_two_needed_one_available_is_shortage() {
    let schedule = camera_schedule(vec![make_booking("b", day(1), day(31), &[("cam-sony-fx6", 2)])]);
    let nodes = place_many(&["cam-sony-fx6", "cam-sony-fx6"]);

    let report = conflict::detect(&nodes, DateWindow::new(day(10), day(12)), &schedule);

    match report.finding_for("cam-sony-fx6") {
        Some(Finding::Shortage { needed, available, total_stock, .. }) => {
            assert_eq!(*needed, 2);
            assert_eq!(*available, 1);
            assert_eq!(*total_stock, 3);
        }
        other => panic!("expected shortage, got {other:?}"),
    }
}

#[test]
fn test_scenario_one_needed_one_available_is_low_stock() {
    let schedule = camera_schedule(vec![make_booking("b", day(1), day(31), &[("cam-sony-fx6", 2)])]);
    let nodes = place_many(&["cam-sony-fx6"]);

    let report = conflict::detect(&nodes, DateWindow::new(day(10), day(12)), &schedule);

    assert!(matches!(
        report.finding_for("cam-sony-fx6"),
        Some(Finding::LowStock { remaining: 0, .. })
    ));
    assert_eq!(report.status(), InventoryStatus::LowStock);
}

#[test]
fn test_shortage_dominates_low_stock() {
    let schedule = camera_schedule(vec![
        make_booking("a", day(1), day(31), &[("cam-sony-fx6", 2)]),
        make_booking("b", day(11), day(11), &[("cam-sony-fx6", 2)]),
    ]);

    for count in 0..6 {
        let nodes = place_many(&vec!["cam-sony-fx6"; count]);
        let report = conflict::detect(&nodes, DateWindow::new(day(10), day(12)), &schedule);
        let for_camera = report
            .findings
            .iter()
            .filter(|f| f.equipment_id() == "cam-sony-fx6")
            .count();
        assert!(for_camera <= 1, "{count} cameras produced {for_camera} findings");
    }
}

#[test]
fn test_setup_day_widens_window() {
    let mut project = Project::blank(day(10));
    project.end_date = day(12);
    project.setup_date = Some(day(8));
    let schedule = camera_schedule(vec![make_booking("b", day(1), day(8), &[("cam-sony-fx6", 3)])]);
    let mut store = ProjectStore::with_project(project);
    store.add_node(Catalog::builtin().place("cam-sony-fx6", Position::default()).unwrap());

    let report = store.check_inventory(&schedule);

    assert_eq!(report.window.start, day(8));
    assert_eq!(report.status(), InventoryStatus::Conflict);
}

// =============================================================================
// Quotation Tests
// =============================================================================

fn store_with_costs(costs: &[(f64, f64)]) -> ProjectStore {
    let mut store = ProjectStore::new();
    for (i, (price, qty)) in costs.iter().enumerate() {
        store.add_cost(NewCost {
            name: format!("line {i}"),
            category: CostCategory::Misc,
            unit_price: *price,
            quantity: *qty,
            note: None,
        });
    }
    store
}

proptest! {
    #[test]
    fn prop_totals_independent_of_cost_order(
        costs in prop::collection::vec((0.0f64..1_000_000.0, 0.0f64..50.0), 0..20),
        rotate in 0usize..20,
    ) {
        let forward = store_with_costs(&costs).quotation(MarkupRate::default());

        let mut permuted = costs.clone();
        permuted.reverse();
        if !permuted.is_empty() {
            let k = rotate % permuted.len();
            permuted.rotate_left(k);
        }
        let shuffled = store_with_costs(&permuted).quotation(MarkupRate::default());

        prop_assert_eq!(forward.sub_total.to_bits(), shuffled.sub_total.to_bits());
        prop_assert_eq!(forward.tax.to_bits(), shuffled.tax.to_bits());
        prop_assert_eq!(forward.grand_total.to_bits(), shuffled.grand_total.to_bits());
    }
}

#[test]
fn test_scenario_xlr_cable_groups() {
    let mut store = ProjectStore::new();
    let catalog = Catalog::builtin();
    let mixer = catalog.place("mix-yamaha-mg10", Position::default()).unwrap();
    let mixer_id = mixer.id.clone();
    store.add_node(mixer);

    for (i, length) in [CableLength::M5, CableLength::M5, CableLength::M10].into_iter().enumerate() {
        let mic = catalog.place("mic-shure-sm58", Position::default()).unwrap();
        let mic_id = mic.id.clone();
        store.add_node(mic);
        let edge = store
            .connect(&ConnectionProposal {
                source: mic_id,
                source_handle: "xlr-out".into(),
                target: mixer_id.clone(),
                target_handle: format!("xlr-in-{}", i + 1),
            })
            .unwrap();
        assert!(store.update_edge_data(&edge, CablePatch { length: Some(length), ..Default::default() }));
    }

    let quote = store.quotation(MarkupRate::default());

    assert_eq!(quote.cables.len(), 2);
    let five = quote.cables.iter().find(|c| c.length == CableLength::M5).unwrap();
    let ten = quote.cables.iter().find(|c| c.length == CableLength::M10).unwrap();
    assert_eq!((five.count, round_amount(five.line_total)), (2, 1000));
    assert_eq!((ten.count, round_amount(ten.line_total)), (1, 1000));
}

#[test]
fn test_scenario_equipment_markup() {
    let mut catalog = Catalog::builtin();
    catalog
        .equipment
        .iter_mut()
        .find(|e| e.id == "disp-55-4k")
        .unwrap()
        .day_rate = Some(5000.0);
    let mut store = ProjectStore::new();
    store.add_node(catalog.place("disp-55-4k", Position::default()).unwrap());
    store.add_node(catalog.place("disp-55-4k", Position::default()).unwrap());

    let quote = store.quotation(MarkupRate::new(1.2));

    assert_eq!(round_amount(quote.equipment[0].line_total), 12000);
    assert_eq!(round_amount(quote.sub_total), 12000);
    assert_eq!(round_amount(quote.tax), 1200);
    assert_eq!(round_amount(quote.grand_total), 13200);
}

#[test]
fn test_unpriced_equipment_is_zero() {
    let mut catalog = Catalog::builtin();
    catalog.equipment[0].day_rate = None;
    let id = catalog.equipment[0].id.clone();
    let mut store = ProjectStore::new();
    store.add_node(catalog.place(&id, Position::default()).unwrap());

    let quote = store.quotation(MarkupRate::new(3.0));

    assert_eq!(round_amount(quote.grand_total), 0);
}
