// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Aggregation and quotation
//!
//! Derives priced line items from the diagram and the manual cost lines.
//! Accumulation is unrounded; amounts are rounded only when rendered.

use serde::Serialize;
use std::fmt::Write as _;

use crate::project::Project;
use crate::types::{CableLength, Cable, DiagramNode, EquipmentCategory};

/// Cable price per metre
pub const CABLE_PRICE_PER_METER: f64 = 100.0;

/// Fixed tax rate
pub const TAX_RATE: f64 = 0.10;

/// Signal type shown for cables that carry none
const UNTYPED_SIGNAL: &str = "Signal";

/// Multiplier applied to equipment lines
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct MarkupRate(f64);

impl MarkupRate {
    /// Lowest accepted rate
    pub const MIN: f64 = 0.1;

    /// Rate clamped to the minimum; non-finite input falls back to 1.0
    #[must_use]
    pub fn new(rate: f64) -> Self {
        if rate.is_finite() {
            Self(rate.max(Self::MIN))
        } else {
            Self::default()
        }
    }

    /// Rate as a number
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for MarkupRate {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Equipment placed on the diagram, grouped by catalog id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentLine {
    /// Catalog id
    pub equipment_id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: EquipmentCategory,
    /// Manufacturer
    pub manufacturer: String,
    /// Day rate, 0 when unpriced
    pub unit_price: f64,
    /// Placed instances
    pub count: u32,
    /// `unit_price * count * rate`
    pub line_total: f64,
}

/// Cables grouped by signal type and length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableLine {
    /// Signal type
    pub signal_type: String,
    /// Length of each cable in the group
    pub length: CableLength,
    /// Cables in the group
    pub count: u32,
    /// Summed metres across the group
    pub total_meters: u32,
    /// Price of one cable of this length
    pub unit_price: f64,
    /// `unit_price * count`
    pub line_total: f64,
}

impl CableLine {
    /// Item name used in exports
    #[must_use]
    pub fn item_name(&self) -> String {
        format!("{} Cable {}", self.signal_type, self.length)
    }
}

/// A manual cost line as priced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalLine {
    /// Cost line id
    pub id: String,
    /// Category label
    pub category: String,
    /// Item name
    pub name: String,
    /// Price per unit
    pub unit_price: f64,
    /// Quantity
    pub quantity: f64,
    /// `unit_price * quantity`
    pub line_total: f64,
}

/// Priced breakdown with totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quotation {
    /// Markup applied to equipment lines
    pub rate: MarkupRate,
    /// Equipment lines, in order of first placement
    pub equipment: Vec<EquipmentLine>,
    /// Cable lines, in order of first cable
    pub cables: Vec<CableLine>,
    /// Manual lines, in entry order
    pub additional: Vec<AdditionalLine>,
    /// Sum of all line totals
    pub sub_total: f64,
    /// `sub_total * TAX_RATE`
    pub tax: f64,
    /// `sub_total + tax`
    pub grand_total: f64,
}

/// Sum in a canonical order so the result does not depend on line order
fn stable_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}

fn equipment_lines(nodes: &[DiagramNode], rate: MarkupRate) -> Vec<EquipmentLine> {
    let mut lines: Vec<EquipmentLine> = Vec::new();
    for data in nodes.iter().filter_map(DiagramNode::equipment) {
        let id = data.catalog_id();
        if id.is_empty() {
            continue;
        }
        match lines.iter_mut().find(|l| l.equipment_id == id) {
            Some(line) => line.count += 1,
            None => lines.push(EquipmentLine {
                equipment_id: id.to_string(),
                name: data.equipment.name.clone(),
                category: data.equipment.major_category,
                manufacturer: data.equipment.manufacturer.clone(),
                unit_price: data.equipment.day_rate.unwrap_or(0.0),
                count: 1,
                line_total: 0.0,
            }),
        }
    }
    for line in &mut lines {
        line.line_total = line.unit_price * f64::from(line.count) * rate.value();
    }
    lines
}

fn signal_label(cable: &Cable) -> &str {
    let signal = cable.data.signal_type.as_str();
    if signal.is_empty() {
        UNTYPED_SIGNAL
    } else {
        signal
    }
}

fn cable_lines(edges: &[Cable]) -> Vec<CableLine> {
    let mut lines: Vec<CableLine> = Vec::new();
    for cable in edges {
        let signal = signal_label(cable);
        let length = cable.data.length;
        match lines
            .iter_mut()
            .find(|l| l.signal_type == signal && l.length == length)
        {
            Some(line) => {
                line.count += 1;
                line.total_meters += length.meters();
            }
            None => lines.push(CableLine {
                signal_type: signal.to_string(),
                length,
                count: 1,
                total_meters: length.meters(),
                unit_price: f64::from(length.meters()) * CABLE_PRICE_PER_METER,
                line_total: 0.0,
            }),
        }
    }
    for line in &mut lines {
        line.line_total = line.unit_price * f64::from(line.count);
    }
    lines
}

impl Quotation {
    /// Price the project's diagram and cost lines at the given markup
    #[must_use]
    pub fn build(project: &Project, rate: MarkupRate) -> Self {
        let equipment = equipment_lines(project.graph.nodes(), rate);
        let cables = cable_lines(project.graph.edges());
        let additional: Vec<AdditionalLine> = project
            .additional_costs
            .iter()
            .map(|c| AdditionalLine {
                id: c.id.clone(),
                category: c.category.label().to_string(),
                name: c.name.clone(),
                unit_price: c.unit_price,
                quantity: c.quantity,
                line_total: c.line_total(),
            })
            .collect();

        let sub_total = stable_sum(
            equipment
                .iter()
                .map(|l| l.line_total)
                .chain(cables.iter().map(|l| l.line_total))
                .chain(additional.iter().map(|l| l.line_total))
                .collect(),
        );
        let tax = sub_total * TAX_RATE;

        Self {
            rate,
            equipment,
            cables,
            additional,
            sub_total,
            tax,
            grand_total: sub_total + tax,
        }
    }

    /// Flatten to CSV: one row per line, then subtotal, tax and grand total
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::from("Category,Item,Unit Price,Qty,Total\n");
        for line in &self.equipment {
            push_row(
                &mut out,
                &[
                    "Equipment",
                    &line.name,
                    &round_amount(line.unit_price).to_string(),
                    &line.count.to_string(),
                    &round_amount(line.line_total).to_string(),
                ],
            );
        }
        for line in &self.cables {
            push_row(
                &mut out,
                &[
                    "Cable",
                    &line.item_name(),
                    &round_amount(line.unit_price).to_string(),
                    &line.count.to_string(),
                    &round_amount(line.line_total).to_string(),
                ],
            );
        }
        for line in &self.additional {
            push_row(
                &mut out,
                &[
                    &line.category,
                    &line.name,
                    &round_amount(line.unit_price).to_string(),
                    &format_quantity(line.quantity),
                    &round_amount(line.line_total).to_string(),
                ],
            );
        }
        let _ = writeln!(out, ",,,Subtotal,{}", round_amount(self.sub_total));
        let _ = writeln!(out, ",,,Tax,{}", round_amount(self.tax));
        let _ = write!(out, ",,,Grand Total,{}", round_amount(self.grand_total));
        out
    }

    /// Plain-text print view
    #[must_use]
    pub fn render_text(&self, project: &Project) -> String {
        let mut out = String::new();
        let title = if project.project_name.is_empty() {
            "Untitled"
        } else {
            &project.project_name
        };
        let _ = writeln!(out, "QUOTATION - {title}");
        if !project.client_name.is_empty() {
            let _ = writeln!(out, "Client: {}", project.client_name);
        }
        let _ = writeln!(
            out,
            "Period: {} to {}   Rate: x{}",
            project.start_date, project.end_date, self.rate.value()
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<40} {:>12} {:>6} {:>14}", "Item", "Unit Price", "Qty", "Amount");
        let _ = writeln!(out, "{}", "-".repeat(75));

        let section = |out: &mut String, heading: &str, rows: Vec<(String, f64, String, f64)>| {
            if rows.is_empty() {
                return;
            }
            let _ = writeln!(out, "[{heading}]");
            for (name, unit, qty, total) in rows {
                let _ = writeln!(
                    out,
                    "{:<40} {:>12} {:>6} {:>14}",
                    name,
                    format_amount(unit),
                    qty,
                    format_amount(total)
                );
            }
        };

        section(
            &mut out,
            "Equipment",
            self.equipment
                .iter()
                .map(|l| (l.name.clone(), l.unit_price, l.count.to_string(), l.line_total))
                .collect(),
        );
        section(
            &mut out,
            "Cables",
            self.cables
                .iter()
                .map(|l| (l.item_name(), l.unit_price, l.count.to_string(), l.line_total))
                .collect(),
        );
        section(
            &mut out,
            "Additional",
            self.additional
                .iter()
                .map(|l| {
                    (
                        format!("{} ({})", l.name, l.category),
                        l.unit_price,
                        format_quantity(l.quantity),
                        l.line_total,
                    )
                })
                .collect(),
        );

        let _ = writeln!(out, "{}", "-".repeat(75));
        let _ = writeln!(out, "{:<60} {:>14}", "Subtotal", format_amount(self.sub_total));
        let _ = writeln!(out, "{:<60} {:>14}", "Tax (10%)", format_amount(self.tax));
        let _ = writeln!(out, "{:<60} {:>14}", "Grand Total", format_amount(self.grand_total));
        out
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Round a monetary value to the nearest whole unit
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_amount(value: f64) -> i64 {
    value.round() as i64
}

/// Rounded amount with thousands separators, e.g. `12,000`
#[must_use]
pub fn format_amount(value: f64) -> String {
    let rounded = round_amount(value);
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        quantity.to_string()
    }
}

/// Equipment row of the pick list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickItem {
    /// Catalog id
    pub equipment_id: String,
    /// Category
    pub category: EquipmentCategory,
    /// Display name
    pub name: String,
    /// Manufacturer
    pub manufacturer: String,
    /// Units to pull
    pub quantity: u32,
}

/// Cable row of the pick list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickCable {
    /// Signal type
    pub signal_type: String,
    /// Length
    pub length: CableLength,
    /// Cables to pull
    pub quantity: u32,
}

/// What to pull from the warehouse for this diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickList {
    /// Equipment rows
    pub equipment: Vec<PickItem>,
    /// Cable rows
    pub cables: Vec<PickCable>,
}

impl PickList {
    /// Count equipment and cables on the project's diagram
    #[must_use]
    pub fn build(project: &Project) -> Self {
        let equipment = equipment_lines(project.graph.nodes(), MarkupRate::default())
            .into_iter()
            .map(|l| PickItem {
                equipment_id: l.equipment_id,
                category: l.category,
                name: l.name,
                manufacturer: l.manufacturer,
                quantity: l.count,
            })
            .collect();
        let cables = cable_lines(project.graph.edges())
            .into_iter()
            .map(|l| PickCable {
                signal_type: l.signal_type,
                length: l.length,
                quantity: l.count,
            })
            .collect();
        Self { equipment, cables }
    }

    /// Total units across equipment and cables
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.equipment.iter().map(|i| i.quantity).sum::<u32>()
            + self.cables.iter().map(|c| c.quantity).sum::<u32>()
    }

    /// Plain-text rendering
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "PICK LIST ({} items)", self.total_items());
        let _ = writeln!(out);
        let _ = writeln!(out, "Equipment:");
        if self.equipment.is_empty() {
            let _ = writeln!(out, "  (no equipment on the diagram)");
        }
        for item in &self.equipment {
            let _ = writeln!(
                out,
                "  {:<8} {:<32} {:<20} x{}",
                item.category.label(),
                item.name,
                item.manufacturer,
                item.quantity
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Cables:");
        if self.cables.is_empty() {
            let _ = writeln!(out, "  (no cables)");
        }
        for cable in &self.cables {
            let _ = writeln!(out, "  {:<12} {:<6} x{}", cable.signal_type, cable.length, cable.quantity);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::graph::ConnectionProposal;
    use crate::types::{AdditionalCost, CablePatch, CostCategory, Position};

    fn place(project: &mut Project, catalog: &Catalog, id: &str) -> String {
        let node = catalog.place(id, Position::default()).unwrap();
        let node_id = node.id.clone();
        project.graph.add_node(node);
        node_id
    }

    /// Mics wired into one mixer, one cable per entry in `lengths`
    fn mics_into_mixer(lengths: &[CableLength]) -> Project {
        let catalog = Catalog::builtin();
        let mut project = Project::default();
        let mixer = place(&mut project, &catalog, "mix-yamaha-mg10");
        for (i, length) in lengths.iter().enumerate() {
            let mic = place(&mut project, &catalog, "mic-shure-sm58");
            let edge = project
                .graph
                .connect(&ConnectionProposal {
                    source: mic,
                    source_handle: "xlr-out".into(),
                    target: mixer.clone(),
                    target_handle: format!("xlr-in-{}", i + 1),
                })
                .unwrap();
            project.graph.update_edge_data(
                &edge,
                CablePatch {
                    length: Some(*length),
                    ..Default::default()
                },
            );
        }
        project
    }

    #[test]
    fn test_cable_groups_by_type_and_length() {
        let project = mics_into_mixer(&[CableLength::M5, CableLength::M5, CableLength::M10]);

        let quote = Quotation::build(&project, MarkupRate::default());

        assert_eq!(quote.cables.len(), 2);
        assert_eq!(quote.cables[0].count, 2);
        assert_eq!(quote.cables[0].total_meters, 10);
        assert!((quote.cables[0].unit_price - 500.0).abs() < f64::EPSILON);
        assert!((quote.cables[0].line_total - 1000.0).abs() < f64::EPSILON);
        assert_eq!(quote.cables[1].count, 1);
        assert!((quote.cables[1].line_total - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_equipment_line_applies_markup() {
        let mut catalog = Catalog::builtin();
        let camera = catalog.equipment.iter_mut().find(|e| e.id == "cam-sony-fx6").unwrap();
        camera.day_rate = Some(5000.0);
        let mut project = Project::default();
        place(&mut project, &catalog, "cam-sony-fx6");
        place(&mut project, &catalog, "cam-sony-fx6");

        let quote = Quotation::build(&project, MarkupRate::new(1.2));

        assert_eq!(quote.equipment.len(), 1);
        assert_eq!(quote.equipment[0].count, 2);
        assert_eq!(round_amount(quote.equipment[0].line_total), 12000);
    }

    #[test]
    fn test_markup_rate_floor() {
        assert!((MarkupRate::new(0.0).value() - 0.1).abs() < f64::EPSILON);
        assert!((MarkupRate::new(-3.0).value() - 0.1).abs() < f64::EPSILON);
        assert!((MarkupRate::new(f64::NAN).value() - 1.0).abs() < f64::EPSILON);
        assert!((MarkupRate::new(2.5).value() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_totals_include_tax() {
        let mut project = mics_into_mixer(&[CableLength::M3]);
        project.additional_costs.push(AdditionalCost {
            id: "cost-1".into(),
            name: "Operator".into(),
            category: CostCategory::Labor,
            unit_price: 25000.0,
            quantity: 2.0,
            note: None,
        });

        let quote = Quotation::build(&project, MarkupRate::default());

        // mixer 6000 + mic 1500 + cable 300 + labor 50000
        assert_eq!(round_amount(quote.sub_total), 57800);
        assert_eq!(round_amount(quote.tax), 5780);
        assert_eq!(round_amount(quote.grand_total), 63580);
    }

    #[test]
    fn test_untyped_cable_is_signal() {
        let project = Project::from_document(
            br#"{
                "id": "p1",
                "edges": [{
                    "id": "e1", "source": "a", "sourceHandle": "o",
                    "target": "b", "targetHandle": "i",
                    "data": {"type": "", "length": "1m"}
                }]
            }"#,
        )
        .unwrap();

        let quote = Quotation::build(&project, MarkupRate::default());

        assert_eq!(quote.cables[0].item_name(), "Signal Cable 1m");
    }

    #[test]
    fn test_csv_export() {
        let mut project = mics_into_mixer(&[CableLength::M5]);
        project.additional_costs.push(AdditionalCost {
            id: "cost-1".into(),
            name: "Truck, 2t".into(),
            category: CostCategory::Transport,
            unit_price: 20000.0,
            quantity: 1.0,
            note: None,
        });

        let csv = Quotation::build(&project, MarkupRate::default()).to_csv();

        insta::assert_snapshot!(csv, @r###"
        Category,Item,Unit Price,Qty,Total
        Equipment,Yamaha MG10XU,6000,1,6000
        Equipment,Shure SM58,1500,1,1500
        Cable,XLR Cable 5m,500,1,500
        Transport,"Truck, 2t",20000,1,20000
        ,,,Subtotal,28000
        ,,,Tax,2800
        ,,,Grand Total,30800
        "###);
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(0.4), "0");
        assert_eq!(format_amount(999.5), "1,000");
        assert_eq!(format_amount(1_234_567.0), "1,234,567");
        assert_eq!(format_amount(-12000.0), "-12,000");
    }

    #[test]
    fn test_pick_list_counts() {
        let project = mics_into_mixer(&[CableLength::M5, CableLength::M5]);

        let picks = PickList::build(&project);

        assert_eq!(picks.equipment.len(), 2);
        assert_eq!(picks.equipment[1].quantity, 2);
        assert_eq!(picks.cables.len(), 1);
        assert_eq!(picks.total_items(), 5);
        assert!(picks.render_text().contains("PICK LIST (5 items)"));
    }
}
