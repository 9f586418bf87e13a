// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the av-planner CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command isolated to a temporary data directory and config file
fn planner(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("av-planner").unwrap();
    cmd.env("AVPLANNER_DATA_DIR", data_dir.path())
        .env("AVPLANNER_CONFIG", data_dir.path().join("config.toml"))
        .env_remove("AVPLANNER_ACCESS_TOKEN")
        .env_remove("AVPLANNER_SCHEDULE_PATH")
        .env_remove("AVPLANNER_CATALOG_PATH")
        .env_remove("AVPLANNER_TEAM_FOLDER_ID")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Start a dated project with a camera wired into a switcher
fn wired_project(data_dir: &TempDir) {
    planner(data_dir).args(["new", "Spring Gala"]).assert().success();
    planner(data_dir)
        .args(["info", "--start", "2025-12-10", "--end", "2025-12-11", "--setup", "2025-12-10"])
        .assert()
        .success();
    planner(data_dir).args(["place", "cam-sony-fx6"]).assert().success();
    planner(data_dir)
        .args(["place", "sw-atem-mini-pro", "--x", "300"])
        .assert()
        .success();
    planner(data_dir)
        .args(["connect", "Sony FX6:hdmi-out", "ATEM Mini Pro:hdmi-in-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Connected HDMI cable"))
        .stdout(predicate::str::contains("length: 1m"));
}

// =============================================================================
// Diagram Commands
// =============================================================================

#[test]
fn test_new_project_starts_empty() {
    let data_dir = TempDir::new().unwrap();

    planner(&data_dir)
        .args(["new", "Spring Gala"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New project proj-"));

    planner(&data_dir)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Spring Gala"))
        .stdout(predicate::str::contains("diagram: 0 nodes, 0 cables"));
}

#[test]
fn test_place_and_connect() {
    let data_dir = TempDir::new().unwrap();
    wired_project(&data_dir);

    planner(&data_dir)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("diagram: 2 nodes, 1 cables"));

    planner(&data_dir)
        .args(["show", "Sony FX6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hdmi-out -> "))
        .stdout(predicate::str::contains("feeds: "));
}

#[test]
fn test_incompatible_connect_rejected() {
    let data_dir = TempDir::new().unwrap();
    wired_project(&data_dir);
    planner(&data_dir).args(["place", "mic-shure-sm58"]).assert().success();

    planner(&data_dir)
        .args(["connect", "Shure SM58:xlr-out", "ATEM Mini Pro:hdmi-in-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot connect XLR to HDMI"))
        .stderr(predicate::str::contains("Cable not added"));

    planner(&data_dir)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 nodes, 1 cables"));
}

#[test]
fn test_unknown_equipment_rejected() {
    let data_dir = TempDir::new().unwrap();

    planner(&data_dir)
        .args(["place", "no-such-thing"])
        .assert()
        .failure();
}

// =============================================================================
// Inventory Check
// =============================================================================

#[test]
fn test_check_reports_conflict() {
    let data_dir = TempDir::new().unwrap();
    let schedule = data_dir.path().join("schedule.json");
    fs::write(
        &schedule,
        r#"{
            "bookings": [{
                "id": "b1",
                "projectName": "Other Show",
                "startDate": "2025-12-11",
                "endDate": "2025-12-12",
                "equipmentUsage": {"cam-sony-fx6": 2}
            }],
            "inventoryLimits": {"cam-sony-fx6": 3}
        }"#,
    )
    .unwrap();

    wired_project(&data_dir);

    planner(&data_dir)
        .env("AVPLANNER_SCHEDULE_PATH", &schedule)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Low Stock"));

    planner(&data_dir).args(["place", "cam-sony-fx6"]).assert().success();

    planner(&data_dir)
        .env("AVPLANNER_SCHEDULE_PATH", &schedule)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conflict Detected"));
}

#[test]
fn test_check_json_status() {
    let data_dir = TempDir::new().unwrap();
    let schedule = data_dir.path().join("schedule.json");
    fs::write(&schedule, r#"{"bookings": [], "inventoryLimits": {}}"#).unwrap();
    wired_project(&data_dir);

    planner(&data_dir)
        .env("AVPLANNER_SCHEDULE_PATH", &schedule)
        .args(["--json", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"findings\": []"));
}

// =============================================================================
// Costs and Quotation
// =============================================================================

#[test]
fn test_quote_csv_with_cost_line() {
    let data_dir = TempDir::new().unwrap();
    wired_project(&data_dir);

    planner(&data_dir)
        .args(["cost", "add", "Truck", "--category", "transport", "--price", "20000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added cost line Truck"));

    planner(&data_dir)
        .args(["quote", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Category,Item,Unit Price,Qty,Total"))
        .stdout(predicate::str::contains("Equipment,Sony FX6,30000,1,30000"))
        .stdout(predicate::str::contains("Cable,HDMI Cable 1m,100,1,100"))
        .stdout(predicate::str::contains("Transport,Truck,20000,1,20000"))
        .stdout(predicate::str::contains(",,,Subtotal,58100"))
        .stdout(predicate::str::contains(",,,Grand Total,63910"));
}

#[test]
fn test_quote_rejects_unknown_format() {
    let data_dir = TempDir::new().unwrap();
    wired_project(&data_dir);

    planner(&data_dir)
        .args(["quote", "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown quote format"));
}

#[test]
fn test_cost_unknown_action() {
    let data_dir = TempDir::new().unwrap();

    planner(&data_dir)
        .args(["cost", "frobnicate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown action"));
}

// =============================================================================
// Export and Persistence
// =============================================================================

#[test]
fn test_export_dot() {
    let data_dir = TempDir::new().unwrap();
    wired_project(&data_dir);

    planner(&data_dir)
        .args(["export", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph"))
        .stdout(predicate::str::contains("Sony FX6"))
        .stdout(predicate::str::contains("HDMI"));
}

#[test]
fn test_save_without_token_is_local_only() {
    let data_dir = TempDir::new().unwrap();
    wired_project(&data_dir);

    planner(&data_dir)
        .arg("save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved locally:"))
        .stdout(predicate::str::contains("Cloud save skipped"));

    planner(&data_dir)
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved projects (1):"))
        .stdout(predicate::str::contains("Spring Gala"));
}
