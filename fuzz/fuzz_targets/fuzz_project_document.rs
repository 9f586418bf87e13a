// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use av_planner::project::Project;
use av_planner::quotation::MarkupRate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(project) = Project::from_document(data) else {
        return;
    };

    // Anything that parses must survive a save and reload unchanged
    let doc = project.to_document().expect("serialize parsed project");
    let bytes = serde_json::to_vec(&doc).expect("encode document");
    let reloaded = Project::from_document(&bytes).expect("reload saved project");
    assert_eq!(reloaded.graph, project.graph);

    let quote = av_planner::quotation::Quotation::build(&project, MarkupRate::default());
    let _ = quote.to_csv();
});
