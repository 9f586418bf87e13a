// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! AV Planner CLI - signal-flow diagrams, inventory checks and quotations

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use av_planner::commands::{self, cost::CostArgs, project::InfoArgs, Workspace};
use av_planner::config;

#[derive(Parser)]
#[command(name = "av-planner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "AVPLANNER_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "AVPLANNER_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a blank working project
    New {
        /// Project name
        name: Option<String>,
    },

    /// Show or update project metadata
    Info {
        /// Project name
        #[arg(long)]
        name: Option<String>,
        /// Client name
        #[arg(long)]
        client: Option<String>,
        /// Venue
        #[arg(long)]
        venue: Option<String>,
        /// Responsible staff
        #[arg(long)]
        staff: Option<String>,
        /// First show day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Last show day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Setup day (YYYY-MM-DD)
        #[arg(long)]
        setup: Option<String>,
    },

    /// List catalog equipment
    Catalog {
        /// Only items offered for this project
        #[arg(long)]
        offered: bool,
    },

    /// Toggle whether a catalog item is offered for placement
    Select {
        /// Catalog equipment id
        equipment_id: String,
    },

    /// Place equipment on the diagram
    Place {
        /// Catalog equipment id
        equipment_id: String,
        /// Canvas x
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        /// Canvas y
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
    },

    /// Remove a node and its cables
    RemoveNode {
        /// Node id, id prefix or label
        node: String,
    },

    /// Move a node
    Move {
        /// Node id, id prefix or label
        node: String,
        /// Canvas x
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        /// Canvas y
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },

    /// Connect two connectors with a cable
    Connect {
        /// Source as <node>:<connector>
        from: String,
        /// Target as <node>:<connector>
        to: String,
    },

    /// Change a cable's length or signal type
    Cable {
        /// Cable id
        edge_id: String,
        /// Length (1m, 2m, 3m, 5m, 10m, 20m, 30m, 50m, 100m)
        #[arg(long, conflicts_with = "cycle")]
        length: Option<String>,
        /// Step through 1m, 3m, 5m, 10m, 20m
        #[arg(long)]
        cycle: bool,
        /// Signal type label
        #[arg(long = "type")]
        signal_type: Option<String>,
    },

    /// Remove a cable
    Disconnect {
        /// Cable id
        edge_id: String,
    },

    /// Manage additional cost lines
    Cost {
        /// Action: add, update, remove, list
        #[arg(default_value = "list")]
        action: String,
        /// Name (add) or cost line id (update, remove)
        target: Option<String>,
        /// New name (update)
        #[arg(long)]
        name: Option<String>,
        /// Category: labor, transport, misc
        #[arg(long)]
        category: Option<String>,
        /// Unit price
        #[arg(long)]
        price: Option<f64>,
        /// Quantity
        #[arg(long)]
        qty: Option<f64>,
        /// Note
        #[arg(long)]
        note: Option<String>,
    },

    /// Check inventory against the booking schedule
    Check,

    /// Show the quotation
    Quote {
        /// Markup rate applied to equipment (minimum 0.1)
        #[arg(long, default_value_t = 1.0)]
        rate: f64,
        /// Output format (text, csv, json)
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Show the pick list
    Picklist,

    /// Save locally and to cloud storage
    Save,

    /// Open a cloud file id, or local:<project-id>
    Open {
        /// File id or local:<project-id>
        source: String,
    },

    /// Search project files in cloud storage
    Files {
        /// Search expression
        #[arg(long)]
        query: Option<String>,
    },

    /// List projects saved on this device
    Projects,

    /// Export the diagram or project
    Export {
        /// Output format (dot, json)
        #[arg(short, long, default_value = "dot")]
        format: String,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Show a node, its cables and what it feeds
    Show {
        /// Node id, id prefix or label
        node: String,
    },

    /// Get or set configuration
    Config {
        /// Configuration key
        key: String,
        /// Value to set (omit to get)
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir.clone() {
        cfg.data_dir = dir;
    }

    // Initialize logging
    let filter = match cli.verbose {
        0 if cli.quiet => EnvFilter::new("error"),
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ws = Workspace::new(cfg, cli.json, !cli.no_color);

    // Execute command
    match cli.command {
        Commands::New { name } => commands::project::new_project(&ws, name),
        Commands::Info { name, client, venue, staff, start, end, setup } => {
            commands::project::info(&ws, InfoArgs { name, client, venue, staff, start, end, setup })
        }
        Commands::Catalog { offered } => commands::diagram::catalog(&ws, offered),
        Commands::Select { equipment_id } => commands::diagram::select(&ws, &equipment_id),
        Commands::Place { equipment_id, x, y } => commands::diagram::place(&ws, &equipment_id, x, y),
        Commands::RemoveNode { node } => commands::diagram::remove_node(&ws, &node),
        Commands::Move { node, x, y } => commands::diagram::move_node(&ws, &node, x, y),
        Commands::Connect { from, to } => commands::diagram::connect(&ws, &from, &to),
        Commands::Cable { edge_id, length, cycle, signal_type } => {
            commands::diagram::cable(&ws, &edge_id, length, cycle, signal_type)
        }
        Commands::Disconnect { edge_id } => commands::diagram::disconnect(&ws, &edge_id),
        Commands::Cost { action, target, name, category, price, qty, note } => {
            commands::cost::run(&ws, &action, target, CostArgs { name, category, price, qty, note })
        }
        Commands::Check => commands::check::run(&ws),
        Commands::Quote { rate, format, output } => commands::quote::run(&ws, rate, &format, output),
        Commands::Picklist => commands::quote::picklist(&ws),
        Commands::Save => commands::persist::save(&ws),
        Commands::Open { source } => commands::persist::open(&ws, &source),
        Commands::Files { query } => commands::persist::files(&ws, query.as_deref()),
        Commands::Projects => commands::project::projects(&ws),
        Commands::Export { format, output } => commands::export::run(&ws, &format, output),
        Commands::Show { node } => commands::diagram::show(&ws, &node),
        Commands::Config { key, value } => commands::config::run(cli.config.as_deref(), &key, value),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
