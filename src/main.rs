//! conftree CLI
//!
//! Entry point for the `conftree` command-line tool.

use clap::{Parser, Subcommand};
use conftree::config::{default_host_config_path, PROJECT_CONFIG_FILE};
use conftree::{DumpLevel, EffectiveSettings, OutputFormat, Scenario};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "conftree")]
#[command(about = "Configuration override propagation over a container tree", version)]
struct Cli {
    /// Project settings file (default: ./conftree.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Tracing filter, overrides log.filter (RUST_LOG still wins)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a scenario tree, apply its steps and print the report
    Run {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Snapshot detail (all, trim, critical)
        #[arg(long)]
        level: Option<DumpLevel>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,

        /// Do not record listener callbacks
        #[arg(long)]
        no_events: bool,
    },

    /// Check that a scenario file parses and references known nodes
    Verify {
        /// Scenario TOML file
        scenario: PathBuf,
    },

    /// Print the effective settings and where they came from
    Settings,
}

fn main() {
    let cli = Cli::parse();

    let mut overrides = serde_json::Map::new();
    if let Some(filter) = &cli.log {
        overrides.insert("log".to_string(), serde_json::json!({ "filter": filter }));
    }
    if let Commands::Run {
        level,
        human,
        no_events,
        ..
    } = &cli.command
    {
        if let Some(level) = level {
            overrides.insert("dump".to_string(), serde_json::json!({ "level": level }));
        }
        if *human {
            overrides.insert("output".to_string(), serde_json::json!({ "format": "human" }));
        }
        if *no_events {
            overrides.insert("events".to_string(), serde_json::json!({ "record": false }));
        }
    }

    let settings = load_settings(cli.config.clone(), overrides);

    if let Err(e) = conftree::logging::init(settings.log_filter()) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    match cli.command {
        Commands::Run { scenario, .. } => run_scenario(&scenario, &settings),
        Commands::Verify { scenario } => run_verify(&scenario),
        Commands::Settings => run_settings(&settings),
    }
}

fn load_settings(
    project_path: Option<PathBuf>,
    overrides: serde_json::Map<String, serde_json::Value>,
) -> EffectiveSettings {
    let host_path = default_host_config_path();
    let project_path = project_path.unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    let cli = if overrides.is_empty() {
        None
    } else {
        Some(serde_json::Value::Object(overrides))
    };

    match EffectiveSettings::build(host_path.as_deref(), Some(&project_path), cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Settings error: {}", e);
            process::exit(2);
        }
    }
}

fn run_scenario(path: &Path, settings: &EffectiveSettings) {
    let scenario = match Scenario::load(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading scenario {}: {}", path.display(), e);
            process::exit(2);
        }
    };

    let report = match scenario.run(settings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Scenario failed: {}", e);
            process::exit(1);
        }
    };

    match settings.output_format() {
        OutputFormat::Human => print!("{}", report.to_human()),
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        },
    }
}

fn run_verify(path: &Path) {
    match Scenario::load(path) {
        Ok(scenario) => {
            println!("Scenario valid: {}", path.display());
            println!();
            if let Some(ref name) = scenario.name {
                println!("  Name: {}", name);
            }
            println!("  Nodes: {}", scenario.nodes.len());
            let roots = scenario.nodes.iter().filter(|n| n.parent.is_none()).count();
            println!("  Roots: {}", roots);
            println!("  Steps: {}", scenario.steps.len());
        }
        Err(e) => {
            eprintln!("Scenario error: {}", e);
            process::exit(1);
        }
    }
}

fn run_settings(settings: &EffectiveSettings) {
    match settings.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
