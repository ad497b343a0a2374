//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use synod_domain::{ControlMode, Mode};

/// Output format for the end-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Status, counts and the most important notices
    Summary,
    /// Summary plus the complete message log
    Full,
    /// Machine-readable JSON summary
    Json,
}

/// CLI arguments for synod
#[derive(Parser, Debug)]
#[command(name = "synod")]
#[command(author, version, about = "Synod - a deliberation network of specialised roles")]
#[command(long_about = r#"
Synod routes a directive through a fixed network of roles (analyst, critic,
ethics, strategy, ...) one envelope per tick until the tick budget is spent,
ethics vetoes the run, or strategy proposes to terminate.

Configuration files are loaded from (in priority order):
1. SYNOD_* environment variables (SYNOD_ENGINE__MAX_TICKS=50)
2. --config <path>     Explicit config file
3. ./synod.toml        Project-level config
4. ~/.config/synod/config.toml   Global config

Example:
  synod "Plan a neighbourhood festival"
  synod --mode assembly --ticks 120 --offline "Draft a data retention policy"
  synod --restore --snapshot .synod/snapshot.json
"#)]
pub struct Cli {
    /// The directive to deliberate (not required with --restore)
    pub directive: Option<String>,

    /// Routing preset (standard, adaptive, assembly, hierarchical, pipeline, adversarial, exploratory)
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<Mode>,

    /// Tick budget
    #[arg(short, long, value_name = "TICKS")]
    pub ticks: Option<u64>,

    /// Whether strategic proposals may reconfigure the run (static, dynamic)
    #[arg(long, value_parser = parse_control_mode)]
    pub control: Option<ControlMode>,

    /// Ask the generator for offline output
    #[arg(long)]
    pub offline: bool,

    /// Seed of the broadcast sampler
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pause between scheduling turns in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Make the offline ETHICS role reject every n-th tick
    #[arg(long, value_name = "N")]
    pub ethics_fail_every: Option<u64>,

    /// Resume the run stored at the snapshot path instead of starting one
    #[arg(long)]
    pub restore: bool,

    /// Snapshot location (saved on Ctrl-C, loaded by --restore)
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Directory for end-of-run reports
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Write the dispatch transcript as JSONL
    #[arg(long, value_name = "PATH")]
    pub dispatch_log: Option<PathBuf>,

    /// Directory for the rolling diagnostic log
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>().map_err(|e| e.to_string())
}

fn parse_control_mode(s: &str) -> Result<ControlMode, String> {
    s.parse::<ControlMode>()
}
