use std::path::PathBuf;

use clap::Parser;
use derive_getters::Getters;

#[derive(Parser, Debug, Getters)]
#[command(name = "noise-maker")]
#[command(about = "Generate synthetic per-host access logs for access-age", long_about = None)]
pub struct CliArgs {
    #[arg(long, default_value = "logs")]
    log_root: PathBuf,

    #[arg(long, default_value_t = 2)]
    hosts: usize,

    /// Log files per host
    #[arg(long, default_value_t = 2)]
    files: usize,

    /// Lines per log file
    #[arg(long, default_value_t = 10_000)]
    lines: usize,

    /// Day the lines are logged on, as dd/Mon/yyyy; defaults to today
    #[arg(long)]
    day: Option<String>,

    #[arg(long, default_value = "prod-api")]
    host_prefix: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}
