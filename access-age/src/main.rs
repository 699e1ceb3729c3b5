use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use access_age::config::{Config, FailurePolicy, ParserKind};
use access_age::report::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Histogram of how far back data requests reach, per host",
    long_about = None
)]
struct Args {
    /// Directory holding one sub-directory of log files per host
    #[arg(long)]
    log_root: Option<PathBuf>,

    /// Regex selecting hosts by directory name; repeatable, default all hosts
    #[arg(short = 'H', long = "host")]
    hosts: Vec<String>,

    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    parser: Option<ParserKind>,

    /// Substring every qualifying line must contain; repeatable, replaces the defaults
    #[arg(long = "marker")]
    markers: Vec<String>,

    /// Abort a host when one of its log files cannot be read
    #[arg(long)]
    strict: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(log_root) = &self.log_root {
            config.log_root = log_root.clone();
        }
        if let Some(parser) = self.parser {
            config.parser = parser;
        }
        if !self.markers.is_empty() {
            config.markers = self.markers.clone();
        }
        if self.strict {
            config.policy = FailurePolicy::Strict;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.config()?;
    let summaries = access_age::run(&config, &args.hosts)?;
    let rendered = report::render(&summaries, args.format)?;

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .context("failed to write report")?,
    }
    Ok(())
}
