mod args;
mod generator;
mod writer;

use anyhow::{Context, Result};
use args::CliArgs;
use chrono::{Local, NaiveDate};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use writer::write_host_logs;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let day = match args.day() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%d/%b/%Y")
            .with_context(|| format!("--day {raw} is not dd/Mon/yyyy"))?,
        None => Local::now().date_naive(),
    };
    let mut rng = match args.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };

    println!(
        "Writing {} hosts x {} files x {} lines for {} into {}",
        args.hosts(),
        args.files(),
        args.lines(),
        day.format("%d/%b/%Y"),
        args.log_root().display()
    );
    for index in 1..=*args.hosts() {
        let host = format!("{}{index}", args.host_prefix());
        write_host_logs(
            &mut rng,
            args.log_root(),
            &host,
            *args.files(),
            *args.lines(),
            day,
        )?;
    }
    Ok(())
}
