use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::Rng;

use crate::generator::generate_line;

fn file_name(index: usize) -> String {
    match index {
        0 => "access.log".to_string(),
        n => format!("access.log.{n}"),
    }
}

/// Writes `files` logs of `lines` lines each into `<log_root>/<host>/`.
pub fn write_host_logs<R: Rng + ?Sized>(
    rng: &mut R,
    log_root: &Path,
    host: &str,
    files: usize,
    lines: usize,
    day: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let dir = log_root.join(host);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::with_capacity(files);
    for index in 0..files {
        let path = dir.join(file_name(index));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);
        for _ in 0..lines {
            writeln!(out, "{}", generate_line(rng, day))?;
        }
        out.flush()?;
        written.push(path);
    }
    Ok(written)
}
