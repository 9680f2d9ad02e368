//! `coh bin`: pairwise spatiotemporal histograms over a grouped row stream.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use cohesion_stream::{BinningReducer, reduce_stream};
use tracing::info;

use crate::output::OutputMode;

/// Arguments for `coh bin`.
#[derive(Args, Debug, Default)]
pub struct BinArgs {
    /// Read rows from a file instead of stdin.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,
}

/// Execute `coh bin`.
///
/// Text and pretty modes write the `t,d\tcount` dump for each group; JSON
/// mode writes one report object per line.
///
/// # Errors
///
/// Returns an error on the first malformed row or if the input cannot be
/// read.
pub fn run_bin(args: &BinArgs, output: OutputMode) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout();
    let out = stdout.lock();

    if output.is_json() {
        json_lines(reader, out)
    } else {
        reduce_stream(reader, out)?;
        Ok(())
    }
}

fn json_lines(reader: impl BufRead, mut out: impl Write) -> anyhow::Result<()> {
    let mut reducer = BinningReducer::new();
    for line in reader.lines() {
        if let Some(report) = reducer.push_line(&line?)? {
            serde_json::to_writer(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    if let Some(report) = reducer.finish() {
        serde_json::to_writer(&mut out, &report)?;
        writeln!(out)?;
    }
    out.flush()?;
    info!(
        rows = reducer.rows(),
        groups = reducer.groups(),
        "stream reduced"
    );
    Ok(())
}
