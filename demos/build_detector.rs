//! Builds the detector and prints its mass table, preceded by the placement
//! hierarchy when the configuration's `verbosity` is at least 1.
//!
//! ```text
//! cargo run --example build_detector -- [config.json] [resolution]
//! ```
//!
//! `RUST_LOG` overrides the log level implied by the configuration's
//! `verbosity`.

use std::io::{self, Write};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use detgeo::config::DetectorConfig;
use detgeo::detector::DetectorBuilder;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> detgeo::Result<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => DetectorConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => DetectorConfig::default(),
    };
    let resolution = args.next().and_then(|r| r.parse().ok()).unwrap_or(24);
    init_logging(config.verbosity);

    let detector = DetectorBuilder::new(config).build()?;
    if let Some(report) = &detector.overlaps {
        tracing::info!(found = report.overlaps.len(), checked = report.checked, "overlap check finished");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    detector.write_diagnostics(&mut out)?;
    if detector.config.verbosity > 0 {
        writeln!(out)?;
    }
    detector.mass_report(resolution)?.write_csv(&mut out)?;
    Ok(())
}
