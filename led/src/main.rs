//! # led
//!
//! Main entry point for the line editor.

use std::process;

use clap::Parser;
use led::CliArgs;
use tracing_subscriber::filter::LevelFilter;

fn main() {
    let args = CliArgs::parse();
    init_logging(args.log_level);

    let config = args.to_config().unwrap_or_else(|e| {
        eprintln!("led: {}", e);
        process::exit(2);
    });

    if let Err(e) = led::run(&config) {
        tracing::error!(error = %e, "session aborted");
        eprintln!("led: {}", e);
        process::exit(1);
    }
}

/// Diagnostics go to stderr so they never mix with rendered output
fn init_logging(level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
