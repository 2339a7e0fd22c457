// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # mdcap CLI
//!
//! Extract exchange market-data messages from capture files.
//!
//! ## Usage
//!
//! ```sh
//! # Decode and summarize
//! mdcap scan feed.pcapng
//!
//! # Parallel, per-type cap, JSON report
//! mdcap scan feed.pcapng --parallel --cap 1000 --json
//!
//! # Container structure only
//! mdcap info feed.pcap
//!
//! # Detected CPU features and matcher selection
//! mdcap caps
//! ```
//!
//! Exit code 0 on success, 1 on an I/O failure or a fatal container error.

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{CapsCmd, InfoCmd, ScanCmd};
use common::{init_logging, Result};

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// mdcap - market-data capture extraction
///
/// Reads classic pcap and pcapng files through a memory map and decodes
/// the exchange messages carried in their UDP payloads.
#[derive(Parser, Clone)]
#[command(name = "mdcap")]
#[command(about = "Extract exchange market-data messages from pcap and pcapng captures", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Decode messages and report per-type statistics
    Scan(ScanCmd),

    /// Summarize container blocks without decoding
    Info(InfoCmd),

    /// Show CPU capabilities and matcher selection
    Caps(CapsCmd),
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Scan(cmd) if cmd.verbose());
    init_logging(verbose);

    match cli.command {
        Commands::Scan(cmd) => cmd.run(),
        Commands::Info(cmd) => cmd.run(),
        Commands::Caps(cmd) => cmd.run(),
    }
}

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
