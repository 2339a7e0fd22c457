// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Scan command - decode messages and print per-type statistics.

use std::path::PathBuf;

use clap::Args;

use crate::common::{format_bytes, format_duration, format_time_of_day, Result};
use mdcap::core::message::tag_name;
use mdcap::{
    CaptureSource, MatcherKind, PipelineDriver, PreviewSink, PriceScale, Report, ScanConfig,
    ScanStrategy, StatsOnlySink,
};

/// Decode a capture and report what was found.
#[derive(Args, Clone, Debug)]
pub struct ScanCmd {
    /// Input capture (pcap or pcapng)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bytes of link, network and transport header to skip
    #[arg(long, value_name = "N")]
    header_len: Option<usize>,

    /// Stop after N packets
    #[arg(long, value_name = "N")]
    max_packets: Option<u64>,

    /// Most candidates of one type decoded per packet
    #[arg(long = "cap", value_name = "N")]
    per_type_cap: Option<usize>,

    /// Records per batch
    #[arg(long = "batch", value_name = "N")]
    batch_capacity: Option<usize>,

    /// Matcher implementation (scalar, swar, sse2, avx2, auto)
    #[arg(long, value_name = "KIND")]
    matcher: Option<MatcherKind>,

    /// Also try two-decimal prices and report ambiguity
    #[arg(long)]
    fallback_scale: bool,

    /// Keep implausible or ambiguous records, flagged as low confidence
    #[arg(long)]
    keep_low_confidence: bool,

    /// Scan on a worker pool
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Print the first N decoded records
    #[arg(long, value_name = "N")]
    show: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging and hex samples
    #[arg(short, long)]
    verbose: bool,
}

impl ScanCmd {
    /// Whether debug logging was requested.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Build the configuration from the file and flags.
    fn config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load(path)?,
            None => ScanConfig::default(),
        };
        if let Some(n) = self.header_len {
            config = config.with_header_len(n);
        }
        if let Some(n) = self.max_packets {
            config = config.with_max_packets(n);
        }
        if let Some(n) = self.per_type_cap {
            config = config.with_per_type_cap(n);
        }
        if let Some(n) = self.batch_capacity {
            config = config.with_batch_capacity(n);
        }
        if let Some(kind) = self.matcher {
            config = config.with_matcher(kind);
        }
        if self.fallback_scale {
            config.price = config.price.with_fallback(PriceScale::TwoDecimal);
        }
        if self.keep_low_confidence {
            config = config.with_keep_low_confidence(true);
        }
        if let Some(n) = self.threads {
            config = config.with_threads(n);
        }
        if self.parallel {
            config = config.with_strategy(ScanStrategy::Parallel);
        }
        config = config.with_verbose(self.verbose);
        config.validate()?;
        Ok(config)
    }

    /// Run the scan and return the process exit code.
    pub fn run(self) -> Result<i32> {
        let config = self.config()?;
        let source = CaptureSource::open(&self.input)?;
        let driver = PipelineDriver::new(config)?;

        // JSON output carries the report only.
        let report = match self.show.filter(|_| !self.json) {
            Some(limit) => {
                let mut sink = PreviewSink::new(limit);
                let report = driver.execute(&source, &mut sink)?;
                print_records(&sink);
                report
            }
            None => driver.execute(&source, &mut StatsOnlySink::default())?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&self.input, &report);
        }
        Ok(report.exit_code())
    }
}

fn print_records(sink: &PreviewSink) {
    println!("First {} records:", sink.records.len());
    for record in &sink.records {
        let symbol = record
            .message
            .symbol()
            .map(|s| s.to_string())
            .unwrap_or_default();
        println!(
            "  @{:<10} pkt {:<8} {} {:<20} {:<8} {:?}",
            record.file_offset,
            record.packet_index,
            format_time_of_day(record.exchange_timestamp),
            record.message.message_type().name(),
            symbol,
            record.confidence
        );
    }
    println!();
}

fn print_report(input: &std::path::Path, report: &Report) {
    let stats = &report.stats;
    println!("=== {} ===", input.display());
    match report.format {
        Some(format) => println!("Format: {}", format.name()),
        None => println!("Format: unknown"),
    }
    println!("Size: {}", format_bytes(report.file_len));
    println!("Matcher: {}", report.matcher);
    println!(
        "Blocks: {} | Packets: {} ({} skipped)",
        stats.blocks, stats.packets, stats.packets_skipped
    );
    println!();

    println!(
        "{:<6} {:<28} {:>12} {:>12}",
        "Tag", "Type", "Candidates", "Decoded"
    );
    for (tag, count) in stats.nonzero_types() {
        let name = tag_name(tag).unwrap_or("Unknown");
        println!(
            "0x{:02x}   {:<28} {:>12} {:>12}",
            tag, name, count, stats.decoded_counts[tag as usize]
        );
    }
    println!();

    println!("Messages decoded: {}", stats.total_messages());
    println!(
        "Dropped: {} truncated, {} implausible, {} ambiguous, {} capped",
        stats.truncated, stats.implausible, stats.ambiguous, stats.capped
    );
    if stats.low_confidence > 0 {
        println!("Low confidence kept: {}", stats.low_confidence);
    }
    if stats.framing_errors > 0 {
        println!("Framing errors skipped: {}", stats.framing_errors);
    }
    println!(
        "Batches: {} ({} records)",
        report.batches_flushed, report.total_processed
    );
    println!(
        "Elapsed: {} | Throughput: {:.2} MB/s",
        format_duration(stats.elapsed.as_nanos() as u64),
        stats.throughput_mb_s()
    );
    match report.error() {
        None => println!("Status: completed"),
        Some(e) => println!("Status: halted ({e})"),
    }
}
