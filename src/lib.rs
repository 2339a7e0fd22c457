// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # mdcap
//!
//! Market-data extraction from network capture files.
//!
//! The library walks classic pcap and pcapng captures through a memory map,
//! strips the transport header prefix from each packet, resynchronizes onto
//! exchange message boundaries by content plausibility, decodes fixed-layout
//! binary messages and hands them downstream in bounded batches.
//!
//! ## Architecture
//!
//! - `io/` - memory-mapped sources, format detection, pcap and pcapng block readers
//! - `scan/` - tag matchers (scalar, SWAR, SSE2, AVX2) and the resynchronization scanner
//! - `encoding/` - bounds-checked field reads and the schema-driven decoder
//! - `pipeline/` - batches, sinks, statistics and the sequential and parallel drivers
//! - `config` - scan parameters, loadable from TOML
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mdcap::{CaptureSource, CollectSink, PipelineDriver, ScanConfig};
//!
//! let source = CaptureSource::open("feed.pcapng")?;
//! let driver = PipelineDriver::new(ScanConfig::default().with_per_type_cap(1000))?;
//! let mut sink = CollectSink::new();
//! let report = driver.run(&source, &mut sink)?;
//! println!(
//!     "{} messages, {:.1} MB/s",
//!     report.stats.total_messages(),
//!     report.stats.throughput_mb_s()
//! );
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{
    CaptureError, Confidence, DecodeError, DecodeErrorKind, DecodedMessage, FormatErrorKind,
    MessageRecord, MessageType, Price, PricePolicy, PriceScale, Result, Side, Symbol,
};

// Scan configuration
pub mod config;

pub use config::ScanConfig;

// Message decoding
pub mod encoding;

pub use encoding::{DecodeMode, MessageDecoder};

// Capture I/O
pub mod io;

pub use io::{BlockReader, CaptureFormat, CaptureSource, PacketView, PayloadLocator};

// Candidate search
pub mod scan;

pub use scan::{BatchMatcher, Capabilities, Candidate, Matcher, MatcherKind, Scanner};

// Batching and drivers
pub mod pipeline;

pub use pipeline::{
    BatchAggregator, BatchSink, ChannelSink, CollectSink, MessageBatch, Outcome, PipelineDriver,
    PreviewSink, Report, ScanStatistics, ScanStrategy, StatsOnlySink,
};
