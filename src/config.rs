// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Scan configuration.
//!
//! Plain parameters consumed by the pipeline. Nothing here reads the
//! environment; the binary loads a TOML file and applies command-line
//! overrides on top.
//!
//! ```toml
//! header_len = 42
//! per_type_cap = 1000
//! matcher = "swar"
//!
//! [price]
//! scale = "four_decimal"
//! fallback_scale = "two_decimal"
//! max_price = 100000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{CaptureError, PricePolicy, Result};
use crate::io::DEFAULT_HEADER_LEN;
use crate::pipeline::ScanStrategy;
use crate::scan::MatcherKind;

/// Default records per batch.
pub const DEFAULT_BATCH_CAPACITY: usize = 100_000;
/// Default parallel work unit in payload bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 2 * 1024 * 1024;
/// Default largest captured packet length accepted.
pub const DEFAULT_MAX_PACKET_LEN: usize = 65_536;

/// Parameters of one scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Bytes stripped from each packet before scanning
    pub header_len: usize,
    /// Stop after this many packets
    pub max_packets: Option<u64>,
    /// Most candidates of one type emitted per payload
    pub per_type_cap: Option<usize>,
    /// Log hex samples of decoded candidates
    pub verbose: bool,
    /// Records per batch
    pub batch_capacity: usize,
    /// Parallel work unit in payload bytes
    pub chunk_size: usize,
    /// Packets with a larger captured length are skipped
    pub max_packet_len: usize,
    /// Requested matcher implementation
    pub matcher: MatcherKind,
    /// Price interpretation
    pub price: PricePolicy,
    /// Keep implausible or ambiguous records, flagged as low confidence
    pub keep_low_confidence: bool,
    /// Worker threads (None = one per CPU)
    pub threads: Option<usize>,
    /// Sequential, parallel or size-based choice
    pub strategy: ScanStrategy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            header_len: DEFAULT_HEADER_LEN,
            max_packets: None,
            per_type_cap: None,
            verbose: false,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
            matcher: MatcherKind::Auto,
            price: PricePolicy::default(),
            keep_low_confidence: false,
            threads: None,
            strategy: ScanStrategy::default(),
        }
    }
}

impl ScanConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ScanConfig =
            toml::from_str(text).map_err(|e| CaptureError::config("toml", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CaptureError::io(path.display().to_string(), format!("failed to read config: {e}"))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_capacity == 0 {
            return Err(CaptureError::config("batch_capacity", "must be greater than zero"));
        }
        if self.chunk_size == 0 {
            return Err(CaptureError::config("chunk_size", "must be greater than zero"));
        }
        if self.price.max_price == 0 {
            return Err(CaptureError::config("price.max_price", "must be greater than zero"));
        }
        if self.price.fallback_scale == Some(self.price.scale) {
            return Err(CaptureError::config("price.fallback_scale", "must differ from price.scale"));
        }
        if self.threads == Some(0) {
            return Err(CaptureError::config("threads", "must be greater than zero"));
        }
        Ok(())
    }

    /// Worker threads to use.
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Set the transport header length.
    pub fn with_header_len(mut self, header_len: usize) -> Self {
        self.header_len = header_len;
        self
    }

    /// Stop after `max_packets` packets.
    pub fn with_max_packets(mut self, max_packets: u64) -> Self {
        self.max_packets = Some(max_packets);
        self
    }

    /// Limit candidates per type per payload.
    pub fn with_per_type_cap(mut self, cap: usize) -> Self {
        self.per_type_cap = Some(cap);
        self
    }

    /// Enable hex sample logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set records per batch.
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Set the parallel work unit.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the largest accepted captured length.
    pub fn with_max_packet_len(mut self, len: usize) -> Self {
        self.max_packet_len = len;
        self
    }

    /// Request a matcher implementation.
    pub fn with_matcher(mut self, matcher: MatcherKind) -> Self {
        self.matcher = matcher;
        self
    }

    /// Set the price policy.
    pub fn with_price_policy(mut self, price: PricePolicy) -> Self {
        self.price = price;
        self
    }

    /// Keep low-confidence records instead of dropping them.
    pub fn with_keep_low_confidence(mut self, keep: bool) -> Self {
        self.keep_low_confidence = keep;
        self
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the scan strategy.
    pub fn with_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
