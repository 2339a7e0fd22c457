// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Pipeline driver.
//!
//! Drives a whole capture: blocks from the [`BlockReader`], payloads from
//! the [`PayloadLocator`], candidates from the [`Scanner`], records from the
//! [`MessageDecoder`], and finally the [`BatchAggregator`].
//!
//! Recoverable framing errors are counted and skipped. A fatal one stops
//! the run and yields a [`Report`] with [`Outcome::Halted`] that still
//! carries every count gathered so far. Only sink failures (and worker pool
//! failures in the parallel path) are returned as `Err`.

use std::time::Instant;

use crate::config::ScanConfig;
use crate::core::{CaptureError, Confidence, MessageRecord, Result};
use crate::encoding::{schema_for, DecodeMode, MessageDecoder};
use crate::io::{BlockReader, CaptureFormat, CaptureSource, PacketView, PayloadLocator};
use crate::scan::{BatchMatcher, Capabilities, Candidate, Matcher, Scanner, TuningParams};

use super::batch::{BatchAggregator, BatchSink};
use super::stats::{Outcome, Report, ScanStatistics};
use super::strategy::ScanStrategy;

/// Hex samples logged per message type in verbose mode.
const MAX_SAMPLES_PER_TYPE: u8 = 3;

/// Runs captures through the scan and decode pipeline.
#[derive(Debug, Clone)]
pub struct PipelineDriver {
    pub(crate) config: ScanConfig,
    capabilities: Capabilities,
    matcher: Matcher,
    tuning: TuningParams,
}

impl PipelineDriver {
    /// Validate the configuration, detect capabilities and select a matcher.
    pub fn new(config: ScanConfig) -> Result<Self> {
        Self::with_capabilities(config, Capabilities::detect())
    }

    /// Like [`new`](Self::new) with explicit capabilities.
    pub fn with_capabilities(config: ScanConfig, capabilities: Capabilities) -> Result<Self> {
        config.validate()?;
        let matcher = Matcher::select(config.matcher, &capabilities);
        let tuning = TuningParams::for_capabilities(&capabilities, matcher.width());
        tracing::debug!(
            requested = %config.matcher,
            selected = matcher.name(),
            "Selected matcher"
        );
        Ok(Self {
            config,
            capabilities,
            matcher,
            tuning,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Detected capabilities.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Selected matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Derived tuning parameters.
    pub fn tuning(&self) -> &TuningParams {
        &self.tuning
    }

    /// Run with the configured strategy, resolving `Auto` by file size.
    pub fn execute<S: BatchSink + ?Sized>(
        &self,
        source: &CaptureSource,
        sink: &mut S,
    ) -> Result<Report> {
        let strategy = self
            .config
            .strategy
            .resolve(source.len() as u64, self.config.effective_threads());
        match strategy {
            ScanStrategy::Parallel => self.run_parallel(source, sink),
            _ => self.run(source, sink),
        }
    }

    /// Single-threaded pass over the whole capture.
    pub fn run<S: BatchSink + ?Sized>(
        &self,
        source: &CaptureSource,
        sink: &mut S,
    ) -> Result<Report> {
        let start = Instant::now();
        let mut stats = ScanStatistics::default();
        let mut aggregator = BatchAggregator::new(self.config.batch_capacity, sink);
        let mut processor = self.processor(self.config.verbose);

        let (format, outcome) = match BlockReader::new(source.data()) {
            Err(e) => (None, self.halt(e)),
            Ok(mut reader) => {
                let format = reader.format();
                let outcome = loop {
                    if self.packet_limit_reached(&stats) {
                        break Outcome::Completed;
                    }
                    match reader.next() {
                        None => break Outcome::Completed,
                        Some(Ok(block)) => {
                            stats.blocks += 1;
                            if let Some(packet) = block.packet() {
                                stats.packets += 1;
                                processor.process(packet, &mut stats, |r| aggregator.push(r))?;
                            }
                        }
                        Some(Err(e)) if e.is_recoverable() => stats.framing_errors += 1,
                        Some(Err(e)) => break self.halt(e),
                    }
                };
                stats.bytes_scanned = reader.position();
                (Some(format), outcome)
            }
        };

        let (batches_flushed, total_processed) = aggregator.finish()?;
        stats.elapsed = start.elapsed();
        Ok(self.report(source, format, stats, batches_flushed, total_processed, outcome))
    }

    pub(crate) fn packet_limit_reached(&self, stats: &ScanStatistics) -> bool {
        self.config
            .max_packets
            .is_some_and(|max| stats.packets >= max)
    }

    pub(crate) fn halt(&self, error: CaptureError) -> Outcome {
        if let CaptureError::Format { offset, kind } = &error {
            tracing::warn!(offset, kind = kind.name(), error = %kind, "Container framing error, stopping");
        } else {
            tracing::warn!(error = %error, "Stopping");
        }
        Outcome::Halted { error }
    }

    pub(crate) fn processor(&self, samples: bool) -> PacketProcessor {
        PacketProcessor {
            locator: PayloadLocator::new(self.config.header_len),
            scanner: Scanner::new(self.matcher, self.config.per_type_cap),
            decoder: MessageDecoder::new(self.config.price),
            mode: if self.config.keep_low_confidence {
                DecodeMode::Lenient
            } else {
                DecodeMode::Strict
            },
            max_packet_len: self.config.max_packet_len,
            candidates: Vec::new(),
            samples: samples.then_some([0; 256]),
        }
    }

    pub(crate) fn report(
        &self,
        source: &CaptureSource,
        format: Option<CaptureFormat>,
        stats: ScanStatistics,
        batches_flushed: u64,
        total_processed: u64,
        outcome: Outcome,
    ) -> Report {
        tracing::info!(
            path = source.path(),
            packets = stats.packets,
            messages = stats.messages_decoded,
            batches = batches_flushed,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            throughput_mb_s = format!("{:.2}", stats.throughput_mb_s()),
            completed = outcome == Outcome::Completed,
            "Scan finished"
        );
        Report {
            format,
            file_len: source.len() as u64,
            matcher: self.matcher.kind(),
            stats,
            batches_flushed,
            total_processed,
            outcome,
        }
    }
}

/// Per-thread state for turning one packet into records.
pub(crate) struct PacketProcessor {
    locator: PayloadLocator,
    scanner: Scanner,
    decoder: MessageDecoder,
    mode: DecodeMode,
    max_packet_len: usize,
    candidates: Vec<Candidate>,
    samples: Option<[u8; 256]>,
}

impl PacketProcessor {
    /// Scan and decode one packet, handing each record to `emit`.
    pub(crate) fn process<F>(
        &mut self,
        packet: &PacketView<'_>,
        stats: &mut ScanStatistics,
        mut emit: F,
    ) -> Result<()>
    where
        F: FnMut(MessageRecord) -> Result<()>,
    {
        let captured = packet.captured_length as usize;
        if captured == 0 || captured > self.max_packet_len {
            stats.packets_skipped += 1;
            return Ok(());
        }

        let payload = self.locator.locate(packet);
        self.candidates.clear();
        self.scanner
            .scan(payload.bytes, stats, &mut self.candidates);

        for candidate in &self.candidates {
            let decoded = match self
                .decoder
                .decode_at(payload.bytes, candidate.offset, self.mode)
            {
                Ok(decoded) => decoded,
                Err(e) => {
                    stats.record_decode_error(e.kind());
                    continue;
                }
            };

            let file_offset = payload.file_offset + candidate.offset as u64;
            if let Some(samples) = self.samples.as_mut() {
                let seen = &mut samples[candidate.tag() as usize];
                if *seen < MAX_SAMPLES_PER_TYPE {
                    *seen += 1;
                    let len = schema_for(candidate.message_type).min_length;
                    let end = (candidate.offset + len).min(payload.bytes.len());
                    tracing::debug!(
                        message_type = candidate.message_type.name(),
                        file_offset,
                        bytes = %hex::encode(&payload.bytes[candidate.offset..end]),
                        "Message sample"
                    );
                }
            }

            if matches!(decoded.confidence, Confidence::Low(_)) {
                stats.low_confidence += 1;
            }
            stats.record_decoded(candidate.tag());
            emit(MessageRecord {
                file_offset,
                packet_index: payload.packet_index,
                capture_timestamp_ns: payload.timestamp_ns,
                exchange_timestamp: decoded.exchange_timestamp,
                message: decoded.message,
                confidence: decoded.confidence,
            })?;
        }
        Ok(())
    }
}
