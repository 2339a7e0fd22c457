// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Scan statistics and run reports.
//!
//! [`ScanStatistics`] is a plain accumulator. It is passed by `&mut` into
//! each stage and, in the parallel driver, one instance per worker is merged
//! at the end. There are no process-wide counters.

use std::time::Duration;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::core::{CaptureError, DecodeErrorKind, FormatErrorKind};
use crate::io::CaptureFormat;
use crate::scan::MatcherKind;

/// Counters accumulated across a whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    /// Heuristic-accepted candidates per tag byte, capped ones included
    #[serde(serialize_with = "serialize_tag_counts")]
    pub type_counts: [u64; 256],
    /// Successfully decoded messages per tag byte
    #[serde(serialize_with = "serialize_tag_counts")]
    pub decoded_counts: [u64; 256],
    /// Raw tag-byte matches before the letter check
    pub tag_hits: u64,
    /// Candidates suppressed by the per-type cap
    pub capped: u64,
    /// Container bytes walked
    pub bytes_scanned: u64,
    /// Payload bytes fed to the scanner
    pub payload_bytes: u64,
    /// Packets seen
    pub packets: u64,
    /// Packets skipped for zero or oversized captured length
    pub packets_skipped: u64,
    /// Container blocks read
    pub blocks: u64,
    /// Records handed to the batch aggregator
    pub messages_decoded: u64,
    /// Candidates dropped as truncated
    pub truncated: u64,
    /// Candidates with an implausible value
    pub implausible: u64,
    /// Candidates with an ambiguous price scale
    pub ambiguous: u64,
    /// Records kept with low confidence
    pub low_confidence: u64,
    /// Recoverable framing errors skipped
    pub framing_errors: u64,
    /// Wall-clock time of the run
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl Default for ScanStatistics {
    fn default() -> Self {
        Self {
            type_counts: [0; 256],
            decoded_counts: [0; 256],
            tag_hits: 0,
            capped: 0,
            bytes_scanned: 0,
            payload_bytes: 0,
            packets: 0,
            packets_skipped: 0,
            blocks: 0,
            messages_decoded: 0,
            truncated: 0,
            implausible: 0,
            ambiguous: 0,
            low_confidence: 0,
            framing_errors: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl ScanStatistics {
    /// Count a dropped or downgraded candidate.
    pub fn record_decode_error(&mut self, kind: DecodeErrorKind) {
        match kind {
            DecodeErrorKind::Truncated | DecodeErrorKind::UnknownType => self.truncated += 1,
            DecodeErrorKind::Implausible => self.implausible += 1,
            DecodeErrorKind::Ambiguous => self.ambiguous += 1,
        }
    }

    /// Count a decoded record.
    pub fn record_decoded(&mut self, tag: u8) {
        self.decoded_counts[tag as usize] += 1;
        self.messages_decoded += 1;
    }

    /// Count a recoverable framing error.
    pub fn record_framing_error(&mut self, kind: &FormatErrorKind) {
        debug_assert!(kind.is_recoverable());
        self.framing_errors += 1;
    }

    /// Add another accumulator into this one.
    pub fn merge(&mut self, other: &ScanStatistics) {
        for (a, b) in self.type_counts.iter_mut().zip(other.type_counts.iter()) {
            *a += b;
        }
        for (a, b) in self
            .decoded_counts
            .iter_mut()
            .zip(other.decoded_counts.iter())
        {
            *a += b;
        }
        self.tag_hits += other.tag_hits;
        self.capped += other.capped;
        self.bytes_scanned += other.bytes_scanned;
        self.payload_bytes += other.payload_bytes;
        self.packets += other.packets;
        self.packets_skipped += other.packets_skipped;
        self.blocks += other.blocks;
        self.messages_decoded += other.messages_decoded;
        self.truncated += other.truncated;
        self.implausible += other.implausible;
        self.ambiguous += other.ambiguous;
        self.low_confidence += other.low_confidence;
        self.framing_errors += other.framing_errors;
        self.elapsed = self.elapsed.max(other.elapsed);
    }

    /// Heuristic-accepted candidates across all types.
    pub fn total_candidates(&self) -> u64 {
        self.type_counts.iter().sum()
    }

    /// Decoded messages across all types.
    pub fn total_messages(&self) -> u64 {
        self.decoded_counts.iter().sum()
    }

    /// Container throughput in MiB per second.
    pub fn throughput_mb_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_scanned as f64 / (1024.0 * 1024.0) / secs
    }

    /// Non-zero candidate counts as `(tag, count)`, ascending by tag.
    pub fn nonzero_types(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.type_counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(tag, &c)| (tag as u8, c))
    }
}

fn serialize_tag_counts<S: Serializer>(counts: &[u64; 256], s: S) -> Result<S::Ok, S::Error> {
    let nonzero = counts.iter().filter(|&&c| c > 0).count();
    let mut map = s.serialize_map(Some(nonzero))?;
    for (tag, &count) in counts.iter().enumerate() {
        if count > 0 {
            map.serialize_entry(&format!("{tag:#04x}"), &count)?;
        }
    }
    map.end()
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

fn serialize_display<S: Serializer>(e: &CaptureError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(e)
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every block was consumed
    Completed,
    /// A fatal container error stopped the run
    Halted {
        #[serde(serialize_with = "serialize_display")]
        error: CaptureError,
    },
}

/// Summary of one run over a capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Detected container format, if detection succeeded
    pub format: Option<CaptureFormat>,
    /// Source length in bytes
    pub file_len: u64,
    /// Matcher implementation used
    pub matcher: MatcherKind,
    /// Accumulated counters
    pub stats: ScanStatistics,
    /// Batches handed to the sink
    pub batches_flushed: u64,
    /// Records handed to the sink
    pub total_processed: u64,
    /// Completion status
    pub outcome: Outcome,
}

impl Report {
    /// Whether the whole file was processed.
    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Completed
    }

    /// Process exit code: 0 when completed, 1 when halted.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            Outcome::Completed => 0,
            Outcome::Halted { .. } => 1,
        }
    }

    /// The halting error, if any.
    pub fn error(&self) -> Option<&CaptureError> {
        match &self.outcome {
            Outcome::Completed => None,
            Outcome::Halted { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut a = ScanStatistics::default();
        a.type_counts[0x54] = 2;
        a.record_decoded(0x54);
        a.bytes_scanned = 100;
        a.elapsed = Duration::from_millis(5);

        let mut b = ScanStatistics::default();
        b.type_counts[0x54] = 3;
        b.type_counts[0x51] = 1;
        b.record_decoded(0x51);
        b.record_decode_error(DecodeErrorKind::Ambiguous);
        b.bytes_scanned = 50;
        b.elapsed = Duration::from_millis(9);

        a.merge(&b);
        assert_eq!(a.type_counts[0x54], 5);
        assert_eq!(a.total_candidates(), 6);
        assert_eq!(a.total_messages(), 2);
        assert_eq!(a.messages_decoded, 2);
        assert_eq!(a.ambiguous, 1);
        assert_eq!(a.bytes_scanned, 150);
        assert_eq!(a.elapsed, Duration::from_millis(9));
    }

    #[test]
    fn test_throughput() {
        let stats = ScanStatistics {
            bytes_scanned: 4 * 1024 * 1024,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        assert!((stats.throughput_mb_s() - 2.0).abs() < 1e-9);
        assert_eq!(ScanStatistics::default().throughput_mb_s(), 0.0);
    }

    #[test]
    fn test_serialize_nonzero_tags() {
        let mut stats = ScanStatistics::default();
        stats.type_counts[0x54] = 7;
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["type_counts"]["0x54"], 7);
        assert_eq!(json["type_counts"].as_object().unwrap().len(), 1);
        assert_eq!(json["decoded_counts"].as_object().unwrap().len(), 0);
    }

    #[test]
    fn test_report_exit_code() {
        let mut report = Report {
            format: None,
            file_len: 0,
            matcher: MatcherKind::Scalar,
            stats: ScanStatistics::default(),
            batches_flushed: 0,
            total_processed: 0,
            outcome: Outcome::Completed,
        };
        assert_eq!(report.exit_code(), 0);
        assert!(report.error().is_none());

        report.outcome = Outcome::Halted {
            error: CaptureError::format(
                28,
                FormatErrorKind::BlockOverrun {
                    declared: 64,
                    remaining: 8,
                },
            ),
        };
        assert_eq!(report.exit_code(), 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "halted");
        assert!(json["outcome"]["error"].as_str().unwrap().contains("28"));
    }
}
