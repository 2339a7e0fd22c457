// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential or parallel scanning.
//!
//! - **Sequential**: one pass over the blocks on the calling thread
//! - **Parallel**: packets grouped into chunks, scanned on a worker pool
//! - **Auto**: parallel for large files when more than one thread is
//!   available, sequential otherwise

use serde::{Deserialize, Serialize};

/// Files smaller than this are scanned sequentially under `Auto`.
pub const PARALLEL_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Scan strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStrategy {
    /// Single-threaded pass
    Sequential,
    /// Chunked pass on a worker pool
    Parallel,
    /// Choose by file size and thread count
    #[default]
    Auto,
}

impl ScanStrategy {
    /// Resolve `Auto` to a concrete strategy.
    pub fn resolve(&self, file_len: u64, threads: usize) -> ScanStrategy {
        match self {
            ScanStrategy::Auto => {
                if threads > 1 && file_len >= PARALLEL_THRESHOLD {
                    ScanStrategy::Parallel
                } else {
                    ScanStrategy::Sequential
                }
            }
            other => *other,
        }
    }

    /// Check if this is the sequential strategy.
    pub fn is_sequential(&self) -> bool {
        matches!(self, ScanStrategy::Sequential)
    }

    /// Check if this is the parallel strategy.
    pub fn is_parallel(&self) -> bool {
        matches!(self, ScanStrategy::Parallel)
    }
}
