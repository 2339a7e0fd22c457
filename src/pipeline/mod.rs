// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Batching, statistics and the pipeline driver.
//!
//! - [`batch`]: bounded batches, sinks and the aggregator
//! - [`stats`]: scan counters and run reports
//! - [`strategy`]: sequential or parallel selection
//! - [`driver`]: the sequential driver
//! - [`parallel`]: the rayon-based parallel driver

pub mod batch;
pub mod driver;
pub mod parallel;
pub mod stats;
pub mod strategy;

pub use batch::{
    BatchAggregator, BatchSink, BatchStatus, ChannelSink, CollectSink, MessageBatch,
    PreviewSink, StatsOnlySink,
};
pub use driver::PipelineDriver;
pub use stats::{Outcome, Report, ScanStatistics};
pub use strategy::ScanStrategy;
