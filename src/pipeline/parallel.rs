// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parallel pipeline.
//!
//! Block discovery stays sequential, since pcapng framing can only be
//! walked front to back. Packet views are grouped into chunks of roughly
//! `chunk_size` payload bytes, and waves of chunks are scanned on a rayon
//! pool with one scanner and one statistics accumulator per worker. Wave
//! results are concatenated in chunk order, sorted by file offset and fed
//! through the same aggregator as the sequential path, so the output is
//! identical to [`PipelineDriver::run`].
//!
//! Verbose hex samples are only produced by the sequential path.

use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::core::{CaptureError, MessageRecord, Result};
use crate::io::{BlockReader, CaptureSource, PacketView};

use super::batch::{BatchAggregator, BatchSink};
use super::driver::PipelineDriver;
use super::stats::{Outcome, Report, ScanStatistics};

/// Chunks per worker thread in one wave.
const CHUNKS_PER_THREAD: usize = 4;

type Chunk<'a> = Vec<PacketView<'a>>;

impl PipelineDriver {
    /// Multi-threaded pass producing the same records as [`run`](Self::run).
    pub fn run_parallel<S: BatchSink + ?Sized>(
        &self,
        source: &CaptureSource,
        sink: &mut S,
    ) -> Result<Report> {
        let start = Instant::now();
        let threads = self.config.effective_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("mdcap-scan-{index}"))
            .build()
            .map_err(|e| CaptureError::worker(format!("failed to create thread pool: {e}")))?;

        tracing::debug!(
            threads,
            chunk_size = self.config.chunk_size,
            "Starting parallel scan"
        );

        let wave_len = threads * CHUNKS_PER_THREAD;
        let mut stats = ScanStatistics::default();
        let mut aggregator = BatchAggregator::new(self.config.batch_capacity, sink);

        let (format, outcome) = match BlockReader::new(source.data()) {
            Err(e) => (None, self.halt(e)),
            Ok(mut reader) => {
                let format = reader.format();
                let mut wave: Vec<Chunk<'_>> = Vec::with_capacity(wave_len);
                let mut chunk: Chunk<'_> = Vec::new();
                let mut chunk_bytes = 0usize;

                let outcome = loop {
                    if self.packet_limit_reached(&stats) {
                        break Outcome::Completed;
                    }
                    match reader.next() {
                        None => break Outcome::Completed,
                        Some(Ok(block)) => {
                            stats.blocks += 1;
                            let Some(packet) = block.packet() else {
                                continue;
                            };
                            stats.packets += 1;
                            chunk_bytes += packet.bytes.len();
                            chunk.push(*packet);
                            if chunk_bytes >= self.config.chunk_size {
                                wave.push(std::mem::take(&mut chunk));
                                chunk_bytes = 0;
                                if wave.len() >= wave_len {
                                    self.scan_wave(&pool, &mut wave, &mut stats, &mut aggregator)?;
                                }
                            }
                        }
                        Some(Err(e)) if e.is_recoverable() => stats.framing_errors += 1,
                        Some(Err(e)) => break self.halt(e),
                    }
                };

                // Packets read before a fatal error are still processed.
                if !chunk.is_empty() {
                    wave.push(chunk);
                }
                self.scan_wave(&pool, &mut wave, &mut stats, &mut aggregator)?;
                stats.bytes_scanned = reader.position();
                (Some(format), outcome)
            }
        };

        let (batches_flushed, total_processed) = aggregator.finish()?;
        stats.elapsed = start.elapsed();
        Ok(self.report(source, format, stats, batches_flushed, total_processed, outcome))
    }

    fn scan_wave<S: BatchSink + ?Sized>(
        &self,
        pool: &ThreadPool,
        wave: &mut Vec<Chunk<'_>>,
        stats: &mut ScanStatistics,
        aggregator: &mut BatchAggregator<'_, S>,
    ) -> Result<()> {
        if wave.is_empty() {
            return Ok(());
        }

        let results: Vec<(Vec<MessageRecord>, ScanStatistics)> = pool.install(|| {
            wave.par_iter()
                .map_init(
                    || self.processor(false),
                    |processor, chunk| {
                        let mut local = ScanStatistics::default();
                        let mut records = Vec::new();
                        for packet in chunk {
                            processor.process(packet, &mut local, |r| {
                                records.push(r);
                                Ok(())
                            })?;
                        }
                        Ok((records, local))
                    },
                )
                .collect::<Result<Vec<_>>>()
        })?;
        wave.clear();

        let mut merged = Vec::with_capacity(results.iter().map(|(r, _)| r.len()).sum());
        for (records, local) in results {
            stats.merge(&local);
            merged.extend(records);
        }
        merged.sort_by_key(|r| r.file_offset);

        for record in merged {
            aggregator.push(record)?;
        }
        Ok(())
    }
}
