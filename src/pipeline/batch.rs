// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounded record batches and their consumers.
//!
//! A [`MessageBatch`] never holds more than its capacity. The
//! [`BatchAggregator`] hands each full batch to a [`BatchSink`] and resets
//! it; [`BatchAggregator::finish`] flushes the last partial batch, so no
//! record is dropped without being counted.

use crate::core::{CaptureError, MessageRecord, Result};

/// Outcome of [`MessageBatch::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Stored, room remains
    Accepted,
    /// Stored, the batch is now full
    Full,
}

/// Fixed-capacity ordered sequence of records.
#[derive(Debug, Clone)]
pub struct MessageBatch {
    records: Vec<MessageRecord>,
    capacity: usize,
    sequence: u64,
}

impl MessageBatch {
    /// Create an empty batch. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            sequence: 0,
        }
    }

    /// Append a record.
    ///
    /// The caller must flush on [`BatchStatus::Full`] before pushing again.
    ///
    /// # Errors
    ///
    /// A push into a full batch stores nothing and hands the record back.
    pub fn push(
        &mut self,
        record: MessageRecord,
    ) -> std::result::Result<BatchStatus, MessageRecord> {
        if self.is_full() {
            return Err(record);
        }
        self.records.push(record);
        if self.is_full() {
            Ok(BatchStatus::Full)
        } else {
            Ok(BatchStatus::Accepted)
        }
    }

    /// Clear the records and advance the sequence number.
    pub fn reset(&mut self) {
        self.records.clear();
        self.sequence += 1;
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the batch is at capacity.
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Zero-based flush sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Consumer of flushed batches.
pub trait BatchSink {
    /// Take the contents of a full or final batch.
    fn consume(&mut self, batch: &MessageBatch) -> Result<()>;
}

/// Discards records, keeping only counts.
#[derive(Debug, Clone, Default)]
pub struct StatsOnlySink {
    /// Batches seen
    pub batches: u64,
    /// Records seen
    pub records: u64,
}

impl BatchSink for StatsOnlySink {
    fn consume(&mut self, batch: &MessageBatch) -> Result<()> {
        self.batches += 1;
        self.records += batch.len() as u64;
        Ok(())
    }
}

/// Retains every record.
#[derive(Debug, Clone, Default)]
pub struct CollectSink {
    /// Records in flush order
    pub records: Vec<MessageRecord>,
    /// Size of each flushed batch
    pub batch_sizes: Vec<usize>,
}

impl CollectSink {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchSink for CollectSink {
    fn consume(&mut self, batch: &MessageBatch) -> Result<()> {
        self.records.extend_from_slice(batch.records());
        self.batch_sizes.push(batch.len());
        Ok(())
    }
}

/// Keeps the first `limit` records and counts the rest.
#[derive(Debug, Clone, Default)]
pub struct PreviewSink {
    limit: usize,
    /// Retained records in flush order
    pub records: Vec<MessageRecord>,
    /// Records seen, retained or not
    pub seen: u64,
}

impl PreviewSink {
    /// Create a sink retaining at most `limit` records.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            records: Vec::new(),
            seen: 0,
        }
    }

    /// Retention limit.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl BatchSink for PreviewSink {
    fn consume(&mut self, batch: &MessageBatch) -> Result<()> {
        let room = self.limit.saturating_sub(self.records.len());
        self.records.extend(batch.records().iter().take(room).cloned());
        self.seen += batch.len() as u64;
        Ok(())
    }
}

impl<F> BatchSink for F
where
    F: FnMut(&MessageBatch) -> Result<()>,
{
    fn consume(&mut self, batch: &MessageBatch) -> Result<()> {
        self(batch)
    }
}

/// Forwards each batch over a channel as an owned vector.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: crossbeam_channel::Sender<Vec<MessageRecord>>,
}

impl ChannelSink {
    /// Wrap a sender.
    pub fn new(sender: crossbeam_channel::Sender<Vec<MessageRecord>>) -> Self {
        Self { sender }
    }
}

impl BatchSink for ChannelSink {
    fn consume(&mut self, batch: &MessageBatch) -> Result<()> {
        self.sender
            .send(batch.records().to_vec())
            .map_err(|e| CaptureError::sink(format!("receiver disconnected: {e}")))
    }
}

/// Accumulates records into batches and flushes them to a sink.
pub struct BatchAggregator<'s, S: BatchSink + ?Sized> {
    current: MessageBatch,
    total_processed: u64,
    batches_flushed: u64,
    sink: &'s mut S,
}

impl<'s, S: BatchSink + ?Sized> BatchAggregator<'s, S> {
    /// Create an aggregator writing to `sink`.
    pub fn new(capacity: usize, sink: &'s mut S) -> Self {
        Self {
            current: MessageBatch::new(capacity),
            total_processed: 0,
            batches_flushed: 0,
            sink,
        }
    }

    /// Append a record, flushing when the batch fills.
    pub fn push(&mut self, record: MessageRecord) -> Result<()> {
        let status = match self.current.push(record) {
            Ok(status) => status,
            Err(record) => {
                self.flush()?;
                self.current
                    .push(record)
                    .map_err(|_| CaptureError::sink("record rejected by an empty batch"))?
            }
        };
        if status == BatchStatus::Full {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.current.is_empty() {
            return Ok(());
        }
        let count = self.current.len() as u64;
        self.sink.consume(&self.current)?;
        self.total_processed += count;
        self.batches_flushed += 1;
        tracing::debug!(
            sequence = self.current.sequence(),
            records = count,
            total_processed = self.total_processed,
            "Flushed batch"
        );
        self.current.reset();
        Ok(())
    }

    /// Flush the final partial batch. Returns `(batches_flushed, total_processed)`.
    pub fn finish(mut self) -> Result<(u64, u64)> {
        self.flush()?;
        Ok((self.batches_flushed, self.total_processed))
    }

    /// Records handed to the sink so far.
    pub fn total_processed(&self) -> u64 {
        self.total_processed
    }

    /// Batches handed to the sink so far.
    pub fn batches_flushed(&self) -> u64 {
        self.batches_flushed
    }

    /// Records waiting in the current batch.
    pub fn pending(&self) -> usize {
        self.current.len()
    }
}
