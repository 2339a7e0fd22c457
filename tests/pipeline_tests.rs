// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end pipeline tests: batching, caps, strategies and sinks.

mod common;

use common::*;
use mdcap::{
    CaptureSource, ChannelSink, CollectSink, DecodedMessage, MatcherKind, MessageBatch,
    MessageRecord, PipelineDriver, Result, ScanConfig, ScanStrategy, StatsOnlySink,
};

fn feed(packets: usize) -> Vec<Vec<u8>> {
    (0..packets)
        .map(|i| {
            udp_packet(&[
                system_event(b'Q'),
                trade("AAPL", 1_500_000, 100 + i as u32, b'B'),
                quote("MSFT", 2_500_000, 500, 2_505_000, 300),
                official_price("IBM", 1_200_000),
            ])
        })
        .collect()
}

fn run(config: ScanConfig, bytes: Vec<u8>) -> (mdcap::Report, CollectSink) {
    let source = CaptureSource::from_bytes(bytes);
    let driver = PipelineDriver::new(config).unwrap();
    let mut sink = CollectSink::new();
    let report = driver.run(&source, &mut sink).unwrap();
    (report, sink)
}

#[test]
fn test_records_in_file_order() {
    let (report, sink) = run(ScanConfig::default(), pcapng_capture(&feed(20)));
    assert!(report.is_complete());
    assert_eq!(report.stats.packets, 20);
    assert_eq!(report.stats.messages_decoded, 80);
    assert_eq!(report.stats.decoded_counts[0x53], 20);
    assert_eq!(report.stats.decoded_counts[0x54], 20);
    assert_eq!(report.stats.decoded_counts[0x51], 20);
    assert_eq!(report.stats.decoded_counts[0x58], 20);
    assert_eq!(report.stats.total_messages(), 80);
    assert!(sink
        .records
        .windows(2)
        .all(|w| w[0].file_offset < w[1].file_offset));
    assert!(matches!(
        sink.records[0].message,
        DecodedMessage::SystemEvent { event_code: b'Q' }
    ));
    assert_eq!(sink.records[0].exchange_timestamp, MARKET_OPEN_NS);
}

#[test]
fn test_batches_never_exceed_capacity() {
    let config = ScanConfig::default().with_batch_capacity(7);
    let (report, sink) = run(config, pcapng_capture(&feed(10)));

    assert_eq!(report.total_processed, 40);
    assert!(sink.batch_sizes.iter().all(|&n| n <= 7));
    assert_eq!(sink.batch_sizes.iter().sum::<usize>(), 40);
    // 5 full batches plus the final partial one
    assert_eq!(report.batches_flushed, 6);
    assert_eq!(sink.batch_sizes.last(), Some(&5));
}

#[test]
fn test_max_packets_stops_early() {
    let config = ScanConfig::default().with_max_packets(3);
    let (report, sink) = run(config, classic_capture(&feed(10)));
    assert!(report.is_complete());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.stats.packets, 3);
    assert_eq!(sink.records.len(), 12);
    assert!(sink.records.iter().all(|r| r.packet_index < 3));
}

#[test]
fn test_per_type_cap_counts_suppressed() {
    let trades: Vec<Vec<u8>> = (0..5).map(|_| trade("AAPL", 1_500_000, 100, b'S')).collect();
    let packets = vec![udp_packet(&trades), udp_packet(&trades)];
    let config = ScanConfig::default().with_per_type_cap(2);
    let (report, sink) = run(config, pcapng_capture(&packets));

    // The cap applies per scan pass, which is one packet.
    assert_eq!(sink.records.len(), 4);
    assert_eq!(report.stats.type_counts[0x54], 10);
    assert_eq!(report.stats.capped, 6);
}

#[test]
fn test_header_len_changes_payload_start() {
    let mut packet = vec![0u8; 50];
    packet.extend(trade("AAPL", 1_500_000, 100, b'B'));
    let bytes = pcapng_capture(&[packet]);

    let (report, _) = run(ScanConfig::default().with_header_len(50), bytes.clone());
    assert_eq!(report.stats.messages_decoded, 1);
    assert_eq!(report.stats.payload_bytes, 26);

    let (report, _) = run(ScanConfig::default().with_header_len(100), bytes);
    assert_eq!(report.stats.messages_decoded, 0);
    assert_eq!(report.stats.payload_bytes, 0);
}

#[test]
fn test_every_matcher_gives_same_records() {
    let bytes = pcapng_capture(&feed(30));
    let (_, expected) = run(
        ScanConfig::default().with_matcher(MatcherKind::Scalar),
        bytes.clone(),
    );
    for kind in [MatcherKind::Swar, MatcherKind::Sse2, MatcherKind::Avx2, MatcherKind::Auto] {
        let (report, sink) = run(ScanConfig::default().with_matcher(kind), bytes.clone());
        assert_eq!(sink.records, expected.records, "matcher {kind}");
        assert!(report.stats.tag_hits > 0);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let bytes = pcapng_capture(&feed(400));
    let source = CaptureSource::from_bytes(bytes);
    let config = ScanConfig::default()
        .with_chunk_size(4096)
        .with_threads(4)
        .with_batch_capacity(100);
    let driver = PipelineDriver::new(config).unwrap();

    let mut sequential = CollectSink::new();
    let seq = driver.run(&source, &mut sequential).unwrap();
    let mut parallel = CollectSink::new();
    let par = driver.run_parallel(&source, &mut parallel).unwrap();

    assert_eq!(parallel.records, sequential.records);
    assert_eq!(parallel.batch_sizes, sequential.batch_sizes);
    assert_eq!(par.stats.type_counts, seq.stats.type_counts);
    assert_eq!(par.stats.decoded_counts, seq.stats.decoded_counts);
    assert_eq!(par.stats.packets, seq.stats.packets);
    assert_eq!(par.stats.bytes_scanned, seq.stats.bytes_scanned);
    assert_eq!(par.total_processed, seq.total_processed);
}

#[test]
fn test_parallel_halts_like_sequential() {
    let mut bytes = pcapng_capture(&feed(50));
    bytes.extend(overrunning_block());
    let source = CaptureSource::from_bytes(bytes);
    let driver =
        PipelineDriver::new(ScanConfig::default().with_chunk_size(512).with_threads(2)).unwrap();

    let mut sink = CollectSink::new();
    let report = driver.run_parallel(&source, &mut sink).unwrap();
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.stats.packets, 50);
    assert_eq!(sink.records.len(), 200);
}

#[test]
fn test_execute_resolves_strategy() {
    let source = CaptureSource::from_bytes(pcapng_capture(&feed(5)));
    for strategy in [ScanStrategy::Sequential, ScanStrategy::Parallel, ScanStrategy::Auto] {
        let driver = PipelineDriver::new(ScanConfig::default().with_strategy(strategy)).unwrap();
        let mut sink = StatsOnlySink::default();
        let report = driver.execute(&source, &mut sink).unwrap();
        assert_eq!(sink.records, 20, "{strategy:?}");
        assert_eq!(report.total_processed, 20);
    }
}

#[test]
fn test_channel_sink_delivers_batches() {
    let source = CaptureSource::from_bytes(pcapng_capture(&feed(25)));
    let driver = PipelineDriver::new(ScanConfig::default().with_batch_capacity(10)).unwrap();
    let (tx, rx) = crossbeam_channel::unbounded::<Vec<MessageRecord>>();

    let consumer = std::thread::spawn(move || rx.iter().map(|batch| batch.len()).sum::<usize>());
    let report = {
        let mut sink = ChannelSink::new(tx);
        driver.run(&source, &mut sink).unwrap()
    };
    assert_eq!(consumer.join().unwrap(), 100);
    assert_eq!(report.batches_flushed, 10);
}

#[test]
fn test_closure_sink_sees_sequence_numbers() {
    let source = CaptureSource::from_bytes(pcapng_capture(&feed(5)));
    let driver = PipelineDriver::new(ScanConfig::default().with_batch_capacity(8)).unwrap();
    let mut sequences = Vec::new();
    let mut sink = |batch: &MessageBatch| -> Result<()> {
        sequences.push(batch.sequence());
        Ok(())
    };
    driver.run(&source, &mut sink).unwrap();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[test]
fn test_config_file_drives_scan() {
    let toml = r#"
        header_len = 42
        per_type_cap = 1
        batch_capacity = 3
        matcher = "swar"

        [price]
        scale = "four_decimal"
        max_price = 1000
    "#;
    let config = ScanConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.matcher, MatcherKind::Swar);

    let (report, sink) = run(config, pcapng_capture(&feed(2)));
    // MSFT at 250.0000 is plausible, nothing else is capped away
    assert_eq!(sink.records.len(), 8);
    assert!(sink.batch_sizes.iter().all(|&n| n <= 3));
    assert_eq!(report.matcher, MatcherKind::Swar);
}

#[test]
fn test_price_ceiling_drops_trades() {
    let config = ScanConfig::default()
        .with_price_policy(mdcap::PricePolicy::default().with_max_price(100));
    let (report, sink) = run(config, pcapng_capture(&feed(4)));
    // trades at 150 and official prices at 120 exceed the ceiling
    assert_eq!(report.stats.implausible, 8);
    // quotes classify instead of failing
    assert_eq!(sink.records.len(), 8);
    assert!(sink
        .records
        .iter()
        .any(|r| matches!(r.message, DecodedMessage::InactiveQuote { .. })));
}

#[test]
fn test_report_serializes_to_json() {
    let (report, _) = run(ScanConfig::default(), pcapng_capture(&feed(2)));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"]["status"], "completed");
    assert_eq!(json["stats"]["messages_decoded"], 8);
    assert_eq!(json["stats"]["decoded_counts"]["0x54"], 2);
}
