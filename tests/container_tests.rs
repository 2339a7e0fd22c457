// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container reader tests against synthesized pcap and pcapng files.

mod common;

use common::*;
use mdcap::io::{BlockKind, TimestampResolution};
use mdcap::{
    BlockReader, CaptureError, CaptureFormat, CaptureSource, CollectSink, FormatErrorKind,
    Outcome, PipelineDriver, ScanConfig,
};

fn sample_packets(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| {
            udp_packet(&[
                trade("AAPL", 1_500_000 + i as u32 * 100, 100, b'B'),
                quote("MSFT", 2_500_000, 500, 2_505_000, 300),
            ])
        })
        .collect()
}

// ============================================================================
// Block accounting
// ============================================================================

#[test]
fn test_pcapng_blocks_consume_whole_file() {
    let mut bytes = pcapng_capture(&sample_packets(5));
    bytes.extend(interface_statistics());
    let source = CaptureSource::from_bytes(bytes);

    let mut reader = BlockReader::new(source.data()).unwrap();
    assert_eq!(reader.format(), CaptureFormat::PcapNg);

    let mut consumed = 0u64;
    let mut packets = 0;
    let mut skipped = 0;
    for block in reader.by_ref() {
        let block = block.unwrap();
        assert_eq!(block.offset, consumed);
        consumed += block.declared_length;
        match block.kind {
            BlockKind::EnhancedPacket(_) => packets += 1,
            BlockKind::Skipped => skipped += 1,
            _ => {}
        }
    }
    assert_eq!(consumed, source.len() as u64);
    assert_eq!(reader.position(), source.len() as u64);
    assert_eq!(packets, 5);
    assert_eq!(skipped, 1);
}

#[test]
fn test_pcapng_interface_resolution() {
    let source = CaptureSource::from_bytes(pcapng_capture(&sample_packets(3)));
    let reader = BlockReader::new(source.data()).unwrap();
    let mut saw_interface = false;
    let mut timestamps = Vec::new();
    for block in reader {
        match block.unwrap().kind {
            BlockKind::InterfaceDescription { interface_id, info } => {
                assert_eq!(interface_id, 0);
                assert_eq!(info.link_type, 1);
                assert_eq!(info.ts_resolution, TimestampResolution::Decimal(9));
                saw_interface = true;
            }
            BlockKind::EnhancedPacket(packet) => timestamps.push(packet.timestamp_ns),
            _ => {}
        }
    }
    assert!(saw_interface);
    assert_eq!(timestamps, vec![0, 1_000_000, 2_000_000]);
}

#[test]
fn test_classic_records_consume_whole_file() {
    let source = CaptureSource::from_bytes(classic_capture(&sample_packets(4)));
    let mut reader = BlockReader::new(source.data()).unwrap();
    assert!(matches!(reader.format(), CaptureFormat::Pcap { .. }));

    let packets: Vec<_> = reader.by_ref().filter_map(|b| b.unwrap().packet().copied()).collect();
    assert_eq!(packets.len(), 4);
    assert_eq!(packets[3].index, 3);
    assert_eq!(packets[3].timestamp_ns, 3_000_000_000);
    assert_eq!(reader.position(), source.len() as u64);
}

#[test]
fn test_packet_data_offset_is_absolute() {
    let source = CaptureSource::from_bytes(pcapng_capture(&sample_packets(2)));
    let data = source.data();
    for packet in BlockReader::new(data).unwrap().packets() {
        let packet = packet.unwrap();
        let start = packet.data_offset as usize;
        assert_eq!(&data[start..start + packet.bytes.len()], packet.bytes);
    }
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_overrunning_block_halts_with_partial_stats() {
    let mut bytes = pcapng_capture(&sample_packets(3));
    let bad_offset = bytes.len() as u64;
    bytes.extend(overrunning_block());
    let source = CaptureSource::from_bytes(bytes);

    let driver = PipelineDriver::new(ScanConfig::default()).unwrap();
    let mut sink = CollectSink::new();
    let report = driver.run(&source, &mut sink).unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.exit_code(), 1);
    match &report.outcome {
        Outcome::Halted {
            error: CaptureError::Format { offset, kind },
        } => {
            assert_eq!(*offset, bad_offset);
            assert!(matches!(kind, FormatErrorKind::BlockOverrun { declared: 4096, .. }));
        }
        other => panic!("expected halt, got {other:?}"),
    }

    // Everything before the bad block was still decoded and delivered.
    assert_eq!(report.stats.packets, 3);
    assert_eq!(report.stats.messages_decoded, 6);
    assert_eq!(sink.records.len(), 6);
    assert_eq!(report.stats.bytes_scanned, bad_offset);
}

#[test]
fn test_trailer_mismatch_is_skipped() {
    let packets = sample_packets(3);
    let mut bytes = section_header();
    bytes.extend(interface_description());
    bytes.extend(enhanced_packet(0, &packets[0]));
    let mut broken = enhanced_packet(1, &packets[1]);
    let len = broken.len();
    broken[len - 4..].copy_from_slice(&0u32.to_le_bytes());
    bytes.extend(broken);
    bytes.extend(enhanced_packet(2, &packets[2]));
    let source = CaptureSource::from_bytes(bytes);

    let driver = PipelineDriver::new(ScanConfig::default()).unwrap();
    let report = driver.run(&source, &mut CollectSink::new()).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.stats.framing_errors, 1);
    assert_eq!(report.stats.packets, 2);
    assert_eq!(report.stats.bytes_scanned, source.len() as u64);
}

#[test]
fn test_classic_truncated_record_halts() {
    let mut bytes = classic_capture(&sample_packets(2));
    bytes.truncate(bytes.len() - 10);
    let source = CaptureSource::from_bytes(bytes);

    let driver = PipelineDriver::new(ScanConfig::default()).unwrap();
    let report = driver.run(&source, &mut CollectSink::new()).unwrap();
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.stats.packets, 1);
    assert!(matches!(
        report.error(),
        Some(CaptureError::Format {
            kind: FormatErrorKind::BlockOverrun { .. },
            ..
        })
    ));
}

#[test]
fn test_empty_file_is_a_format_error() {
    let capture = TempCapture::new("empty", &[]);
    let source = CaptureSource::open(&capture.path).unwrap();
    assert!(source.is_empty());

    let driver = PipelineDriver::new(ScanConfig::default()).unwrap();
    let report = driver.run(&source, &mut CollectSink::new()).unwrap();
    assert_eq!(report.exit_code(), 1);
    assert!(report.format.is_none());
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = CaptureSource::open("/nonexistent/mdcap/feed.pcapng").unwrap_err();
    assert!(matches!(err, CaptureError::Io { .. }));
}

#[test]
fn test_mapped_file_matches_bytes() {
    let bytes = pcapng_capture(&sample_packets(2));
    let capture = TempCapture::new("mapped", &bytes);
    let source = CaptureSource::open(&capture.path).unwrap();
    assert_eq!(source.data(), &bytes[..]);
    assert!(source.is_mapped());
    assert_eq!(source.path(), capture.path_str());
}
