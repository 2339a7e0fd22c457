// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Info command - walk the container and summarize its blocks.

use std::path::PathBuf;

use clap::Args;

use crate::common::{format_bytes, format_duration, format_timestamp, Result};
use mdcap::io::BlockKind;
use mdcap::{BlockReader, CaptureSource};

/// Show container structure without decoding messages.
#[derive(Args, Clone, Debug)]
pub struct InfoCmd {
    /// Input capture (pcap or pcapng)
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

impl InfoCmd {
    /// Run and return the process exit code.
    pub fn run(self) -> Result<i32> {
        let source = CaptureSource::open(&self.input)?;
        println!("=== {} ===", self.input.display());
        println!("Size: {}", format_bytes(source.len() as u64));

        let mut reader = match BlockReader::new(source.data()) {
            Ok(reader) => reader,
            Err(e) => {
                println!("Error: {e}");
                return Ok(1);
            }
        };
        println!("Format: {}", reader.format().name());

        let mut sections = 0u64;
        let mut interfaces = Vec::new();
        let mut packets = 0u64;
        let mut skipped_blocks = 0u64;
        let mut framing_errors = 0u64;
        let mut captured_bytes = 0u64;
        let mut first_ts = None;
        let mut last_ts = None;
        let mut fatal = None;

        for block in reader.by_ref() {
            let block = match block {
                Ok(block) => block,
                Err(e) if e.is_recoverable() => {
                    framing_errors += 1;
                    continue;
                }
                Err(e) => {
                    fatal = Some(e);
                    break;
                }
            };
            match block.kind {
                BlockKind::SectionHeader(section) => {
                    sections += 1;
                    println!(
                        "Section {}: version {}.{}, {:?} endian",
                        sections, section.major_version, section.minor_version, section.endian
                    );
                    if let Some(info) = section.interface {
                        interfaces.push((0, info));
                    }
                }
                BlockKind::InterfaceDescription { interface_id, info } => {
                    interfaces.push((interface_id, info));
                }
                BlockKind::EnhancedPacket(packet) | BlockKind::ClassicRecord(packet) => {
                    packets += 1;
                    captured_bytes += u64::from(packet.captured_length);
                    if first_ts.is_none() {
                        first_ts = Some(packet.timestamp_ns);
                    }
                    last_ts = Some(packet.timestamp_ns);
                }
                BlockKind::Skipped => skipped_blocks += 1,
            }
        }

        for (id, info) in &interfaces {
            println!(
                "Interface {}: link type {}, snap length {}, resolution {:?}",
                id, info.link_type, info.snap_len, info.ts_resolution
            );
        }
        println!("Packets: {} ({} captured)", packets, format_bytes(captured_bytes));
        if skipped_blocks > 0 {
            println!("Other blocks: {skipped_blocks}");
        }
        if let (Some(start), Some(end)) = (first_ts, last_ts) {
            println!("Start: {}", format_timestamp(start));
            println!("End: {}", format_timestamp(end));
            println!("Duration: {}", format_duration(end.saturating_sub(start)));
        }
        if framing_errors > 0 {
            println!("Framing errors skipped: {framing_errors}");
        }
        println!("Consumed: {} of {} bytes", reader.position(), source.len());

        match fatal {
            Some(e) => {
                println!("Error: {e}");
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
