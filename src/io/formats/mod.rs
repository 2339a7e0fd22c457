// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Capture container readers.
//!
//! This module contains readers for the supported capture containers:
//! - [`pcap`]: classic libpcap files (global header + fixed record headers)
//! - [`pcapng`]: block-structured pcapng files
//!
//! Both yield [`ContainerBlock`] values through [`BlockReader`], a lazy,
//! finite, non-restartable iterator. A fatal framing error is yielded once
//! and then the iterator ends; a recoverable one is yielded and iteration
//! continues at the next block boundary.

pub mod constants;
pub mod pcap;
pub mod pcapng;

use crate::core::Result;

use super::detection::detect_from_bytes;
use super::metadata::{CaptureFormat, Endian, InterfaceInfo, PacketView};

pub use pcap::ClassicReader;
pub use pcapng::PcapNgReader;

/// Section-level information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    /// Byte order of the section
    pub endian: Endian,
    /// Format major version
    pub major_version: u16,
    /// Format minor version
    pub minor_version: u16,
    /// Implicit interface (classic pcap only)
    pub interface: Option<InterfaceInfo>,
}

/// What a block contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind<'a> {
    /// pcapng Section Header Block, or the classic global header
    SectionHeader(SectionInfo),
    /// pcapng Interface Description Block
    InterfaceDescription {
        /// Interface id assigned by order of appearance in the section
        interface_id: u32,
        /// Parsed interface description
        info: InterfaceInfo,
    },
    /// pcapng Enhanced Packet Block
    EnhancedPacket(PacketView<'a>),
    /// Classic pcap record
    ClassicRecord(PacketView<'a>),
    /// A block type this reader does not interpret; skipped whole
    Skipped,
}

/// One framed unit of a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerBlock<'a> {
    /// Absolute file offset of the block start
    pub offset: u64,
    /// Block type (pcapng), or a pseudo type for classic pcap
    pub block_type: u32,
    /// Total bytes the block occupies in the file
    pub declared_length: u64,
    /// Bytes between the block's header and trailer
    pub body: &'a [u8],
    /// Interpreted contents
    pub kind: BlockKind<'a>,
}

impl<'a> ContainerBlock<'a> {
    /// The packet carried by this block, if any.
    pub fn packet(&self) -> Option<&PacketView<'a>> {
        match &self.kind {
            BlockKind::EnhancedPacket(packet) | BlockKind::ClassicRecord(packet) => Some(packet),
            _ => None,
        }
    }
}

/// Block reader over either container format.
pub enum BlockReader<'a> {
    /// Classic pcap
    Pcap(ClassicReader<'a>),
    /// pcapng
    PcapNg(PcapNgReader<'a>),
}

impl<'a> BlockReader<'a> {
    /// Detect the format from the leading magic and build the matching reader.
    ///
    /// # Errors
    ///
    /// Returns a container format error for an unknown magic or a truncated
    /// file header.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        match detect_from_bytes(data)? {
            CaptureFormat::Pcap { endian, nanosecond } => Ok(BlockReader::Pcap(
                ClassicReader::new(data, endian, nanosecond)?,
            )),
            CaptureFormat::PcapNg => Ok(BlockReader::PcapNg(PcapNgReader::new(data)?)),
        }
    }

    /// Detected container format.
    pub fn format(&self) -> CaptureFormat {
        match self {
            BlockReader::Pcap(r) => r.format(),
            BlockReader::PcapNg(_) => CaptureFormat::PcapNg,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        match self {
            BlockReader::Pcap(r) => r.position(),
            BlockReader::PcapNg(r) => r.position(),
        }
    }

    /// Iterate only the packets, passing errors through.
    pub fn packets(self) -> impl Iterator<Item = Result<PacketView<'a>>> {
        self.filter_map(|block| match block {
            Ok(block) => block.packet().copied().map(Ok),
            Err(e) => Some(Err(e)),
        })
    }
}

impl<'a> Iterator for BlockReader<'a> {
    type Item = Result<ContainerBlock<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            BlockReader::Pcap(r) => r.next(),
            BlockReader::PcapNg(r) => r.next(),
        }
    }
}

impl std::iter::FusedIterator for BlockReader<'_> {}
