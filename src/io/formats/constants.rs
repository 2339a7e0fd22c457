// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Capture container constants.
//!
//! Block types and fixed sizes for classic pcap and pcapng, kept in one
//! place so the readers and the test capture builders agree.

/// Classic pcap global header length.
pub const PCAP_GLOBAL_HEADER_LEN: usize = 24;
/// Classic pcap per-record header length.
pub const PCAP_RECORD_HEADER_LEN: usize = 16;
/// Pseudo block type reported for classic pcap records.
pub const CLASSIC_RECORD_TYPE: u32 = 0;

/// Section Header Block.
pub const BLOCK_SECTION_HEADER: u32 = 0x0a0d_0d0a;
/// Interface Description Block.
pub const BLOCK_INTERFACE_DESCRIPTION: u32 = 0x0000_0001;
/// Simple Packet Block (skipped).
pub const BLOCK_SIMPLE_PACKET: u32 = 0x0000_0003;
/// Interface Statistics Block (skipped).
pub const BLOCK_INTERFACE_STATISTICS: u32 = 0x0000_0005;
/// Enhanced Packet Block.
pub const BLOCK_ENHANCED_PACKET: u32 = 0x0000_0006;

/// Byte-order magic inside a Section Header Block.
pub const BYTE_ORDER_MAGIC: u32 = 0x1a2b_3c4d;

/// Block type + leading length + trailing length.
pub const MIN_BLOCK_LEN: u32 = 12;
/// Smallest legal Section Header Block.
pub const MIN_SECTION_HEADER_LEN: u32 = 28;
/// Fixed part of an Enhanced Packet Block body.
pub const EPB_FIXED_LEN: usize = 20;
/// Fixed part of an Interface Description Block body.
pub const IDB_FIXED_LEN: usize = 8;

/// Interface option: end of options.
pub const OPT_END_OF_OPT: u16 = 0;
/// Interface option: timestamp resolution.
pub const OPT_IF_TSRESOL: u16 = 9;
