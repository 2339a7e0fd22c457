// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Metadata types for capture containers and the packets they carry.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Serialize;

/// Capture container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFormat {
    /// Classic libpcap file
    Pcap {
        /// Byte order of the file's header fields
        endian: Endian,
        /// Whether record timestamps carry nanoseconds instead of microseconds
        nanosecond: bool,
    },
    /// pcapng (block-structured)
    PcapNg,
}

impl CaptureFormat {
    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureFormat::Pcap { .. } => "pcap",
            CaptureFormat::PcapNg => "pcapng",
        }
    }
}

/// Byte order of multi-byte header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Read a u16. The caller guarantees `buf.len() >= 2`.
    pub fn u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(buf),
            Endian::Big => BigEndian::read_u16(buf),
        }
    }

    /// Read a u32. The caller guarantees `buf.len() >= 4`.
    pub fn u32(self, buf: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(buf),
            Endian::Big => BigEndian::read_u32(buf),
        }
    }

    /// Read a u32 at `offset`, or `None` if it does not fit.
    pub fn u32_at(self, buf: &[u8], offset: usize) -> Option<u32> {
        let end = offset.checked_add(4)?;
        buf.get(offset..end).map(|b| self.u32(b))
    }

    /// Read a u16 at `offset`, or `None` if it does not fit.
    pub fn u16_at(self, buf: &[u8], offset: usize) -> Option<u16> {
        let end = offset.checked_add(2)?;
        buf.get(offset..end).map(|b| self.u16(b))
    }
}

/// Resolution of packet timestamp ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampResolution {
    /// One tick is 10^-n seconds
    Decimal(u8),
    /// One tick is 2^-n seconds
    Binary(u8),
}

impl Default for TimestampResolution {
    fn default() -> Self {
        TimestampResolution::Decimal(6)
    }
}

impl TimestampResolution {
    /// Decode an `if_tsresol` option byte.
    pub fn from_option(value: u8) -> Self {
        if value & 0x80 == 0 {
            TimestampResolution::Decimal(value)
        } else {
            TimestampResolution::Binary(value & 0x7f)
        }
    }

    /// Convert a tick count to nanoseconds, saturating on overflow.
    pub fn to_nanos(self, ticks: u64) -> u64 {
        let nanos = match self {
            TimestampResolution::Decimal(n) if n <= 9 => {
                u128::from(ticks) * 10u128.pow(u32::from(9 - n))
            }
            TimestampResolution::Decimal(n) => {
                let exp = u32::from(n - 9);
                if exp > 38 {
                    0
                } else {
                    u128::from(ticks) / 10u128.pow(exp)
                }
            }
            TimestampResolution::Binary(n) => {
                let scaled = u128::from(ticks) * 1_000_000_000;
                if n >= 127 {
                    0
                } else {
                    scaled >> n
                }
            }
        };
        u64::try_from(nanos).unwrap_or(u64::MAX)
    }
}

/// Interface description from a pcapng Interface Description Block, or the
/// single implicit interface of a classic pcap file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InterfaceInfo {
    /// Link-layer header type
    pub link_type: u32,
    /// Maximum captured bytes per packet
    pub snap_len: u32,
    /// Timestamp tick resolution
    pub ts_resolution: TimestampResolution,
}

/// A captured packet. Borrows from the capture source; never copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketView<'a> {
    /// Zero-based packet index within the capture
    pub index: u64,
    /// Absolute file offset of the first packet byte
    pub data_offset: u64,
    /// Bytes actually captured
    pub captured_length: u32,
    /// Length of the packet on the wire
    pub original_length: u32,
    /// Capture timestamp in nanoseconds since the epoch
    pub timestamp_ns: u64,
    /// Interface the packet was captured on
    pub interface_id: u32,
    /// Captured bytes
    pub bytes: &'a [u8],
}
