// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Transport payload location.
//!
//! The application payload is found by skipping a fixed number of header
//! bytes (by default 14 Ethernet + 20 IPv4 + 8 UDP). The skipped headers are
//! not inspected: VLAN tags, IP options and IPv6 shift the real payload and
//! are not accounted for.

use super::metadata::PacketView;

/// Default header skip: Ethernet II + IPv4 without options + UDP.
pub const DEFAULT_HEADER_LEN: usize = 42;

/// Application bytes of one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportPayload<'a> {
    /// Index of the packet the payload came from
    pub packet_index: u64,
    /// Capture timestamp of that packet
    pub timestamp_ns: u64,
    /// Absolute file offset of the first payload byte
    pub file_offset: u64,
    /// Payload bytes; empty when the packet is shorter than the header skip
    pub bytes: &'a [u8],
}

impl TransportPayload<'_> {
    /// Payload length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Strips a fixed-size header prefix from packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLocator {
    header_len: usize,
}

impl Default for PayloadLocator {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_LEN)
    }
}

impl PayloadLocator {
    /// Create a locator that skips `header_len` bytes.
    pub fn new(header_len: usize) -> Self {
        Self { header_len }
    }

    /// Configured header skip.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Slice the payload out of a packet.
    pub fn locate<'a>(&self, packet: &PacketView<'a>) -> TransportPayload<'a> {
        let (bytes, skipped) = match packet.bytes.get(self.header_len..) {
            Some(rest) => (rest, self.header_len),
            None => (&packet.bytes[packet.bytes.len()..], packet.bytes.len()),
        };
        TransportPayload {
            packet_index: packet.index,
            timestamp_ns: packet.timestamp_ns,
            file_offset: packet.data_offset + skipped as u64,
            bytes,
        }
    }
}
