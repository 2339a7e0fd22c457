// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! Captures and messages are synthesized byte by byte so every test owns
//! its input and no fixture files are needed.

#![allow(dead_code)]

use std::path::PathBuf;

use mdcap::io::formats::constants::{
    BLOCK_ENHANCED_PACKET, BLOCK_INTERFACE_DESCRIPTION, BLOCK_INTERFACE_STATISTICS,
    BLOCK_SECTION_HEADER, BYTE_ORDER_MAGIC,
};

/// Ethernet + IPv4 + UDP header bytes in front of every payload.
pub const HEADER_LEN: usize = 42;

/// Exchange timestamp used by the message builders (09:30 in ns).
pub const MARKET_OPEN_NS: u64 = 34_200_000_000_000;

// ============================================================================
// Messages
// ============================================================================

fn header(tag: u8, timestamp: u64) -> Vec<u8> {
    let mut msg = vec![tag];
    msg.extend_from_slice(&timestamp.to_le_bytes());
    msg
}

/// Space-pad a symbol to the 8-byte wire form.
pub fn wire_symbol(symbol: &str) -> [u8; 8] {
    let mut out = [b' '; 8];
    for (dst, src) in out.iter_mut().zip(symbol.bytes()) {
        *dst = src;
    }
    out
}

/// Trade report (0x54), 26 bytes.
pub fn trade(symbol: &str, price: u32, size: u32, side: u8) -> Vec<u8> {
    let mut msg = header(0x54, MARKET_OPEN_NS);
    msg.extend_from_slice(&wire_symbol(symbol));
    msg.extend_from_slice(&price.to_le_bytes());
    msg.extend_from_slice(&size.to_le_bytes());
    msg.push(side);
    msg
}

/// Quote update (0x51), 33 bytes.
pub fn quote(symbol: &str, bid: u32, bid_size: u32, ask: u32, ask_size: u32) -> Vec<u8> {
    let mut msg = header(0x51, MARKET_OPEN_NS);
    msg.extend_from_slice(&wire_symbol(symbol));
    msg.extend_from_slice(&bid.to_le_bytes());
    msg.extend_from_slice(&bid_size.to_le_bytes());
    msg.extend_from_slice(&ask.to_le_bytes());
    msg.extend_from_slice(&ask_size.to_le_bytes());
    msg
}

/// System event (0x53), 10 bytes.
pub fn system_event(code: u8) -> Vec<u8> {
    let mut msg = header(0x53, MARKET_OPEN_NS);
    msg.push(code);
    msg
}

/// Trading status (0x48), 19 bytes.
pub fn trading_status(symbol: &str, status: u8) -> Vec<u8> {
    let mut msg = header(0x48, MARKET_OPEN_NS);
    msg.extend_from_slice(&wire_symbol(symbol));
    msg.push(status);
    msg.extend_from_slice(b" ");
    msg
}

/// Official price (0x58), 21 bytes.
pub fn official_price(symbol: &str, price: u32) -> Vec<u8> {
    let mut msg = header(0x58, MARKET_OPEN_NS);
    msg.extend_from_slice(&wire_symbol(symbol));
    msg.extend_from_slice(&price.to_le_bytes());
    msg
}

/// Prefix a message run with the 42-byte transport header.
pub fn udp_packet(messages: &[Vec<u8>]) -> Vec<u8> {
    let mut packet = vec![0u8; HEADER_LEN];
    for msg in messages {
        packet.extend_from_slice(msg);
    }
    packet
}

// ============================================================================
// Classic pcap
// ============================================================================

/// Classic little-endian microsecond capture, one record per packet.
/// Packet `i` is stamped at `i` seconds.
pub fn classic_capture(packets: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&65_535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (i, packet) in packets.iter().enumerate() {
        let len = packet.len() as u32;
        out.extend_from_slice(&(i as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(packet);
    }
    out
}

// ============================================================================
// pcapng
// ============================================================================

/// Frame a pcapng block, padding the body to 4 bytes.
pub fn block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let padded = (body.len() + 3) & !3;
    let total = (12 + padded) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(&block_type.to_le_bytes());
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(body);
    out.resize(8 + padded, 0);
    out.extend_from_slice(&total.to_le_bytes());
    out
}

/// Little-endian Section Header Block with unknown section length.
pub fn section_header() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&BYTE_ORDER_MAGIC.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&(-1i64).to_le_bytes());
    block(BLOCK_SECTION_HEADER, &body)
}

/// Ethernet Interface Description Block with nanosecond resolution.
pub fn interface_description() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&262_144u32.to_le_bytes());
    // if_tsresol = 9
    body.extend_from_slice(&9u16.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&[9, 0, 0, 0]);
    body.extend_from_slice(&[0; 4]);
    block(BLOCK_INTERFACE_DESCRIPTION, &body)
}

/// Enhanced Packet Block on interface 0.
pub fn enhanced_packet(ticks: u64, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&((ticks >> 32) as u32).to_le_bytes());
    body.extend_from_slice(&(ticks as u32).to_le_bytes());
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(data);
    block(BLOCK_ENHANCED_PACKET, &body)
}

/// Interface Statistics Block, which readers skip whole.
pub fn interface_statistics() -> Vec<u8> {
    block(BLOCK_INTERFACE_STATISTICS, &[0u8; 12])
}

/// SHB + IDB + one EPB per packet. Packet `i` is stamped at `i` ms.
pub fn pcapng_capture(packets: &[Vec<u8>]) -> Vec<u8> {
    let mut out = section_header();
    out.extend(interface_description());
    for (i, packet) in packets.iter().enumerate() {
        out.extend(enhanced_packet(i as u64 * 1_000_000, packet));
    }
    out
}

/// A block header declaring far more bytes than follow it.
pub fn overrunning_block() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&BLOCK_ENHANCED_PACKET.to_le_bytes());
    out.extend_from_slice(&4096u32.to_le_bytes());
    out.extend_from_slice(&[0; 20]);
    out
}

// ============================================================================
// Files
// ============================================================================

/// Temp file removed on drop.
pub struct TempCapture {
    pub path: PathBuf,
}

impl TempCapture {
    /// Write `bytes` to a uniquely named file under the temp directory.
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!(
            "mdcap_test_{}_{}_{}",
            std::process::id(),
            name,
            unique()
        ));
        std::fs::write(&path, bytes).expect("write temp capture");
        Self { path }
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("utf-8 temp path")
    }
}

impl Drop for TempCapture {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn unique() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
