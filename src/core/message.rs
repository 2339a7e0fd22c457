// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Market-data message types.
//!
//! Every message starts with a one-byte type tag followed by an 8-byte
//! little-endian timestamp (nanoseconds since midnight). The tag decides the
//! fixed layout of the rest; see [`crate::encoding::schema`].

use serde::Serialize;

use crate::core::error::DecodeErrorKind;
use crate::core::price::Price;
use crate::core::symbol::Symbol;

/// Known message type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum MessageType {
    /// Start/end of day and market hours events
    SystemEvent = 0x53,
    /// Per-symbol reference data
    SecurityDirectory = 0x44,
    /// Halt / pause / trading state changes
    TradingStatus = 0x48,
    /// Exchange-specific operational halt
    OperationalHalt = 0x4F,
    /// Short sale price test (Reg SHO) state
    ShortSalePriceTest = 0x50,
    /// Top-of-book quote
    QuoteUpdate = 0x51,
    /// Execution
    TradeReport = 0x54,
    /// Official opening/closing price
    OfficialPrice = 0x58,
    /// Broken execution
    TradeBreak = 0x42,
    /// Auction imbalance information
    AuctionInformation = 0x41,
}

/// Tag of the retail liquidity indicator, counted but not decoded.
pub const RETAIL_LIQUIDITY_TAG: u8 = 0x52;

impl MessageType {
    /// All decodable message types.
    pub const ALL: [MessageType; 10] = [
        MessageType::SystemEvent,
        MessageType::SecurityDirectory,
        MessageType::TradingStatus,
        MessageType::OperationalHalt,
        MessageType::ShortSalePriceTest,
        MessageType::QuoteUpdate,
        MessageType::TradeReport,
        MessageType::OfficialPrice,
        MessageType::TradeBreak,
        MessageType::AuctionInformation,
    ];

    /// Look up a message type by tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x53 => Some(MessageType::SystemEvent),
            0x44 => Some(MessageType::SecurityDirectory),
            0x48 => Some(MessageType::TradingStatus),
            0x4F => Some(MessageType::OperationalHalt),
            0x50 => Some(MessageType::ShortSalePriceTest),
            0x51 => Some(MessageType::QuoteUpdate),
            0x54 => Some(MessageType::TradeReport),
            0x58 => Some(MessageType::OfficialPrice),
            0x42 => Some(MessageType::TradeBreak),
            0x41 => Some(MessageType::AuctionInformation),
            _ => None,
        }
    }

    /// Wire tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::SystemEvent => "System Event",
            MessageType::SecurityDirectory => "Security Directory",
            MessageType::TradingStatus => "Trading Status",
            MessageType::OperationalHalt => "Operational Halt",
            MessageType::ShortSalePriceTest => "Short Sale Price Test",
            MessageType::QuoteUpdate => "Quote Update",
            MessageType::TradeReport => "Trade Report",
            MessageType::OfficialPrice => "Official Price",
            MessageType::TradeBreak => "Trade Break",
            MessageType::AuctionInformation => "Auction Information",
        }
    }
}

/// Name for any tag byte, including tags that are counted but not decoded.
pub fn tag_name(tag: u8) -> Option<&'static str> {
    match MessageType::from_tag(tag) {
        Some(ty) => Some(ty.name()),
        None if tag == RETAIL_LIQUIDITY_TAG => Some("Retail Liquidity Indicator"),
        None => None,
    }
}

/// Aggressor side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// `B`
    Buy,
    /// `S`
    Sell,
    /// Any other byte, kept as read
    Other(u8),
}

impl Side {
    /// Decode a side byte.
    pub fn from_byte(b: u8) -> Self {
        match b {
            b'B' => Side::Buy,
            b'S' => Side::Sell,
            other => Side::Other(other),
        }
    }

    /// Wire byte.
    pub fn as_byte(self) -> u8 {
        match self {
            Side::Buy => b'B',
            Side::Sell => b'S',
            Side::Other(b) => b,
        }
    }
}

/// Description of a system event code.
pub fn system_event_description(code: u8) -> &'static str {
    match code {
        b'O' => "Start of Messages",
        b'S' => "Start of System Hours",
        b'Q' => "Start of Regular Market Hours",
        b'M' => "End of Regular Market Hours",
        b'E' => "End of System Hours",
        b'C' => "End of Messages",
        _ => "Unknown",
    }
}

/// Description of a trading status code.
pub fn trading_status_description(status: u8) -> &'static str {
    match status {
        b'H' => "Trading Halted",
        b'O' => "Order Acceptance Period",
        b'P' => "Trading Paused",
        b'T' => "Trading",
        _ => "Unknown",
    }
}

/// Description of an auction type code.
pub fn auction_type_description(auction_type: u8) -> &'static str {
    match auction_type {
        b'O' => "Opening",
        b'C' => "Closing",
        b'H' => "Halt",
        b'I' => "IPO",
        _ => "Unknown",
    }
}

/// A decoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum DecodedMessage {
    SystemEvent {
        event_code: u8,
    },
    SecurityDirectory {
        symbol: Symbol,
        round_lot: u8,
        luld_tier: u8,
    },
    TradingStatus {
        symbol: Symbol,
        status: u8,
        reason: u8,
    },
    OperationalHalt {
        symbol: Symbol,
        halt_status: u8,
    },
    ShortSalePriceTest {
        symbol: Symbol,
        status: u8,
        detail: u8,
    },
    QuoteUpdate {
        symbol: Symbol,
        bid_price: Price,
        bid_size: u32,
        ask_price: Price,
        ask_size: u32,
    },
    /// A quote whose price and size fields are all zero.
    QuoteDeletion {
        symbol: Symbol,
    },
    /// A quote that fails the validity rule. Prices are raw primary-scale values.
    InactiveQuote {
        symbol: Symbol,
        bid_price: Price,
        bid_size: u32,
        ask_price: Price,
        ask_size: u32,
    },
    TradeReport {
        symbol: Symbol,
        price: Price,
        size: u32,
        side: Side,
    },
    OfficialPrice {
        symbol: Symbol,
        price: Price,
    },
    AuctionInformation {
        symbol: Symbol,
        auction_type: u8,
        paired_shares: u32,
        reference_price: Price,
    },
    TradeBreak {
        symbol: Symbol,
        price: Price,
        size: u32,
        side: Side,
    },
}

impl DecodedMessage {
    /// Wire message type this message was decoded from.
    pub fn message_type(&self) -> MessageType {
        match self {
            DecodedMessage::SystemEvent { .. } => MessageType::SystemEvent,
            DecodedMessage::SecurityDirectory { .. } => MessageType::SecurityDirectory,
            DecodedMessage::TradingStatus { .. } => MessageType::TradingStatus,
            DecodedMessage::OperationalHalt { .. } => MessageType::OperationalHalt,
            DecodedMessage::ShortSalePriceTest { .. } => MessageType::ShortSalePriceTest,
            DecodedMessage::QuoteUpdate { .. }
            | DecodedMessage::QuoteDeletion { .. }
            | DecodedMessage::InactiveQuote { .. } => MessageType::QuoteUpdate,
            DecodedMessage::TradeReport { .. } => MessageType::TradeReport,
            DecodedMessage::OfficialPrice { .. } => MessageType::OfficialPrice,
            DecodedMessage::AuctionInformation { .. } => MessageType::AuctionInformation,
            DecodedMessage::TradeBreak { .. } => MessageType::TradeBreak,
        }
    }

    /// Symbol, for every message type that carries one.
    pub fn symbol(&self) -> Option<Symbol> {
        match *self {
            DecodedMessage::SystemEvent { .. } => None,
            DecodedMessage::SecurityDirectory { symbol, .. }
            | DecodedMessage::TradingStatus { symbol, .. }
            | DecodedMessage::OperationalHalt { symbol, .. }
            | DecodedMessage::ShortSalePriceTest { symbol, .. }
            | DecodedMessage::QuoteUpdate { symbol, .. }
            | DecodedMessage::QuoteDeletion { symbol }
            | DecodedMessage::InactiveQuote { symbol, .. }
            | DecodedMessage::TradeReport { symbol, .. }
            | DecodedMessage::OfficialPrice { symbol, .. }
            | DecodedMessage::AuctionInformation { symbol, .. }
            | DecodedMessage::TradeBreak { symbol, .. } => Some(symbol),
        }
    }
}

/// How much a decoded record can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Every field passed validation
    #[default]
    Exact,
    /// Kept despite a validation failure of the given kind
    Low(DecodeErrorKind),
}

/// A decoded message together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    /// Absolute file offset of the tag byte
    pub file_offset: u64,
    /// Zero-based index of the packet in the capture
    pub packet_index: u64,
    /// Capture timestamp of the enclosing packet (ns since the epoch)
    pub capture_timestamp_ns: u64,
    /// Exchange timestamp from the message (ns since midnight)
    pub exchange_timestamp: u64,
    /// Decoded body
    pub message: DecodedMessage,
    /// Validation status
    pub confidence: Confidence,
}
