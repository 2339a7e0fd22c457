// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-type field layouts.
//!
//! One static table describes every decodable message type. Offsets are
//! relative to the tag byte. The decoder reads fields only through this
//! table; no other code knows a field offset.
//!
//! | Type               | Tag  | Fields after timestamp (@1, u64)                      | Min |
//! |--------------------|------|--------------------------------------------------------|-----|
//! | SystemEvent        | 0x53 | event_code @9                                          | 10  |
//! | SecurityDirectory  | 0x44 | symbol @9, round_lot @17, adjusted_poc @18, luld @19  | 20  |
//! | TradingStatus      | 0x48 | symbol @9, status @17, reason @18                      | 19  |
//! | OperationalHalt    | 0x4F | symbol @9, halt_status @17                             | 18  |
//! | ShortSalePriceTest | 0x50 | symbol @9, status @17, detail @18                      | 19  |
//! | QuoteUpdate        | 0x51 | symbol @9, bid @17, bid_size @21, ask @25, ask_size @29 | 33  |
//! | TradeReport        | 0x54 | symbol @9, price @17, size @21, side @25               | 26  |
//! | OfficialPrice      | 0x58 | symbol @9, price @17                                   | 21  |
//! | TradeBreak         | 0x42 | symbol @9, price @17, size @21, side @25               | 26  |
//! | AuctionInformation | 0x41 | symbol @9, type @17, paired @18, reference @22         | 26  |

use crate::core::symbol::SYMBOL_LEN;
use crate::core::MessageType;

/// Offset of the exchange timestamp in every message.
pub const TIMESTAMP_OFFSET: usize = 1;
/// Offset of the symbol in every message that carries one.
pub const SYMBOL_OFFSET: usize = 9;
/// Offset of the byte the scanner requires to be an uppercase letter.
pub const CHECK_OFFSET: usize = 9;

/// How a field's bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single byte (code or small integer)
    Byte,
    /// Little-endian u32
    Word,
    /// Little-endian u64
    Long,
    /// Little-endian u32 fixed-point price
    Price,
    /// 8-byte space-padded ASCII symbol
    Symbol,
}

impl FieldKind {
    /// Width in bytes.
    pub const fn width(self) -> usize {
        match self {
            FieldKind::Byte => 1,
            FieldKind::Word | FieldKind::Price => 4,
            FieldKind::Long => 8,
            FieldKind::Symbol => SYMBOL_LEN,
        }
    }
}

/// One field of a message layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name
    pub name: &'static str,
    /// Offset from the tag byte
    pub offset: usize,
    /// Interpretation
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: usize, kind: FieldKind) -> Self {
        Self { name, offset, kind }
    }

    /// Width in bytes.
    pub const fn width(&self) -> usize {
        self.kind.width()
    }

    /// First offset past the field.
    pub const fn end(&self) -> usize {
        self.offset + self.kind.width()
    }
}

/// Layout of one message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSchema {
    /// Message type described
    pub message_type: MessageType,
    /// Fields in wire order
    pub fields: &'static [FieldSpec],
    /// Bytes required from the tag onward
    pub min_length: usize,
    /// Offset of the scanner's plausibility byte
    pub check_offset: usize,
}

impl MessageSchema {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const TIMESTAMP: FieldSpec = FieldSpec::new("timestamp", TIMESTAMP_OFFSET, FieldKind::Long);
const SYMBOL: FieldSpec = FieldSpec::new("symbol", SYMBOL_OFFSET, FieldKind::Symbol);

const SYSTEM_EVENT: &[FieldSpec] = &[TIMESTAMP, FieldSpec::new("event_code", 9, FieldKind::Byte)];

const SECURITY_DIRECTORY: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("round_lot", 17, FieldKind::Byte),
    FieldSpec::new("adjusted_poc", 18, FieldKind::Byte),
    FieldSpec::new("luld_tier", 19, FieldKind::Byte),
];

const TRADING_STATUS: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("status", 17, FieldKind::Byte),
    FieldSpec::new("reason", 18, FieldKind::Byte),
];

const OPERATIONAL_HALT: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("halt_status", 17, FieldKind::Byte),
];

const SHORT_SALE_PRICE_TEST: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("status", 17, FieldKind::Byte),
    FieldSpec::new("detail", 18, FieldKind::Byte),
];

const QUOTE_UPDATE: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("bid_price", 17, FieldKind::Price),
    FieldSpec::new("bid_size", 21, FieldKind::Word),
    FieldSpec::new("ask_price", 25, FieldKind::Price),
    FieldSpec::new("ask_size", 29, FieldKind::Word),
];

const TRADE: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("price", 17, FieldKind::Price),
    FieldSpec::new("size", 21, FieldKind::Word),
    FieldSpec::new("side", 25, FieldKind::Byte),
];

const OFFICIAL_PRICE: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("price", 17, FieldKind::Price),
];

const AUCTION_INFORMATION: &[FieldSpec] = &[
    TIMESTAMP,
    SYMBOL,
    FieldSpec::new("auction_type", 17, FieldKind::Byte),
    FieldSpec::new("paired_shares", 18, FieldKind::Word),
    FieldSpec::new("reference_price", 22, FieldKind::Price),
];

const fn schema(message_type: MessageType, fields: &'static [FieldSpec]) -> MessageSchema {
    // Minimum length is the furthest field end.
    let mut min_length = 0;
    let mut i = 0;
    while i < fields.len() {
        let end = fields[i].end();
        if end > min_length {
            min_length = end;
        }
        i += 1;
    }
    MessageSchema {
        message_type,
        fields,
        min_length,
        check_offset: CHECK_OFFSET,
    }
}

static SCHEMAS: [MessageSchema; 10] = [
    schema(MessageType::SystemEvent, SYSTEM_EVENT),
    schema(MessageType::SecurityDirectory, SECURITY_DIRECTORY),
    schema(MessageType::TradingStatus, TRADING_STATUS),
    schema(MessageType::OperationalHalt, OPERATIONAL_HALT),
    schema(MessageType::ShortSalePriceTest, SHORT_SALE_PRICE_TEST),
    schema(MessageType::QuoteUpdate, QUOTE_UPDATE),
    schema(MessageType::TradeReport, TRADE),
    schema(MessageType::OfficialPrice, OFFICIAL_PRICE),
    schema(MessageType::TradeBreak, TRADE),
    schema(MessageType::AuctionInformation, AUCTION_INFORMATION),
];

/// All schemas, in [`MessageType::ALL`] order.
pub fn schemas() -> &'static [MessageSchema] {
    &SCHEMAS
}

/// Schema of a message type.
pub fn schema_for(message_type: MessageType) -> &'static MessageSchema {
    let index = MessageType::ALL
        .iter()
        .position(|t| *t == message_type)
        .unwrap_or(0);
    &SCHEMAS[index]
}

/// Schema for a tag byte, if it names a decodable type.
pub fn schema_for_tag(tag: u8) -> Option<&'static MessageSchema> {
    MessageType::from_tag(tag).map(schema_for)
}
