// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven message decoder.
//!
//! A single routine decodes every message type: it looks up the type's
//! [`MessageSchema`], checks that the whole layout fits in the remaining
//! bytes, reads each field through a bounds-checked [`FieldReader`] and only
//! then assembles the typed [`DecodedMessage`].
//!
//! Prices go through the configured [`PricePolicy`]. In strict mode a price
//! that is implausible or ambiguous fails the candidate. In lenient mode the
//! primary-scale value is kept and the result is marked
//! [`Confidence::Low`].

use crate::core::{
    Confidence, DecodeError, DecodeErrorKind, DecodedMessage, MessageType, Price, PricePolicy,
    Side, Symbol,
};
use crate::scan::Candidate;

use super::cursor::FieldReader;
use super::schema::{schema_for_tag, FieldKind, MessageSchema};

/// Most fields any schema has.
const MAX_FIELDS: usize = 8;

/// How validation failures on values are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Implausible or ambiguous values fail the candidate
    #[default]
    Strict,
    /// Keep the primary-scale value and flag the record
    Lenient,
}

/// Result of a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Typed message
    pub message: DecodedMessage,
    /// Exchange timestamp (ns since midnight)
    pub exchange_timestamp: u64,
    /// Validation status
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy)]
enum FieldValue {
    Byte(u8),
    Word(u32),
    Long(u64),
    Symbol(Symbol),
}

/// Raw field values of one message, in schema order.
struct FieldSet {
    schema: &'static MessageSchema,
    values: [FieldValue; MAX_FIELDS],
}

impl FieldSet {
    fn read(schema: &'static MessageSchema, reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        let mut values = [FieldValue::Byte(0); MAX_FIELDS];
        for (slot, field) in values.iter_mut().zip(schema.fields) {
            *slot = match field.kind {
                FieldKind::Byte => FieldValue::Byte(reader.u8_at(field.offset)?),
                FieldKind::Word | FieldKind::Price => {
                    FieldValue::Word(reader.u32_le_at(field.offset)?)
                }
                FieldKind::Long => FieldValue::Long(reader.u64_le_at(field.offset)?),
                FieldKind::Symbol => {
                    FieldValue::Symbol(Symbol::decode(reader.bytes_at(field.offset, field.width())?))
                }
            };
        }
        Ok(Self { schema, values })
    }

    fn get(&self, name: &str) -> Result<FieldValue, DecodeError> {
        self.schema
            .fields
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| self.values.get(i).copied())
            .ok_or(DecodeError::UnknownType {
                tag: self.schema.message_type.tag(),
            })
    }

    fn byte(&self, name: &str) -> Result<u8, DecodeError> {
        match self.get(name)? {
            FieldValue::Byte(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    fn word(&self, name: &str) -> Result<u32, DecodeError> {
        match self.get(name)? {
            FieldValue::Word(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    fn long(&self, name: &str) -> Result<u64, DecodeError> {
        match self.get(name)? {
            FieldValue::Long(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    fn symbol(&self) -> Result<Symbol, DecodeError> {
        match self.get("symbol")? {
            FieldValue::Symbol(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    fn mismatch(&self) -> DecodeError {
        DecodeError::UnknownType {
            tag: self.schema.message_type.tag(),
        }
    }
}

/// Applies the price policy and remembers the first tolerated failure.
struct PriceResolver<'p> {
    policy: &'p PricePolicy,
    mode: DecodeMode,
    low: Option<DecodeErrorKind>,
}

impl<'p> PriceResolver<'p> {
    fn new(policy: &'p PricePolicy, mode: DecodeMode) -> Self {
        Self {
            policy,
            mode,
            low: None,
        }
    }

    fn tolerate(&mut self, err: DecodeError, raw: u32) -> Result<Price, DecodeError> {
        match self.mode {
            DecodeMode::Strict => Err(err),
            DecodeMode::Lenient => {
                if self.low.is_none() {
                    self.low = Some(err.kind());
                }
                Ok(self.policy.primary(raw))
            }
        }
    }

    /// A price that must be plausible.
    fn required(&mut self, field: &'static str, raw: u32) -> Result<Price, DecodeError> {
        match self.policy.resolve(field, raw) {
            Ok(price) => Ok(price),
            Err(err) => self.tolerate(err, raw),
        }
    }

    /// A quote price. Implausible is a classification outcome, not an error.
    fn quote(&mut self, field: &'static str, raw: u32) -> Result<Option<Price>, DecodeError> {
        match self.policy.resolve(field, raw) {
            Ok(price) => Ok(Some(price)),
            Err(DecodeError::Implausible { .. }) => Ok(None),
            Err(err) => self.tolerate(err, raw).map(Some),
        }
    }

    fn confidence(&self) -> Confidence {
        match self.low {
            Some(kind) => Confidence::Low(kind),
            None => Confidence::Exact,
        }
    }
}

/// Decodes messages at validated candidate offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDecoder {
    policy: PricePolicy,
}

impl MessageDecoder {
    /// Create a decoder with the given price policy.
    pub fn new(policy: PricePolicy) -> Self {
        Self { policy }
    }

    /// Price policy in use.
    pub fn policy(&self) -> &PricePolicy {
        &self.policy
    }

    /// Strictly decode the message at a candidate.
    pub fn decode(
        &self,
        payload: &[u8],
        candidate: &Candidate,
    ) -> Result<DecodedMessage, DecodeError> {
        self.decode_at(payload, candidate.offset, DecodeMode::Strict)
            .map(|d| d.message)
    }

    /// Decode the message at a candidate, keeping implausible or ambiguous
    /// prices at the primary scale.
    pub fn decode_lenient(
        &self,
        payload: &[u8],
        candidate: &Candidate,
    ) -> Result<(DecodedMessage, Confidence), DecodeError> {
        self.decode_at(payload, candidate.offset, DecodeMode::Lenient)
            .map(|d| (d.message, d.confidence))
    }

    /// Decode the message whose tag byte is at `payload[offset]`.
    ///
    /// # Errors
    ///
    /// `Truncated` if the type's layout does not fit in the remaining bytes,
    /// `UnknownType` if the tag is not decodable, and in strict mode
    /// `Implausible` or `Ambiguous` for rejected prices.
    pub fn decode_at(
        &self,
        payload: &[u8],
        offset: usize,
        mode: DecodeMode,
    ) -> Result<Decoded, DecodeError> {
        let bytes = payload.get(offset..).unwrap_or(&[]);
        let reader = FieldReader::new(bytes);
        let tag = reader.u8_at(0)?;
        let schema = schema_for_tag(tag).ok_or(DecodeError::UnknownType { tag })?;
        reader.require(schema.min_length)?;

        let fields = FieldSet::read(schema, &reader)?;
        let mut prices = PriceResolver::new(&self.policy, mode);
        let message = build(schema.message_type, &fields, &mut prices)?;

        Ok(Decoded {
            message,
            exchange_timestamp: fields.long("timestamp")?,
            confidence: prices.confidence(),
        })
    }
}

fn build(
    message_type: MessageType,
    f: &FieldSet,
    prices: &mut PriceResolver<'_>,
) -> Result<DecodedMessage, DecodeError> {
    let message = match message_type {
        MessageType::SystemEvent => DecodedMessage::SystemEvent {
            event_code: f.byte("event_code")?,
        },
        MessageType::SecurityDirectory => DecodedMessage::SecurityDirectory {
            symbol: f.symbol()?,
            round_lot: f.byte("round_lot")?,
            luld_tier: f.byte("luld_tier")?,
        },
        MessageType::TradingStatus => DecodedMessage::TradingStatus {
            symbol: f.symbol()?,
            status: f.byte("status")?,
            reason: f.byte("reason")?,
        },
        MessageType::OperationalHalt => DecodedMessage::OperationalHalt {
            symbol: f.symbol()?,
            halt_status: f.byte("halt_status")?,
        },
        MessageType::ShortSalePriceTest => DecodedMessage::ShortSalePriceTest {
            symbol: f.symbol()?,
            status: f.byte("status")?,
            detail: f.byte("detail")?,
        },
        MessageType::QuoteUpdate => build_quote(f, prices)?,
        MessageType::TradeReport => DecodedMessage::TradeReport {
            symbol: f.symbol()?,
            price: prices.required("price", f.word("price")?)?,
            size: f.word("size")?,
            side: Side::from_byte(f.byte("side")?),
        },
        MessageType::TradeBreak => DecodedMessage::TradeBreak {
            symbol: f.symbol()?,
            price: prices.required("price", f.word("price")?)?,
            size: f.word("size")?,
            side: Side::from_byte(f.byte("side")?),
        },
        MessageType::OfficialPrice => DecodedMessage::OfficialPrice {
            symbol: f.symbol()?,
            price: prices.required("price", f.word("price")?)?,
        },
        MessageType::AuctionInformation => DecodedMessage::AuctionInformation {
            symbol: f.symbol()?,
            auction_type: f.byte("auction_type")?,
            paired_shares: f.word("paired_shares")?,
            reference_price: prices.required("reference_price", f.word("reference_price")?)?,
        },
    };
    Ok(message)
}

/// Quotes are classified rather than rejected:
/// - all price and size fields zero: `QuoteDeletion`
/// - both prices plausible, ask above bid, some size: `QuoteUpdate`
/// - anything else: `InactiveQuote`
fn build_quote(
    f: &FieldSet,
    prices: &mut PriceResolver<'_>,
) -> Result<DecodedMessage, DecodeError> {
    let symbol = f.symbol()?;
    let bid_raw = f.word("bid_price")?;
    let bid_size = f.word("bid_size")?;
    let ask_raw = f.word("ask_price")?;
    let ask_size = f.word("ask_size")?;

    if bid_raw == 0 && bid_size == 0 && ask_raw == 0 && ask_size == 0 {
        return Ok(DecodedMessage::QuoteDeletion { symbol });
    }

    let bid = prices.quote("bid_price", bid_raw)?;
    let ask = prices.quote("ask_price", ask_raw)?;
    if let (Some(bid_price), Some(ask_price)) = (bid, ask) {
        if ask_price > bid_price && (bid_size > 0 || ask_size > 0) {
            return Ok(DecodedMessage::QuoteUpdate {
                symbol,
                bid_price,
                bid_size,
                ask_price,
                ask_size,
            });
        }
    }

    Ok(DecodedMessage::InactiveQuote {
        symbol,
        bid_price: prices.policy.primary(bid_raw),
        bid_size,
        ask_price: prices.policy.primary(ask_raw),
        ask_size,
    })
}
