// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for mdcap.
//!
//! Two families of errors exist:
//! - [`CaptureError`] covers the file as a whole: opening and mapping it,
//!   walking its container framing, configuration, and delivery of batches.
//! - [`DecodeError`] covers a single message candidate. It is `Copy`, carries
//!   no heap data and never aborts a scan; the caller drops or flags the
//!   candidate and moves on.

use thiserror::Error;

/// Kinds of container framing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    /// The first bytes of the file match no known capture format.
    #[error("unrecognized magic 0x{magic:08x}")]
    BadMagic {
        /// Magic value read as a little-endian u32
        magic: u32,
    },

    /// A fixed-size header runs past the end of the file.
    #[error("truncated header: need {required} bytes, {available} available")]
    TruncatedHeader {
        /// Bytes required by the header
        required: usize,
        /// Bytes left in the file
        available: usize,
    },

    /// A block declares a length below the 12-byte minimum.
    #[error("block length {declared} is below the minimum of {minimum}")]
    BlockTooShort {
        /// Declared block length
        declared: u32,
        /// Minimum legal length for this block
        minimum: u32,
    },

    /// A block declares more bytes than remain in the file.
    #[error("block length {declared} exceeds the {remaining} remaining bytes")]
    BlockOverrun {
        /// Declared block length
        declared: u64,
        /// Bytes left in the file
        remaining: u64,
    },

    /// Leading and trailing block length fields disagree.
    #[error("leading length {leading} does not match trailing length {trailing}")]
    LengthMismatch {
        /// Length at the block start
        leading: u32,
        /// Length at the block end
        trailing: u32,
    },

    /// A packet's captured length does not fit its enclosing block or record.
    #[error("captured length {captured} exceeds the {available} bytes available")]
    PacketOverrun {
        /// Captured length declared by the packet
        captured: u64,
        /// Bytes actually available for packet data
        available: u64,
    },

    /// Fewer bytes than a record header remain at the end of the file.
    #[error("{remaining} trailing bytes do not form a complete record")]
    TrailingBytes {
        /// Bytes left in the file
        remaining: usize,
    },
}

impl FormatErrorKind {
    /// Whether the reader can continue at the next block boundary.
    ///
    /// Recoverable errors happen inside a block whose total length is still
    /// trustworthy, so the cursor can advance past it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FormatErrorKind::LengthMismatch { .. } | FormatErrorKind::PacketOverrun { .. }
        )
    }

    /// Short stable name, used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            FormatErrorKind::BadMagic { .. } => "bad_magic",
            FormatErrorKind::TruncatedHeader { .. } => "truncated_header",
            FormatErrorKind::BlockTooShort { .. } => "block_too_short",
            FormatErrorKind::BlockOverrun { .. } => "block_overrun",
            FormatErrorKind::LengthMismatch { .. } => "length_mismatch",
            FormatErrorKind::PacketOverrun { .. } => "packet_overrun",
            FormatErrorKind::TrailingBytes { .. } => "trailing_bytes",
        }
    }
}

/// Errors that can occur while processing a capture file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Open, stat or map failure
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// File path
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Container framing error
    #[error("container format error at offset {offset}: {kind}")]
    Format {
        /// Absolute file offset of the offending block or header
        offset: u64,
        /// What was wrong
        kind: FormatErrorKind,
    },

    /// Rejected configuration value
    #[error("invalid configuration for '{field}': {reason}")]
    Config {
        /// Configuration field name
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// A batch consumer reported a failure
    #[error("batch sink error: {message}")]
    Sink {
        /// Error message
        message: String,
    },

    /// Worker pool could not be built
    #[error("worker pool error: {message}")]
    Worker {
        /// Error message
        message: String,
    },
}

impl CaptureError {
    /// Create an I/O error.
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        CaptureError::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a container format error.
    pub fn format(offset: u64, kind: FormatErrorKind) -> Self {
        CaptureError::Format { offset, kind }
    }

    /// Create a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CaptureError::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a sink error.
    pub fn sink(message: impl Into<String>) -> Self {
        CaptureError::Sink {
            message: message.into(),
        }
    }

    /// Create a worker pool error.
    pub fn worker(message: impl Into<String>) -> Self {
        CaptureError::Worker {
            message: message.into(),
        }
    }

    /// Whether processing can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CaptureError::Format { kind, .. } => kind.is_recoverable(),
            _ => false,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CaptureError::Io { path, message } => {
                vec![("path", path.clone()), ("message", message.clone())]
            }
            CaptureError::Format { offset, kind } => vec![
                ("offset", offset.to_string()),
                ("kind", kind.name().to_string()),
                ("detail", kind.to_string()),
            ],
            CaptureError::Config { field, reason } => {
                vec![("field", field.clone()), ("reason", reason.clone())]
            }
            CaptureError::Sink { message } | CaptureError::Worker { message } => {
                vec![("message", message.clone())]
            }
        }
    }
}

/// Result type for mdcap operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Coarse classification of a [`DecodeError`], used for counting and for
/// low-confidence records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    /// Not enough bytes
    Truncated,
    /// Value outside the plausible range
    Implausible,
    /// More than one plausible interpretation
    Ambiguous,
    /// Tag is not a decodable message type
    UnknownType,
}

/// Errors produced while decoding one message candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not enough bytes remain for the message's fields
    #[error("truncated message 0x{tag:02x}: need {required} bytes, {available} available")]
    Truncated {
        /// Message type tag
        tag: u8,
        /// Bytes the schema requires
        required: usize,
        /// Bytes remaining from the candidate offset
        available: usize,
    },

    /// A value falls outside every accepted interpretation
    #[error("implausible value {raw} for field '{field}'")]
    Implausible {
        /// Field name
        field: &'static str,
        /// Raw integer as read from the wire
        raw: u32,
    },

    /// A value is plausible under more than one interpretation
    #[error("ambiguous value {raw} for field '{field}'")]
    Ambiguous {
        /// Field name
        field: &'static str,
        /// Raw integer as read from the wire
        raw: u32,
    },

    /// The tag does not name a decodable message type
    #[error("unknown message type 0x{tag:02x}")]
    UnknownType {
        /// Tag byte
        tag: u8,
    },
}

impl DecodeError {
    /// Create a truncation error.
    pub fn truncated(tag: u8, required: usize, available: usize) -> Self {
        DecodeError::Truncated {
            tag,
            required,
            available,
        }
    }

    /// Create an implausible value error.
    pub fn implausible(field: &'static str, raw: u32) -> Self {
        DecodeError::Implausible { field, raw }
    }

    /// Create an ambiguous value error.
    pub fn ambiguous(field: &'static str, raw: u32) -> Self {
        DecodeError::Ambiguous { field, raw }
    }

    /// Coarse classification of this error.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::Truncated { .. } => DecodeErrorKind::Truncated,
            DecodeError::Implausible { .. } => DecodeErrorKind::Implausible,
            DecodeError::Ambiguous { .. } => DecodeErrorKind::Ambiguous,
            DecodeError::UnknownType { .. } => DecodeErrorKind::UnknownType,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            DecodeError::Truncated {
                tag,
                required,
                available,
            } => vec![
                ("tag", format!("0x{tag:02x}")),
                ("required", required.to_string()),
                ("available", available.to_string()),
            ],
            DecodeError::Implausible { field, raw } | DecodeError::Ambiguous { field, raw } => {
                vec![("field", (*field).to_string()), ("raw", raw.to_string())]
            }
            DecodeError::UnknownType { tag } => vec![("tag", format!("0x{tag:02x}"))],
        }
    }
}
