// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inline ticker symbols.
//!
//! Symbols on the wire are 8 bytes, left-justified and padded with spaces
//! (some feeds pad with NUL instead). Decoding stops at the first pad byte;
//! interior pads are not skipped. Only printable ASCII is retained, so the
//! decoded form is always valid UTF-8 and re-decoding it is a no-op.

use std::fmt;

/// Maximum symbol length in bytes.
pub const SYMBOL_LEN: usize = 8;

/// A decoded ticker symbol stored inline.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Symbol {
    bytes: [u8; SYMBOL_LEN],
    len: u8,
}

impl Symbol {
    /// Decode a symbol from up to 8 wire bytes.
    ///
    /// Copies bytes until the first space or NUL. Non-printable bytes before
    /// that point are dropped.
    pub fn decode(raw: &[u8]) -> Self {
        let mut symbol = Symbol::default();
        for &b in raw.iter().take(SYMBOL_LEN) {
            if b == b' ' || b == 0 {
                break;
            }
            if b.is_ascii_graphic() {
                symbol.bytes[symbol.len as usize] = b;
                symbol.len += 1;
            }
        }
        symbol
    }

    /// Encode into the 8-byte space-padded wire form.
    pub fn to_wire(&self) -> [u8; SYMBOL_LEN] {
        let mut out = [b' '; SYMBOL_LEN];
        out[..self.len()].copy_from_slice(self.as_bytes());
        out
    }

    /// Symbol bytes without padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Symbol as a string slice.
    pub fn as_str(&self) -> &str {
        // Only printable ASCII is ever stored.
        std::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the symbol is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl serde::Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
