// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounds-checked fixed-offset field reader.
//!
//! Every read verifies `offset + width <= available` before touching the
//! bytes and reports a [`DecodeError::Truncated`] otherwise. Offsets are
//! relative to the message's tag byte.
//!
//! # Example
//!
//! ```
//! use mdcap::encoding::cursor::FieldReader;
//!
//! let data = [0x54, 0x2A, 0x00, 0x00, 0x00];
//! let reader = FieldReader::new(&data);
//! assert_eq!(reader.u32_le_at(1).unwrap(), 42);
//! assert!(reader.u32_le_at(2).is_err());
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::core::DecodeError;

/// Read-only view of one message's bytes.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    /// Bytes from the tag byte to the end of the payload
    data: &'a [u8],
    /// Tag byte, reported in truncation errors
    tag: u8,
}

impl<'a> FieldReader<'a> {
    /// Create a reader over the bytes starting at a message's tag.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            tag: data.first().copied().unwrap_or(0),
        }
    }

    /// Bytes available from the tag onward.
    pub fn available(&self) -> usize {
        self.data.len()
    }

    /// Tag byte of the message.
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Fail with `Truncated` unless `required` bytes are available.
    pub fn require(&self, required: usize) -> Result<(), DecodeError> {
        if required > self.data.len() {
            return Err(DecodeError::truncated(self.tag, required, self.data.len()));
        }
        Ok(())
    }

    /// Borrow `width` bytes at `offset`.
    pub fn bytes_at(&self, offset: usize, width: usize) -> Result<&'a [u8], DecodeError> {
        let end = offset
            .checked_add(width)
            .ok_or_else(|| DecodeError::truncated(self.tag, usize::MAX, self.data.len()))?;
        self.data
            .get(offset..end)
            .ok_or_else(|| DecodeError::truncated(self.tag, end, self.data.len()))
    }

    /// Read a byte.
    pub fn u8_at(&self, offset: usize) -> Result<u8, DecodeError> {
        Ok(self.bytes_at(offset, 1)?[0])
    }

    /// Read a little-endian u32.
    pub fn u32_le_at(&self, offset: usize) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.bytes_at(offset, 4)?))
    }

    /// Read a little-endian u64.
    pub fn u64_le_at(&self, offset: usize) -> Result<u64, DecodeError> {
        Ok(LittleEndian::read_u64(self.bytes_at(offset, 8)?))
    }
}
