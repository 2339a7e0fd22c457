// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! pcapng block reader.
//!
//! Every block is `type: u32, length: u32, body, length: u32`. The reader
//! validates the leading length against the 12-byte minimum and the bytes
//! left in the file, then advances by exactly that length whether or not it
//! understands the block. Only three block types are interpreted:
//!
//! - Section Header (`0x0a0d0d0a`): sets the byte order for the section and
//!   resets the interface table
//! - Interface Description (`0x00000001`): link type, snap length and
//!   timestamp resolution
//! - Enhanced Packet (`0x00000006`): one captured packet
//!
//! Everything else is yielded as [`BlockKind::Skipped`].

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{CaptureError, FormatErrorKind, Result};
use crate::io::metadata::{Endian, InterfaceInfo, PacketView, TimestampResolution};

use super::constants::{
    BLOCK_ENHANCED_PACKET, BLOCK_INTERFACE_DESCRIPTION, BLOCK_SECTION_HEADER, BYTE_ORDER_MAGIC,
    EPB_FIXED_LEN, IDB_FIXED_LEN, MIN_BLOCK_LEN, MIN_SECTION_HEADER_LEN, OPT_END_OF_OPT,
    OPT_IF_TSRESOL,
};
use super::{BlockKind, ContainerBlock, SectionInfo};

/// Reader for pcapng files.
pub struct PcapNgReader<'a> {
    data: &'a [u8],
    cursor: usize,
    endian: Endian,
    interfaces: Vec<InterfaceInfo>,
    packet_index: u64,
    done: bool,
}

impl<'a> PcapNgReader<'a> {
    /// Create a reader positioned at the first Section Header Block.
    ///
    /// # Errors
    ///
    /// `TruncatedHeader` if the file cannot hold a block header, `BadMagic`
    /// if the first block is not a section header with a valid byte-order
    /// magic.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < MIN_BLOCK_LEN as usize {
            return Err(CaptureError::format(
                0,
                FormatErrorKind::TruncatedHeader {
                    required: MIN_BLOCK_LEN as usize,
                    available: data.len(),
                },
            ));
        }
        let magic = LittleEndian::read_u32(&data[0..4]);
        if magic != BLOCK_SECTION_HEADER {
            return Err(CaptureError::format(0, FormatErrorKind::BadMagic { magic }));
        }
        let endian = section_endian(data)?;

        Ok(Self {
            data,
            cursor: 0,
            endian,
            interfaces: Vec::new(),
            packet_index: 0,
            done: false,
        })
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.cursor as u64
    }

    /// Byte order of the current section.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Interfaces described so far in the current section.
    pub fn interfaces(&self) -> &[InterfaceInfo] {
        &self.interfaces
    }

    fn fail(&mut self, offset: usize, kind: FormatErrorKind) -> Option<Result<ContainerBlock<'a>>> {
        self.done = true;
        Some(Err(CaptureError::format(offset as u64, kind)))
    }

    fn section_header(&mut self, body: &[u8]) -> BlockKind<'a> {
        self.interfaces.clear();
        BlockKind::SectionHeader(SectionInfo {
            endian: self.endian,
            major_version: self.endian.u16_at(body, 4).unwrap_or(0),
            minor_version: self.endian.u16_at(body, 6).unwrap_or(0),
            interface: None,
        })
    }

    fn interface_description(&mut self, offset: usize, body: &[u8]) -> BlockKind<'a> {
        let interface_id = self.interfaces.len() as u32;
        let info = if body.len() < IDB_FIXED_LEN {
            tracing::warn!(
                offset,
                len = body.len(),
                "interface description too short, using defaults"
            );
            InterfaceInfo::default()
        } else {
            InterfaceInfo {
                link_type: u32::from(self.endian.u16(&body[0..2])),
                snap_len: self.endian.u32(&body[4..8]),
                ts_resolution: parse_tsresol(self.endian, &body[IDB_FIXED_LEN..]),
            }
        };
        self.interfaces.push(info);
        BlockKind::InterfaceDescription { interface_id, info }
    }

    fn enhanced_packet(
        &mut self,
        offset: usize,
        body: &'a [u8],
    ) -> std::result::Result<BlockKind<'a>, FormatErrorKind> {
        if body.len() < EPB_FIXED_LEN {
            return Err(FormatErrorKind::PacketOverrun {
                captured: EPB_FIXED_LEN as u64,
                available: body.len() as u64,
            });
        }
        let interface_id = self.endian.u32(&body[0..4]);
        let ts_high = self.endian.u32(&body[4..8]);
        let ts_low = self.endian.u32(&body[8..12]);
        let captured = self.endian.u32(&body[12..16]);
        let original = self.endian.u32(&body[16..20]);

        let available = body.len() - EPB_FIXED_LEN;
        if captured as usize > available {
            return Err(FormatErrorKind::PacketOverrun {
                captured: u64::from(captured),
                available: available as u64,
            });
        }

        let ticks = (u64::from(ts_high) << 32) | u64::from(ts_low);
        let resolution = self
            .interfaces
            .get(interface_id as usize)
            .map(|i| i.ts_resolution)
            .unwrap_or_default();

        let packet = PacketView {
            index: self.packet_index,
            // block header (8) + fixed EPB fields
            data_offset: (offset + 8 + EPB_FIXED_LEN) as u64,
            captured_length: captured,
            original_length: original,
            timestamp_ns: resolution.to_nanos(ticks),
            interface_id,
            bytes: &body[EPB_FIXED_LEN..EPB_FIXED_LEN + captured as usize],
        };
        self.packet_index += 1;
        Ok(BlockKind::EnhancedPacket(packet))
    }
}

impl<'a> Iterator for PcapNgReader<'a> {
    type Item = Result<ContainerBlock<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let data = self.data;
        let offset = self.cursor;
        let remaining = data.len() - offset;
        if remaining == 0 {
            self.done = true;
            return None;
        }
        if remaining < MIN_BLOCK_LEN as usize {
            return self.fail(offset, FormatErrorKind::TrailingBytes { remaining });
        }

        let block = &data[offset..];
        let is_section = LittleEndian::read_u32(&block[0..4]) == BLOCK_SECTION_HEADER;
        if is_section {
            match section_endian(block) {
                Ok(endian) => self.endian = endian,
                Err(CaptureError::Format { kind, .. }) => return self.fail(offset, kind),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let block_type = self.endian.u32(&block[0..4]);
        let length = self.endian.u32(&block[4..8]);
        let minimum = if is_section {
            MIN_SECTION_HEADER_LEN
        } else {
            MIN_BLOCK_LEN
        };
        if length < minimum {
            return self.fail(
                offset,
                FormatErrorKind::BlockTooShort {
                    declared: length,
                    minimum,
                },
            );
        }
        if length as usize > remaining {
            return self.fail(
                offset,
                FormatErrorKind::BlockOverrun {
                    declared: u64::from(length),
                    remaining: remaining as u64,
                },
            );
        }

        let len = length as usize;
        self.cursor = offset + len;

        let raw = &block[..len];
        let trailing = self.endian.u32(&raw[len - 4..]);
        if trailing != length {
            tracing::warn!(offset, leading = length, trailing, "block length mismatch");
            return Some(Err(CaptureError::format(
                offset as u64,
                FormatErrorKind::LengthMismatch {
                    leading: length,
                    trailing,
                },
            )));
        }
        let body = &raw[8..len - 4];

        let kind = match block_type {
            BLOCK_SECTION_HEADER => self.section_header(body),
            BLOCK_INTERFACE_DESCRIPTION => self.interface_description(offset, body),
            BLOCK_ENHANCED_PACKET => match self.enhanced_packet(offset, body) {
                Ok(kind) => kind,
                Err(kind) => {
                    tracing::warn!(offset, error = %kind, "skipping malformed packet block");
                    return Some(Err(CaptureError::format(offset as u64, kind)));
                }
            },
            _ => BlockKind::Skipped,
        };

        Some(Ok(ContainerBlock {
            offset: offset as u64,
            block_type,
            declared_length: u64::from(length),
            body,
            kind,
        }))
    }
}

impl std::iter::FusedIterator for PcapNgReader<'_> {}

/// Byte order of a section, from the magic at offset 8 of its header block.
fn section_endian(block: &[u8]) -> Result<Endian> {
    let bom = block.get(8..12).ok_or_else(|| {
        CaptureError::format(
            0,
            FormatErrorKind::TruncatedHeader {
                required: 12,
                available: block.len(),
            },
        )
    })?;
    let magic = LittleEndian::read_u32(bom);
    if magic == BYTE_ORDER_MAGIC {
        Ok(Endian::Little)
    } else if magic == BYTE_ORDER_MAGIC.swap_bytes() {
        Ok(Endian::Big)
    } else {
        Err(CaptureError::format(8, FormatErrorKind::BadMagic { magic }))
    }
}

/// Find the `if_tsresol` option in an interface description's option list.
fn parse_tsresol(endian: Endian, mut options: &[u8]) -> TimestampResolution {
    while options.len() >= 4 {
        let code = endian.u16(&options[0..2]);
        let len = endian.u16(&options[2..4]) as usize;
        if code == OPT_END_OF_OPT {
            break;
        }
        let padded = (len + 3) & !3;
        let Some(value) = options.get(4..4 + len) else {
            break;
        };
        if code == OPT_IF_TSRESOL && len == 1 {
            return TimestampResolution::from_option(value[0]);
        }
        options = options.get(4 + padded..).unwrap_or(&[]);
    }
    TimestampResolution::default()
}
