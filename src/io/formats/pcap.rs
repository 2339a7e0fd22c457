// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Classic libpcap reader.
//!
//! Layout: a 24-byte global header, then records of a 16-byte header
//! (`ts_sec`, `ts_frac`, `incl_len`, `orig_len`) followed by `incl_len`
//! bytes of packet data. Records carry no trailer, so a record that claims
//! more bytes than remain leaves no computable boundary and ends the file.

use crate::core::{CaptureError, FormatErrorKind, Result};
use crate::io::metadata::{CaptureFormat, Endian, InterfaceInfo, PacketView, TimestampResolution};

use super::constants::{CLASSIC_RECORD_TYPE, PCAP_GLOBAL_HEADER_LEN, PCAP_RECORD_HEADER_LEN};
use super::{BlockKind, ContainerBlock, SectionInfo};

/// Reader for classic pcap files.
pub struct ClassicReader<'a> {
    data: &'a [u8],
    cursor: usize,
    endian: Endian,
    nanosecond: bool,
    section: SectionInfo,
    header_yielded: bool,
    packet_index: u64,
    done: bool,
}

impl<'a> ClassicReader<'a> {
    /// Parse the global header.
    ///
    /// # Errors
    ///
    /// `TruncatedHeader` if the file is shorter than the 24-byte global header.
    pub fn new(data: &'a [u8], endian: Endian, nanosecond: bool) -> Result<Self> {
        let header = data.get(..PCAP_GLOBAL_HEADER_LEN).ok_or_else(|| {
            CaptureError::format(
                0,
                FormatErrorKind::TruncatedHeader {
                    required: PCAP_GLOBAL_HEADER_LEN,
                    available: data.len(),
                },
            )
        })?;

        let interface = InterfaceInfo {
            link_type: endian.u32(&header[20..24]),
            snap_len: endian.u32(&header[16..20]),
            ts_resolution: if nanosecond {
                TimestampResolution::Decimal(9)
            } else {
                TimestampResolution::Decimal(6)
            },
        };
        let section = SectionInfo {
            endian,
            major_version: endian.u16(&header[4..6]),
            minor_version: endian.u16(&header[6..8]),
            interface: Some(interface),
        };

        Ok(Self {
            data,
            cursor: 0,
            endian,
            nanosecond,
            section,
            header_yielded: false,
            packet_index: 0,
            done: false,
        })
    }

    /// Container format of this file.
    pub fn format(&self) -> CaptureFormat {
        CaptureFormat::Pcap {
            endian: self.endian,
            nanosecond: self.nanosecond,
        }
    }

    /// Implicit interface of the file.
    pub fn section(&self) -> &SectionInfo {
        &self.section
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.cursor as u64
    }

    fn fail(&mut self, offset: usize, kind: FormatErrorKind) -> Option<Result<ContainerBlock<'a>>> {
        self.done = true;
        Some(Err(CaptureError::format(offset as u64, kind)))
    }
}

impl<'a> Iterator for ClassicReader<'a> {
    type Item = Result<ContainerBlock<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.header_yielded {
            self.header_yielded = true;
            self.cursor = PCAP_GLOBAL_HEADER_LEN;
            return Some(Ok(ContainerBlock {
                offset: 0,
                block_type: self.endian.u32(&self.data[..4]),
                declared_length: PCAP_GLOBAL_HEADER_LEN as u64,
                body: &self.data[4..PCAP_GLOBAL_HEADER_LEN],
                kind: BlockKind::SectionHeader(self.section),
            }));
        }

        let offset = self.cursor;
        let remaining = self.data.len() - offset;
        if remaining == 0 {
            self.done = true;
            return None;
        }
        if remaining < PCAP_RECORD_HEADER_LEN {
            return self.fail(offset, FormatErrorKind::TrailingBytes { remaining });
        }

        let header = &self.data[offset..offset + PCAP_RECORD_HEADER_LEN];
        let ts_sec = self.endian.u32(&header[0..4]);
        let ts_frac = self.endian.u32(&header[4..8]);
        let incl_len = self.endian.u32(&header[8..12]);
        let orig_len = self.endian.u32(&header[12..16]);

        let declared = PCAP_RECORD_HEADER_LEN as u64 + u64::from(incl_len);
        if declared > remaining as u64 {
            return self.fail(
                offset,
                FormatErrorKind::BlockOverrun {
                    declared,
                    remaining: remaining as u64,
                },
            );
        }

        let data_start = offset + PCAP_RECORD_HEADER_LEN;
        let data_end = data_start + incl_len as usize;
        self.cursor = data_end;

        let frac_nanos = if self.nanosecond {
            u64::from(ts_frac)
        } else {
            u64::from(ts_frac) * 1_000
        };
        let packet = PacketView {
            index: self.packet_index,
            data_offset: data_start as u64,
            captured_length: incl_len,
            original_length: orig_len,
            timestamp_ns: u64::from(ts_sec) * 1_000_000_000 + frac_nanos,
            interface_id: 0,
            bytes: &self.data[data_start..data_end],
        };
        self.packet_index += 1;

        Some(Ok(ContainerBlock {
            offset: offset as u64,
            block_type: CLASSIC_RECORD_TYPE,
            declared_length: declared,
            body: packet.bytes,
            kind: BlockKind::ClassicRecord(packet),
        }))
    }
}

impl std::iter::FusedIterator for ClassicReader<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_header() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&65535u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out
    }

    fn record(out: &mut Vec<u8>, ts_sec: u32, ts_usec: u32, data: &[u8]) {
        out.extend_from_slice(&ts_sec.to_le_bytes());
        out.extend_from_slice(&ts_usec.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
    }

    #[test]
    fn test_header_then_records() {
        let mut file = global_header();
        record(&mut file, 10, 5, b"abcdef");
        record(&mut file, 11, 0, b"");
        record(&mut file, 12, 0, b"xyz");

        let mut reader = ClassicReader::new(&file, Endian::Little, false).unwrap();
        let header = reader.next().unwrap().unwrap();
        match header.kind {
            BlockKind::SectionHeader(info) => {
                assert_eq!(info.major_version, 2);
                assert_eq!(info.minor_version, 4);
                assert_eq!(info.interface.unwrap().link_type, 1);
                assert_eq!(info.interface.unwrap().snap_len, 65535);
            }
            other => panic!("expected section header, got {other:?}"),
        }

        let first = reader.next().unwrap().unwrap();
        let packet = first.packet().unwrap();
        assert_eq!(packet.bytes, b"abcdef");
        assert_eq!(packet.data_offset, 40);
        assert_eq!(packet.timestamp_ns, 10_000_005_000);
        assert_eq!(first.declared_length, 22);

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.packet().unwrap().captured_length, 0);
        let third = reader.next().unwrap().unwrap();
        assert_eq!(third.packet().unwrap().index, 2);

        assert!(reader.next().is_none());
        assert_eq!(reader.position(), file.len() as u64);
    }

    #[test]
    fn test_truncated_global_header() {
        let file = global_header();
        assert!(ClassicReader::new(&file[..20], Endian::Little, false).is_err());
    }

    #[test]
    fn test_record_overrun_halts() {
        let mut file = global_header();
        record(&mut file, 1, 0, b"abcd");
        file.truncate(file.len() - 2);

        let mut reader = ClassicReader::new(&file, Endian::Little, false).unwrap();
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Format {
                offset: 24,
                kind: FormatErrorKind::BlockOverrun {
                    declared: 20,
                    remaining: 18
                }
            }
        ));
        assert!(!err.is_recoverable());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_trailing_bytes() {
        let mut file = global_header();
        file.extend_from_slice(&[0u8; 5]);
        let mut reader = ClassicReader::new(&file, Endian::Little, false).unwrap();
        reader.next();
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Format {
                kind: FormatErrorKind::TrailingBytes { remaining: 5 },
                ..
            }
        ));
    }

    #[test]
    fn test_big_endian_nanosecond() {
        let mut file = Vec::new();
        file.extend_from_slice(&0xa1b2_3c4du32.to_be_bytes());
        file.extend_from_slice(&2u16.to_be_bytes());
        file.extend_from_slice(&4u16.to_be_bytes());
        file.extend_from_slice(&[0u8; 8]);
        file.extend_from_slice(&65535u32.to_be_bytes());
        file.extend_from_slice(&1u32.to_be_bytes());
        file.extend_from_slice(&3u32.to_be_bytes());
        file.extend_from_slice(&7u32.to_be_bytes());
        file.extend_from_slice(&2u32.to_be_bytes());
        file.extend_from_slice(&2u32.to_be_bytes());
        file.extend_from_slice(b"hi");

        let reader = ClassicReader::new(&file, Endian::Big, true).unwrap();
        let packets: Vec<_> = reader
            .filter_map(|b| b.ok().and_then(|b| b.packet().copied()))
            .collect();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].timestamp_ns, 3_000_000_007);
        assert_eq!(packets[0].bytes, b"hi");
    }
}
