// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Capture format detection using magic numbers.
//!
//! The first four bytes of a capture, read as a little-endian u32, identify
//! the container:
//!
//! | Magic (LE read) | Format                          |
//! |-----------------|---------------------------------|
//! | `0xa1b2c3d4`    | pcap, little-endian, µs stamps  |
//! | `0xa1b23c4d`    | pcap, little-endian, ns stamps  |
//! | `0xd4c3b2a1`    | pcap, big-endian, µs stamps     |
//! | `0x4d3cb2a1`    | pcap, big-endian, ns stamps     |
//! | `0x0a0d0d0a`    | pcapng                          |
//!
//! File extensions are never consulted.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{CaptureError, FormatErrorKind};

use super::metadata::{CaptureFormat, Endian};

/// Classic pcap magic, microsecond timestamps.
pub const PCAP_MAGIC_MICROS: u32 = 0xa1b2_c3d4;
/// Classic pcap magic, nanosecond timestamps.
pub const PCAP_MAGIC_NANOS: u32 = 0xa1b2_3c4d;
/// pcapng Section Header Block type.
pub const PCAPNG_MAGIC: u32 = 0x0a0d_0d0a;

/// Identify the capture format from the leading bytes of a capture.
///
/// # Errors
///
/// `TruncatedHeader` if fewer than 4 bytes are given, `BadMagic` if the
/// magic matches no known format.
pub fn detect_from_bytes(data: &[u8]) -> Result<CaptureFormat, CaptureError> {
    if data.len() < 4 {
        return Err(CaptureError::format(
            0,
            FormatErrorKind::TruncatedHeader {
                required: 4,
                available: data.len(),
            },
        ));
    }

    let magic = LittleEndian::read_u32(&data[..4]);
    match magic {
        PCAPNG_MAGIC => Ok(CaptureFormat::PcapNg),
        PCAP_MAGIC_MICROS => Ok(CaptureFormat::Pcap {
            endian: Endian::Little,
            nanosecond: false,
        }),
        PCAP_MAGIC_NANOS => Ok(CaptureFormat::Pcap {
            endian: Endian::Little,
            nanosecond: true,
        }),
        m if m == PCAP_MAGIC_MICROS.swap_bytes() => Ok(CaptureFormat::Pcap {
            endian: Endian::Big,
            nanosecond: false,
        }),
        m if m == PCAP_MAGIC_NANOS.swap_bytes() => Ok(CaptureFormat::Pcap {
            endian: Endian::Big,
            nanosecond: true,
        }),
        _ => Err(CaptureError::format(0, FormatErrorKind::BadMagic { magic })),
    }
}

/// Detect the capture format of a file by reading its first bytes.
///
/// # Example
///
/// ```rust,no_run
/// use mdcap::io::detection::detect_format;
///
/// let format = detect_format("feed.pcapng")?;
/// println!("{}", format.name());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<CaptureFormat, CaptureError> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy();

    let mut file = File::open(path_ref)
        .map_err(|e| CaptureError::io(path_str.as_ref(), format!("failed to open: {e}")))?;

    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..]).map_err(|e| {
            CaptureError::io(path_str.as_ref(), format!("failed to read header: {e}"))
        })?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    detect_from_bytes(&header[..filled])
}

/// Format detector abstraction.
///
/// This trait can be implemented for custom detection logic, e.g. to
/// recognize vendor-specific wrappers around a capture.
pub trait FormatDetector: Send + Sync {
    /// Detect the format of a capture held in memory.
    fn detect(&self, data: &[u8]) -> Result<CaptureFormat, CaptureError>;
}

/// Default magic-number detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatDetector;

impl FormatDetector for DefaultFormatDetector {
    fn detect(&self, data: &[u8]) -> Result<CaptureFormat, CaptureError> {
        detect_from_bytes(data)
    }
}

/// Check if a file is a classic pcap capture.
pub fn is_pcap_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format(path), Ok(CaptureFormat::Pcap { .. }))
}

/// Check if a file is a pcapng capture.
pub fn is_pcapng_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format(path), Ok(CaptureFormat::PcapNg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_temp_file(name: &str, data: &[u8]) -> String {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "mdcap_test_detect_{}_{}.bin",
            std::process::id(),
            name
        ));
        {
            let mut temp_file = File::create(&path).unwrap();
            temp_file.write_all(data).unwrap();
            temp_file.flush().unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_detect_pcap_variants() {
        assert_eq!(
            detect_from_bytes(&[0xd4, 0xc3, 0xb2, 0xa1]).unwrap(),
            CaptureFormat::Pcap {
                endian: Endian::Little,
                nanosecond: false
            }
        );
        assert_eq!(
            detect_from_bytes(&[0x4d, 0x3c, 0xb2, 0xa1]).unwrap(),
            CaptureFormat::Pcap {
                endian: Endian::Little,
                nanosecond: true
            }
        );
        assert_eq!(
            detect_from_bytes(&[0xa1, 0xb2, 0xc3, 0xd4]).unwrap(),
            CaptureFormat::Pcap {
                endian: Endian::Big,
                nanosecond: false
            }
        );
        assert_eq!(
            detect_from_bytes(&[0xa1, 0xb2, 0x3c, 0x4d]).unwrap(),
            CaptureFormat::Pcap {
                endian: Endian::Big,
                nanosecond: true
            }
        );
    }

    #[test]
    fn test_detect_pcapng() {
        assert_eq!(
            detect_from_bytes(&[0x0a, 0x0d, 0x0d, 0x0a, 0x1c]).unwrap(),
            CaptureFormat::PcapNg
        );
    }

    #[test]
    fn test_bad_magic() {
        let err = detect_from_bytes(b"MCAP").unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Format {
                offset: 0,
                kind: FormatErrorKind::BadMagic { .. }
            }
        ));
    }

    #[test]
    fn test_too_short() {
        let err = detect_from_bytes(&[0xd4, 0xc3]).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Format {
                kind: FormatErrorKind::TruncatedHeader {
                    required: 4,
                    available: 2
                },
                ..
            }
        ));
    }

    #[test]
    fn test_detect_format_file() {
        let path = create_temp_file("ng", &[0x0a, 0x0d, 0x0d, 0x0a, 0, 0, 0, 0]);
        assert_eq!(detect_format(&path).unwrap(), CaptureFormat::PcapNg);
        assert!(is_pcapng_file(&path));
        assert!(!is_pcap_file(&path));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_detector_trait() {
        let detector = DefaultFormatDetector;
        assert!(detector.detect(&[0xd4, 0xc3, 0xb2, 0xa1]).is_ok());
        assert!(detector.detect(&[0u8; 8]).is_err());
    }
}
