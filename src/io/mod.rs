// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for capture files.
//!
//! This module maps capture files, identifies their container format, walks
//! their block structure and exposes packet payloads as borrowed slices.

pub mod arena;
pub mod detection;
pub mod formats;
pub mod metadata;
pub mod payload;

// Re-exports
pub use arena::CaptureSource;
pub use detection::{detect_format, detect_from_bytes, is_pcap_file, is_pcapng_file, FormatDetector};
pub use formats::{BlockKind, BlockReader, ContainerBlock, SectionInfo};
pub use metadata::{CaptureFormat, Endian, InterfaceInfo, PacketView, TimestampResolution};
pub use payload::{PayloadLocator, TransportPayload, DEFAULT_HEADER_LEN};
