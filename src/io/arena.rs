// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Read-only capture sources.
//!
//! A [`CaptureSource`] owns the bytes of one capture file for the duration of
//! processing. Every block, packet and payload view handed out by the readers
//! borrows from it, so nothing is copied after the file is opened.
//!
//! # Ownership Model
//!
//! ```text
//! CaptureSource (owns mmap)
//!   ↓
//! BlockReader (borrows the bytes for 'src)
//!   ↓
//! ContainerBlock / PacketView / TransportPayload (slices into 'src)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mdcap::io::arena::CaptureSource;
//!
//! let source = CaptureSource::open("feed.pcap")?;
//! let data: &[u8] = source.data();
//! println!("{} bytes", data.len());
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use crate::core::CaptureError;

enum Backing {
    Mapped(memmap2::Mmap),
    Owned(Vec<u8>),
}

/// Read-only capture bytes plus their origin.
///
/// The mapping is never mutated, so a `&CaptureSource` can be shared with
/// worker threads freely.
pub struct CaptureSource {
    backing: Backing,
    /// File path for diagnostics
    path: String,
}

impl CaptureSource {
    /// Open and map a capture file.
    ///
    /// The mapping is advised for sequential access where the platform
    /// supports it. A zero-length file is not mapped.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Io`] if the file cannot be opened, stat'ed or
    /// mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref)
            .map_err(|e| CaptureError::io(&path_str, format!("failed to open: {e}")))?;
        let len = file
            .metadata()
            .map_err(|e| CaptureError::io(&path_str, format!("failed to stat: {e}")))?
            .len();

        if len == 0 {
            return Ok(Self {
                backing: Backing::Owned(Vec::new()),
                path: path_str,
            });
        }

        // SAFETY: the mapping is read-only and owned by the returned value;
        // all slices handed out borrow from it.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| CaptureError::io(&path_str, format!("failed to mmap: {e}")))?;

        advise_sequential(&mmap, &path_str);

        Ok(Self {
            backing: Backing::Mapped(mmap),
            path: path_str,
        })
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            backing: Backing::Owned(data),
            path: "<memory>".to_string(),
        }
    }

    /// Get the file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the capture bytes.
    pub fn data(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(data) => data,
        }
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Check if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Whether the bytes come from a memory mapping.
    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    /// Bounds-checked sub-slice. Returns `None` when the range does not fit.
    pub fn slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.data().get(offset..end)
    }
}

#[cfg(unix)]
fn advise_sequential(mmap: &memmap2::Mmap, path: &str) {
    if let Err(e) = mmap.advise(memmap2::Advice::Sequential) {
        tracing::debug!(path, error = %e, "sequential advisory not applied");
    }
}

#[cfg(not(unix))]
fn advise_sequential(_mmap: &memmap2::Mmap, _path: &str) {}

impl Deref for CaptureSource {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data()
    }
}

impl AsRef<[u8]> for CaptureSource {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}

impl std::fmt::Debug for CaptureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSource")
            .field("path", &self.path)
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
