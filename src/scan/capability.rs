// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CPU capability detection and scan tuning.
//!
//! Detection never fails. On a target without vector support every flag is
//! false and the scalar path is selected.

use std::fmt;

use serde::Serialize;

/// Cache line size assumed for alignment.
pub const DEFAULT_CACHE_LINE: usize = 64;
/// L1 data cache size assumed for batch sizing.
pub const DEFAULT_L1_DATA_CACHE: usize = 32 * 1024;

/// Vector instruction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SimdLevel {
    /// No vector support
    Scalar,
    /// ARM NEON
    Neon,
    /// x86 SSE2
    Sse2,
    /// x86 AVX2
    Avx2,
    /// x86 AVX-512BW
    Avx512,
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimdLevel::Scalar => write!(f, "Scalar"),
            SimdLevel::Neon => write!(f, "NEON"),
            SimdLevel::Sse2 => write!(f, "SSE2"),
            SimdLevel::Avx2 => write!(f, "AVX2"),
            SimdLevel::Avx512 => write!(f, "AVX-512"),
        }
    }
}

/// Detected hardware features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub sse2: bool,
    pub avx2: bool,
    pub avx512bw: bool,
    pub neon: bool,
    pub cache_line_size: usize,
    pub l1_data_cache: usize,
}

impl Capabilities {
    /// Detect features of the running CPU.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        let (sse2, avx2, avx512bw) = (
            is_x86_feature_detected!("sse2"),
            is_x86_feature_detected!("avx2"),
            is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw"),
        );
        #[cfg(not(target_arch = "x86_64"))]
        let (sse2, avx2, avx512bw) = (false, false, false);

        Self {
            sse2,
            avx2,
            avx512bw,
            // NEON is mandatory on aarch64.
            neon: cfg!(target_arch = "aarch64"),
            cache_line_size: DEFAULT_CACHE_LINE,
            l1_data_cache: DEFAULT_L1_DATA_CACHE,
        }
    }

    /// Capabilities with every vector feature disabled.
    pub fn scalar_only() -> Self {
        Self {
            sse2: false,
            avx2: false,
            avx512bw: false,
            neon: false,
            cache_line_size: DEFAULT_CACHE_LINE,
            l1_data_cache: DEFAULT_L1_DATA_CACHE,
        }
    }

    /// Widest available level.
    pub fn best_level(&self) -> SimdLevel {
        if self.avx512bw {
            SimdLevel::Avx512
        } else if self.avx2 {
            SimdLevel::Avx2
        } else if self.sse2 {
            SimdLevel::Sse2
        } else if self.neon {
            SimdLevel::Neon
        } else {
            SimdLevel::Scalar
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// Derived scan parameters, recorded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TuningParams {
    /// Bytes per scan batch
    pub batch_size: usize,
    /// Read-ahead distance in bytes
    pub prefetch_distance: usize,
    /// Alignment of parallel chunk boundaries
    pub chunk_alignment: usize,
    /// Bytes compared per matcher step
    pub vector_width: usize,
}

impl TuningParams {
    /// Derive parameters from capabilities and the selected matcher width.
    pub fn for_capabilities(caps: &Capabilities, vector_width: usize) -> Self {
        let prefetch_distance = match caps.best_level() {
            SimdLevel::Avx512 => 1024,
            SimdLevel::Avx2 | SimdLevel::Neon => 512,
            _ => 256,
        };
        let params = Self {
            batch_size: caps.l1_data_cache / 4,
            prefetch_distance,
            chunk_alignment: caps.cache_line_size,
            vector_width,
        };
        tracing::debug!(
            level = %caps.best_level(),
            batch_size = params.batch_size,
            prefetch_distance = params.prefetch_distance,
            vector_width = params.vector_width,
            "Selected scan tuning"
        );
        params
    }
}
