// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Candidate search.
//!
//! - [`matcher`]: tag-byte search strategies with a scalar reference
//! - [`simd`]: SSE2 and AVX2 matchers (x86_64 only)
//! - [`capability`]: CPU feature detection and tuning parameters
//! - [`scanner`]: the resynchronization heuristic built on a matcher

pub mod capability;
pub mod matcher;
pub mod scanner;
#[cfg(target_arch = "x86_64")]
pub mod simd;

pub use capability::{Capabilities, SimdLevel, TuningParams};
pub use matcher::{BatchMatcher, Matcher, MatcherKind, ScalarMatcher, SwarMatcher, TagSet};
pub use scanner::{Candidate, Scanner};
