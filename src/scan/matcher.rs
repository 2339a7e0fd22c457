// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tag-byte search strategies.
//!
//! A [`BatchMatcher`] reports every offset in a window whose byte equals a
//! tag, or any tag of a [`TagSet`]. [`ScalarMatcher`] is the reference: every
//! other implementation must produce exactly the same offsets in the same
//! (ascending) order, including for the partial window at the end of the
//! input, which each accelerated implementation finishes with scalar
//! comparison.
//!
//! [`Matcher`] is the enum-dispatched handle the scanner holds. It is `Copy`,
//! so each worker thread can own one without sharing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::MessageType;

use super::capability::Capabilities;
#[cfg(target_arch = "x86_64")]
use super::simd::{Avx2Matcher, Sse2Matcher};

/// A set of tag bytes with constant-time membership.
#[derive(Clone)]
pub struct TagSet {
    member: [bool; 256],
    tags: Vec<u8>,
    splats: Vec<u64>,
}

impl TagSet {
    /// Build a set from tag bytes. Duplicates are ignored.
    pub fn new(tags: impl IntoIterator<Item = u8>) -> Self {
        let mut member = [false; 256];
        let mut list = Vec::new();
        for tag in tags {
            if !member[tag as usize] {
                member[tag as usize] = true;
                list.push(tag);
            }
        }
        let splats = list.iter().map(|&t| LO.wrapping_mul(u64::from(t))).collect();
        Self {
            member,
            tags: list,
            splats,
        }
    }

    /// The set of all decodable message tags.
    pub fn known() -> Self {
        Self::new(MessageType::ALL.iter().map(|t| t.tag()))
    }

    /// Whether `byte` is in the set.
    #[inline(always)]
    pub fn contains(&self, byte: u8) -> bool {
        self.member[byte as usize]
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> &[u8] {
        &self.tags
    }

    /// Each tag repeated across the 8 lanes of a word.
    pub fn splats(&self) -> &[u64] {
        &self.splats
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tags.iter().map(|t| format!("{t:#04x}")))
            .finish()
    }
}

/// Finds tag-byte occurrences in a window.
///
/// Implementations append offsets to `out` in ascending order and never
/// clear it.
pub trait BatchMatcher {
    /// Append every offset `i` with `window[i] == tag`.
    fn find_tag_positions(&self, window: &[u8], tag: u8, out: &mut Vec<usize>);

    /// Append every offset `i` with `tags.contains(window[i])`.
    fn find_tagset_positions(&self, window: &[u8], tags: &TagSet, out: &mut Vec<usize>);

    /// Short implementation name.
    fn name(&self) -> &'static str;

    /// Bytes compared per step.
    fn width(&self) -> usize;
}

/// Byte-at-a-time reference implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarMatcher;

impl ScalarMatcher {
    /// Scalar tag search starting at `base`, used for tails by other matchers.
    #[inline]
    pub(crate) fn tag_tail(window: &[u8], base: usize, tag: u8, out: &mut Vec<usize>) {
        for (i, &b) in window.iter().enumerate().skip(base) {
            if b == tag {
                out.push(i);
            }
        }
    }

    /// Scalar set search starting at `base`.
    #[inline]
    pub(crate) fn tagset_tail(window: &[u8], base: usize, tags: &TagSet, out: &mut Vec<usize>) {
        for (i, &b) in window.iter().enumerate().skip(base) {
            if tags.contains(b) {
                out.push(i);
            }
        }
    }
}

impl BatchMatcher for ScalarMatcher {
    fn find_tag_positions(&self, window: &[u8], tag: u8, out: &mut Vec<usize>) {
        Self::tag_tail(window, 0, tag, out);
    }

    fn find_tagset_positions(&self, window: &[u8], tags: &TagSet, out: &mut Vec<usize>) {
        Self::tagset_tail(window, 0, tags, out);
    }

    fn name(&self) -> &'static str {
        "scalar"
    }

    fn width(&self) -> usize {
        1
    }
}

const LO: u64 = 0x0101_0101_0101_0101;
const HI7: u64 = 0x7F7F_7F7F_7F7F_7F7F;

/// Exact per-byte zero test: the high bit of each byte of the result is set
/// iff that byte of `x` is zero. No carries cross byte lanes.
#[inline(always)]
fn zero_byte_mask(x: u64) -> u64 {
    !(((x & HI7).wrapping_add(HI7)) | x | HI7)
}

/// Portable word-parallel implementation over 8-byte words.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwarMatcher;

impl SwarMatcher {
    #[inline(always)]
    fn push_mask(mut mask: u64, base: usize, out: &mut Vec<usize>) {
        while mask != 0 {
            // Little-endian load: lane k is bits 8k..8k+8.
            out.push(base + (mask.trailing_zeros() / 8) as usize);
            mask &= mask - 1;
        }
    }
}

impl BatchMatcher for SwarMatcher {
    fn find_tag_positions(&self, window: &[u8], tag: u8, out: &mut Vec<usize>) {
        let needle = LO.wrapping_mul(u64::from(tag));
        let chunks = window.chunks_exact(8);
        let tail = chunks.len() * 8;
        for (n, chunk) in chunks.enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            let mask = zero_byte_mask(u64::from_le_bytes(word) ^ needle);
            Self::push_mask(mask, n * 8, out);
        }
        ScalarMatcher::tag_tail(window, tail, tag, out);
    }

    fn find_tagset_positions(&self, window: &[u8], tags: &TagSet, out: &mut Vec<usize>) {
        let needles = tags.splats();
        let chunks = window.chunks_exact(8);
        let tail = chunks.len() * 8;
        for (n, chunk) in chunks.enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            let x = u64::from_le_bytes(word);
            let mask = needles
                .iter()
                .fold(0u64, |acc, &needle| acc | zero_byte_mask(x ^ needle));
            Self::push_mask(mask, n * 8, out);
        }
        ScalarMatcher::tagset_tail(window, tail, tags, out);
    }

    fn name(&self) -> &'static str {
        "swar"
    }

    fn width(&self) -> usize {
        8
    }
}

/// Requested matcher implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// Reference byte loop
    Scalar,
    /// 8-byte word-parallel
    Swar,
    /// 16-byte SSE2
    Sse2,
    /// 32-byte AVX2
    Avx2,
    /// Widest supported
    #[default]
    Auto,
}

impl MatcherKind {
    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            MatcherKind::Scalar => "scalar",
            MatcherKind::Swar => "swar",
            MatcherKind::Sse2 => "sse2",
            MatcherKind::Avx2 => "avx2",
            MatcherKind::Auto => "auto",
        }
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MatcherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scalar" => Ok(MatcherKind::Scalar),
            "swar" => Ok(MatcherKind::Swar),
            "sse2" => Ok(MatcherKind::Sse2),
            "avx2" => Ok(MatcherKind::Avx2),
            "auto" => Ok(MatcherKind::Auto),
            other => Err(format!(
                "unknown matcher '{other}' (expected scalar, swar, sse2, avx2 or auto)"
            )),
        }
    }
}

/// Enum-dispatched matcher selected at startup.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Reference
    Scalar(ScalarMatcher),
    /// Word-parallel
    Swar(SwarMatcher),
    /// SSE2
    #[cfg(target_arch = "x86_64")]
    Sse2(Sse2Matcher),
    /// AVX2
    #[cfg(target_arch = "x86_64")]
    Avx2(Avx2Matcher),
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::Scalar(ScalarMatcher)
    }
}

impl Matcher {
    /// Pick the implementation for `kind`.
    ///
    /// An unsupported request degrades to the widest supported
    /// implementation that is not wider than requested, ending at scalar.
    pub fn select(kind: MatcherKind, caps: &Capabilities) -> Self {
        let wanted = if kind == MatcherKind::Auto {
            MatcherKind::Avx2
        } else {
            kind
        };

        #[cfg(target_arch = "x86_64")]
        {
            if wanted >= MatcherKind::Avx2 && caps.avx2 {
                if let Some(m) = Avx2Matcher::new() {
                    return Matcher::Avx2(m);
                }
            }
            if wanted >= MatcherKind::Sse2 && caps.sse2 {
                if let Some(m) = Sse2Matcher::new() {
                    return Matcher::Sse2(m);
                }
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        let _ = caps;

        if wanted >= MatcherKind::Swar {
            Matcher::Swar(SwarMatcher)
        } else {
            Matcher::Scalar(ScalarMatcher)
        }
    }

    /// The implementation actually selected.
    pub fn kind(&self) -> MatcherKind {
        match self {
            Matcher::Scalar(_) => MatcherKind::Scalar,
            Matcher::Swar(_) => MatcherKind::Swar,
            #[cfg(target_arch = "x86_64")]
            Matcher::Sse2(_) => MatcherKind::Sse2,
            #[cfg(target_arch = "x86_64")]
            Matcher::Avx2(_) => MatcherKind::Avx2,
        }
    }

    fn inner(&self) -> &dyn BatchMatcher {
        match self {
            Matcher::Scalar(m) => m,
            Matcher::Swar(m) => m,
            #[cfg(target_arch = "x86_64")]
            Matcher::Sse2(m) => m,
            #[cfg(target_arch = "x86_64")]
            Matcher::Avx2(m) => m,
        }
    }
}

impl BatchMatcher for Matcher {
    #[inline]
    fn find_tag_positions(&self, window: &[u8], tag: u8, out: &mut Vec<usize>) {
        self.inner().find_tag_positions(window, tag, out)
    }

    #[inline]
    fn find_tagset_positions(&self, window: &[u8], tags: &TagSet, out: &mut Vec<usize>) {
        self.inner().find_tagset_positions(window, tags, out)
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn width(&self) -> usize {
        self.inner().width()
    }
}
