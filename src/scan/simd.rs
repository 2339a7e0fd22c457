// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! x86_64 vector matchers.
//!
//! Both matchers are constructed only after runtime feature detection, so
//! the `unsafe` calls into `#[target_feature]` functions are sound. Loads
//! are unaligned and never start past `len - width`; the remainder goes
//! through the scalar path.

use std::arch::x86_64::*;

use super::matcher::{BatchMatcher, ScalarMatcher, TagSet};

#[inline(always)]
fn push_bits(mut mask: u32, base: usize, out: &mut Vec<usize>) {
    while mask != 0 {
        out.push(base + mask.trailing_zeros() as usize);
        mask &= mask - 1;
    }
}

/// 16-byte SSE2 matcher.
#[derive(Debug, Clone, Copy)]
pub struct Sse2Matcher {
    _detected: (),
}

impl Sse2Matcher {
    /// Returns `None` when the CPU lacks SSE2.
    pub fn new() -> Option<Self> {
        is_x86_feature_detected!("sse2").then_some(Self { _detected: () })
    }
}

#[target_feature(enable = "sse2")]
unsafe fn sse2_tag(window: &[u8], tag: u8, out: &mut Vec<usize>) -> usize {
    let needle = _mm_set1_epi8(tag as i8);
    let mut offset = 0;
    while offset + 16 <= window.len() {
        let chunk = _mm_loadu_si128(window.as_ptr().add(offset) as *const __m128i);
        let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(chunk, needle)) as u32;
        push_bits(mask, offset, out);
        offset += 16;
    }
    offset
}

#[target_feature(enable = "sse2")]
unsafe fn sse2_tagset(window: &[u8], tags: &[u8], out: &mut Vec<usize>) -> usize {
    let mut offset = 0;
    while offset + 16 <= window.len() {
        let chunk = _mm_loadu_si128(window.as_ptr().add(offset) as *const __m128i);
        let mut hits = _mm_setzero_si128();
        for &tag in tags {
            hits = _mm_or_si128(hits, _mm_cmpeq_epi8(chunk, _mm_set1_epi8(tag as i8)));
        }
        push_bits(_mm_movemask_epi8(hits) as u32, offset, out);
        offset += 16;
    }
    offset
}

impl BatchMatcher for Sse2Matcher {
    fn find_tag_positions(&self, window: &[u8], tag: u8, out: &mut Vec<usize>) {
        // SAFETY: construction verified SSE2 support.
        let tail = unsafe { sse2_tag(window, tag, out) };
        ScalarMatcher::tag_tail(window, tail, tag, out);
    }

    fn find_tagset_positions(&self, window: &[u8], tags: &TagSet, out: &mut Vec<usize>) {
        // SAFETY: construction verified SSE2 support.
        let tail = unsafe { sse2_tagset(window, tags.tags(), out) };
        ScalarMatcher::tagset_tail(window, tail, tags, out);
    }

    fn name(&self) -> &'static str {
        "sse2"
    }

    fn width(&self) -> usize {
        16
    }
}

/// 32-byte AVX2 matcher.
#[derive(Debug, Clone, Copy)]
pub struct Avx2Matcher {
    _detected: (),
}

impl Avx2Matcher {
    /// Returns `None` when the CPU lacks AVX2.
    pub fn new() -> Option<Self> {
        is_x86_feature_detected!("avx2").then_some(Self { _detected: () })
    }
}

#[target_feature(enable = "avx2")]
unsafe fn avx2_tag(window: &[u8], tag: u8, out: &mut Vec<usize>) -> usize {
    let needle = _mm256_set1_epi8(tag as i8);
    let mut offset = 0;
    while offset + 32 <= window.len() {
        let chunk = _mm256_loadu_si256(window.as_ptr().add(offset) as *const __m256i);
        let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(chunk, needle)) as u32;
        push_bits(mask, offset, out);
        offset += 32;
    }
    offset
}

#[target_feature(enable = "avx2")]
unsafe fn avx2_tagset(window: &[u8], tags: &[u8], out: &mut Vec<usize>) -> usize {
    let mut offset = 0;
    while offset + 32 <= window.len() {
        let chunk = _mm256_loadu_si256(window.as_ptr().add(offset) as *const __m256i);
        let mut hits = _mm256_setzero_si256();
        for &tag in tags {
            hits = _mm256_or_si256(hits, _mm256_cmpeq_epi8(chunk, _mm256_set1_epi8(tag as i8)));
        }
        push_bits(_mm256_movemask_epi8(hits) as u32, offset, out);
        offset += 32;
    }
    offset
}

impl BatchMatcher for Avx2Matcher {
    fn find_tag_positions(&self, window: &[u8], tag: u8, out: &mut Vec<usize>) {
        // SAFETY: construction verified AVX2 support.
        let tail = unsafe { avx2_tag(window, tag, out) };
        ScalarMatcher::tag_tail(window, tail, tag, out);
    }

    fn find_tagset_positions(&self, window: &[u8], tags: &TagSet, out: &mut Vec<usize>) {
        // SAFETY: construction verified AVX2 support.
        let tail = unsafe { avx2_tagset(window, tags.tags(), out) };
        ScalarMatcher::tagset_tail(window, tail, tags, out);
    }

    fn name(&self) -> &'static str {
        "avx2"
    }

    fn width(&self) -> usize {
        32
    }
}
