// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message resynchronization scanner.
//!
//! No per-message length is consumed, so message starts are found by
//! plausibility: an offset is a [`Candidate`] when its byte is a known tag
//! and the byte at the type's check offset (the first symbol byte) is an
//! uppercase ASCII letter. Every offset is considered, one byte at a time;
//! the scanner does not skip past a candidate's layout.
//!
//! A check that would read past the payload end rejects the offset. It is
//! never an error.

use crate::core::MessageType;
use crate::encoding::schema::schema_for;
use crate::pipeline::stats::ScanStatistics;

use super::matcher::{BatchMatcher, Matcher, TagSet};

/// A plausible message start inside one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Offset of the tag byte within the payload
    pub offset: usize,
    /// Type named by the tag
    pub message_type: MessageType,
}

impl Candidate {
    /// Tag byte.
    pub fn tag(&self) -> u8 {
        self.message_type.tag()
    }
}

/// Reusable scanner. One per thread.
#[derive(Debug, Clone)]
pub struct Scanner {
    matcher: Matcher,
    tags: TagSet,
    per_type_cap: Option<usize>,
    positions: Vec<usize>,
    accepted: [usize; 256],
}

impl Scanner {
    /// Create a scanner. `per_type_cap` limits how many candidates of each
    /// type one [`scan`](Self::scan) call emits.
    pub fn new(matcher: Matcher, per_type_cap: Option<usize>) -> Self {
        Self {
            matcher,
            tags: TagSet::known(),
            per_type_cap,
            positions: Vec::new(),
            accepted: [0; 256],
        }
    }

    /// Matcher in use.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Append the candidates of `payload` to `out` in ascending offset order.
    ///
    /// Every heuristic match is counted in `stats.type_counts`, including
    /// those suppressed by the cap, which are also counted in
    /// `stats.capped`. Returns the number of candidates appended.
    pub fn scan(
        &mut self,
        payload: &[u8],
        stats: &mut ScanStatistics,
        out: &mut Vec<Candidate>,
    ) -> usize {
        let before = out.len();
        stats.payload_bytes += payload.len() as u64;

        self.positions.clear();
        self.matcher
            .find_tagset_positions(payload, &self.tags, &mut self.positions);
        stats.tag_hits += self.positions.len() as u64;

        for &tag in self.tags.tags() {
            self.accepted[tag as usize] = 0;
        }

        for &offset in &self.positions {
            let tag = payload[offset];
            let Some(message_type) = MessageType::from_tag(tag) else {
                continue;
            };
            let check = offset.checked_add(schema_for(message_type).check_offset);
            match check.and_then(|c| payload.get(c)) {
                Some(b) if b.is_ascii_uppercase() => {}
                _ => continue,
            }

            stats.type_counts[tag as usize] += 1;
            let accepted = &mut self.accepted[tag as usize];
            if self.per_type_cap.is_some_and(|cap| *accepted >= cap) {
                stats.capped += 1;
                continue;
            }
            *accepted += 1;
            out.push(Candidate {
                offset,
                message_type,
            });
        }

        out.len() - before
    }
}
