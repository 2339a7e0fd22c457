// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Caps command - show detected CPU features and scan tuning.

use clap::Args;

use crate::common::Result;
use mdcap::scan::TuningParams;
use mdcap::{BatchMatcher, Capabilities, Matcher, MatcherKind};

/// Show capability detection and matcher selection.
#[derive(Args, Clone, Debug)]
pub struct CapsCmd {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

impl CapsCmd {
    pub fn run(self) -> Result<i32> {
        let caps = Capabilities::detect();
        let best = Matcher::select(MatcherKind::Auto, &caps);
        let tuning = TuningParams::for_capabilities(&caps, best.width());

        if self.json {
            let value = serde_json::json!({
                "capabilities": caps,
                "best_level": caps.best_level().to_string(),
                "matcher": best.name(),
                "tuning": tuning,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(0);
        }

        println!("=== Capabilities ===");
        println!("SSE2: {}", caps.sse2);
        println!("AVX2: {}", caps.avx2);
        println!("AVX-512BW: {}", caps.avx512bw);
        println!("NEON: {}", caps.neon);
        println!("Cache line: {} bytes", caps.cache_line_size);
        println!("L1 data cache: {} KiB", caps.l1_data_cache / 1024);
        println!("Best level: {}", caps.best_level());
        println!();

        println!("=== Matchers ===");
        for kind in [
            MatcherKind::Scalar,
            MatcherKind::Swar,
            MatcherKind::Sse2,
            MatcherKind::Avx2,
            MatcherKind::Auto,
        ] {
            let selected = Matcher::select(kind, &caps);
            println!("{:<8} -> {} ({} bytes)", kind, selected.name(), selected.width());
        }
        println!();

        println!("=== Tuning ===");
        println!("Batch size: {} bytes", tuning.batch_size);
        println!("Prefetch distance: {} bytes", tuning.prefetch_distance);
        println!("Chunk alignment: {} bytes", tuning.chunk_alignment);
        println!("Vector width: {} bytes", tuning.vector_width);
        Ok(0)
    }
}
