// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fixed-point prices and scale resolution.
//!
//! Prices travel as unsigned little-endian u32 values with an implied number
//! of decimal places. The scale is not always knowable from the bytes alone,
//! so [`PricePolicy`] evaluates an ordered list of candidate scales against a
//! plausibility predicate and reports, rather than hides, the case where
//! more than one scale fits.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::DecodeError;

/// Number of implied decimal places of a raw price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceScale {
    /// Divide by 10,000
    #[default]
    FourDecimal,
    /// Divide by 100
    TwoDecimal,
}

impl PriceScale {
    /// Decimal places implied by this scale.
    pub fn decimals(self) -> u32 {
        match self {
            PriceScale::FourDecimal => 4,
            PriceScale::TwoDecimal => 2,
        }
    }

    /// Divisor from raw units to whole currency units.
    pub fn divisor(self) -> u64 {
        10u64.pow(self.decimals())
    }
}

/// A fixed-point price with an explicit scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Price {
    /// Raw wire value
    pub raw: u32,
    /// Implied decimal places
    pub scale: PriceScale,
}

impl Price {
    /// Create a price from a raw value and a scale.
    pub fn new(raw: u32, scale: PriceScale) -> Self {
        Self { raw, scale }
    }

    /// Exact decimal value.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(i64::from(self.raw), self.scale.decimals())
    }

    /// Approximate floating point value, for display and quick comparisons.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.raw) / self.scale.divisor() as f64
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.to_decimal().cmp(&other.to_decimal()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divisor = self.scale.divisor();
        let raw = u64::from(self.raw);
        write!(
            f,
            "{}.{:0width$}",
            raw / divisor,
            raw % divisor,
            width = self.scale.decimals() as usize
        )
    }
}

/// Ordered price interpretation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePolicy {
    /// Primary scale, tried first
    pub scale: PriceScale,
    /// Optional alternate scale
    pub fallback_scale: Option<PriceScale>,
    /// Exclusive upper bound in whole currency units
    pub max_price: u64,
}

impl Default for PricePolicy {
    fn default() -> Self {
        Self {
            scale: PriceScale::FourDecimal,
            fallback_scale: None,
            max_price: 100_000,
        }
    }
}

impl PricePolicy {
    /// Add an alternate scale.
    pub fn with_fallback(mut self, scale: PriceScale) -> Self {
        self.fallback_scale = Some(scale);
        self
    }

    /// Set the exclusive price ceiling.
    pub fn with_max_price(mut self, max_price: u64) -> Self {
        self.max_price = max_price;
        self
    }

    /// Whether `raw` is a plausible price at `scale`.
    pub fn is_plausible(&self, raw: u32, scale: PriceScale) -> bool {
        raw > 0 && u64::from(raw) < self.max_price.saturating_mul(scale.divisor())
    }

    /// Resolve a raw price against the ordered candidate scales.
    ///
    /// # Errors
    ///
    /// `Implausible` when no scale fits, `Ambiguous` when more than one does.
    pub fn resolve(&self, field: &'static str, raw: u32) -> Result<Price, DecodeError> {
        let mut accepted = None;
        let mut plausible = 0usize;
        let fallback = self.fallback_scale.filter(|&scale| scale != self.scale);
        for scale in std::iter::once(self.scale).chain(fallback) {
            if self.is_plausible(raw, scale) {
                plausible += 1;
                if accepted.is_none() {
                    accepted = Some(scale);
                }
            }
        }
        match (plausible, accepted) {
            (1, Some(scale)) => Ok(Price::new(raw, scale)),
            (0, _) => Err(DecodeError::implausible(field, raw)),
            _ => Err(DecodeError::ambiguous(field, raw)),
        }
    }

    /// Interpret `raw` at the primary scale without validation.
    pub fn primary(&self, raw: u32) -> Price {
        Price::new(raw, self.scale)
    }
}
