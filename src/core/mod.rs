// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout mdcap.
//!
//! This module provides the foundational types for the library:
//! - [`CaptureError`] / [`DecodeError`] - Error handling
//! - [`DecodedMessage`] / [`MessageRecord`] - Decoded output
//! - [`Price`] / [`PricePolicy`] - Fixed-point prices and scale resolution
//! - [`Symbol`] - Inline ticker symbols

pub mod error;
pub mod message;
pub mod price;
pub mod symbol;

pub use error::{CaptureError, DecodeError, DecodeErrorKind, FormatErrorKind, Result};
pub use message::{Confidence, DecodedMessage, MessageRecord, MessageType, Side};
pub use price::{Price, PricePolicy, PriceScale};
pub use symbol::Symbol;
