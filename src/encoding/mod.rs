// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message decoding.
//!
//! - [`cursor`]: bounds-checked fixed-offset field reads
//! - [`schema`]: the per-type field layout table
//! - [`decoder`]: the schema-driven decoder

pub mod cursor;
pub mod decoder;
pub mod schema;

pub use cursor::FieldReader;
pub use decoder::{DecodeMode, Decoded, MessageDecoder};
pub use schema::{schema_for, schema_for_tag, FieldKind, FieldSpec, MessageSchema};
