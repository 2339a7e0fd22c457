// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod caps;
mod info;
mod scan;

pub use caps::CapsCmd;
pub use info::InfoCmd;
pub use scan::ScanCmd;
