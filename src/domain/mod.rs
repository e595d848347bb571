// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

mod commit;
mod generation;

pub use commit::*;
pub use generation::*;
