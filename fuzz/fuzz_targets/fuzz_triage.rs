// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use git_ac::services::{prompt, triage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|diff: &str| {
    let _ = triage::is_oversized(diff, 4096);
    let prompt = prompt::build_summarize_prompt(diff);
    assert!(prompt.contains(diff));
});
