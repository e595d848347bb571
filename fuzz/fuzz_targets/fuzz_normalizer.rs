// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use git_ac::config::CommitConfig;
use git_ac::services::normalizer::MessageNormalizer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&len, rest)) = data.split_first() else {
        return;
    };
    let Ok(raw) = std::str::from_utf8(rest) else {
        return;
    };

    let config = CommitConfig {
        max_length: 20 + usize::from(len % 181),
    };

    if let Ok(message) = MessageNormalizer::normalize(raw, &config) {
        let subject = message.lines().next().unwrap_or_default();
        assert!(subject.chars().count() <= config.max_length);
    }
});
