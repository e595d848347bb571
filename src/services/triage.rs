// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

//! Decides whether a staged diff fits in one generation call.
//!
//! A diff is oversized when its word count exceeds half of the model's
//! context window, converted from tokens to words at 1.3 tokens per word.
//! The other half stays free for the prompt scaffolding and the response.

/// Empirical tokens-per-word ratio for source code and prose
const TOKENS_PER_WORD: f64 = 1.3;

/// Largest word count that is still sent to the model directly.
///
/// `word_threshold(4096) == 1575`
pub fn word_threshold(context_window: u32) -> usize {
    ((f64::from(context_window) / 2.0) / TOKENS_PER_WORD) as usize
}

/// Whitespace-separated word count
pub fn word_count(diff: &str) -> usize {
    diff.split_whitespace().count()
}

/// `true` when the diff must be summarized before composing a message
pub fn is_oversized(diff: &str, context_window: u32) -> bool {
    word_count(diff) > word_threshold(context_window)
}
