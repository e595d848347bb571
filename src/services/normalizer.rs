// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

//! Turns raw model output into a commit message.
//!
//! Steps, in order:
//! 1. trim surrounding whitespace
//! 2. drop `<think>...</think>` reasoning; unmatched markers are removed,
//!    never the text around them
//! 3. trim again
//! 4. split an over-long subject at a word boundary, carrying the rest onto
//!    the next line behind an ellipsis
//!
//! Lengths are counted in characters, not bytes.

use tracing::debug;

use crate::config::CommitConfig;
use crate::error::{Error, Result};

pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";
pub const ELLIPSIS: char = '…';

pub struct MessageNormalizer;

impl MessageNormalizer {
    /// Normalize `raw`, or fail with [`Error::EmptyResponse`] carrying `raw`.
    pub fn normalize(raw: &str, commit: &CommitConfig) -> Result<String> {
        Self::clean(raw, commit).ok_or_else(|| Error::EmptyResponse {
            raw: raw.to_string(),
        })
    }

    /// `None` when nothing is left after cleaning
    pub fn clean(raw: &str, commit: &CommitConfig) -> Option<String> {
        let cleaned = Self::strip_reasoning(raw);

        if cleaned.is_empty() {
            return None;
        }

        Some(Self::split_subject(&cleaned, commit.max_length))
    }

    /// Steps 1-3 only: trimmed text with reasoning removed
    pub fn strip_reasoning(raw: &str) -> String {
        Self::strip_thinking(raw.trim()).trim().to_string()
    }

    fn strip_thinking(text: &str) -> String {
        // Everything up to the last closing marker is reasoning
        let answer = match text.rfind(THINK_CLOSE) {
            Some(pos) => {
                debug!(
                    discarded_chars = text[..pos].chars().count(),
                    "dropping model reasoning"
                );
                &text[pos + THINK_CLOSE.len()..]
            }
            None => text,
        };

        // An opening marker with no close: keep the content, lose the marker
        answer.replace(THINK_OPEN, "").replace(THINK_CLOSE, "")
    }

    fn split_subject(message: &str, max_length: usize) -> String {
        let (first, rest) = match message.split_once('\n') {
            Some((first, rest)) => (first, Some(rest)),
            None => (message, None),
        };
        let subject = first.trim();

        let mut lines: Vec<String> = Vec::new();
        let chars: Vec<char> = subject.chars().collect();

        if max_length > 0 && chars.len() > max_length {
            // Reserve one character for the ellipsis
            let limit = max_length - 1;
            let boundary = chars[..=limit]
                .iter()
                .rposition(|c| c.is_whitespace())
                .filter(|&idx| idx > 0);

            let (head, tail): (String, String) = match boundary {
                Some(idx) => (
                    chars[..idx].iter().collect::<String>().trim_end().to_string(),
                    chars[idx..].iter().collect::<String>().trim_start().to_string(),
                ),
                None => (
                    chars[..limit].iter().collect(),
                    chars[limit..].iter().collect(),
                ),
            };

            debug!(
                subject_chars = chars.len(),
                max_length,
                split_at = head.chars().count(),
                "subject too long, splitting"
            );

            lines.push(format!("{head}{ELLIPSIS}"));
            if !tail.is_empty() {
                lines.push(format!("{ELLIPSIS}{tail}"));
            }
        } else {
            lines.push(subject.to_string());
        }

        if let Some(rest) = rest {
            lines.push(rest.to_string());
        }

        lines.join("\n")
    }
}
