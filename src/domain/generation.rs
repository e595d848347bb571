// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

/// Sampling settings for the two kinds of generation call.
///
/// Summaries favor factual compression, the final message favors fluent
/// phrasing. Both share the same context budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingProfile {
    Summarize,
    Compose,
}

impl SamplingProfile {
    pub fn temperature(&self) -> f32 {
        match self {
            Self::Summarize => 0.3,
            Self::Compose => 0.7,
        }
    }

    pub fn top_p(&self) -> f32 {
        match self {
            Self::Summarize => 0.8,
            Self::Compose => 0.9,
        }
    }

    /// Stop the summary before the model starts echoing prompt sections
    pub fn stop_sequences(&self) -> Vec<String> {
        match self {
            Self::Summarize => vec!["\n\nDIFF:".into(), "\n\nCOMMIT".into()],
            Self::Compose => Vec::new(),
        }
    }
}

/// Backend-agnostic request; each provider maps it to its own wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
    pub context_window: u32,
}

impl GenerationRequest {
    pub fn new(prompt: String, profile: SamplingProfile, context_window: u32) -> Self {
        Self {
            prompt,
            temperature: profile.temperature(),
            top_p: profile.top_p(),
            stop: profile.stop_sequences(),
            context_window,
        }
    }
}

/// Raw provider output, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
}

impl GenerationResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
