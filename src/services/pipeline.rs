// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{CommitConfig, Config};
use crate::domain::{GenerationRequest, SamplingProfile};
use crate::error::{Error, Result};
use crate::services::llm::LlmProvider;
use crate::services::normalizer::MessageNormalizer;
use crate::services::{prompt, triage};

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct CommitDraft {
    pub message: String,
    /// Stage-one summary, present only for oversized diffs
    pub summary: Option<String>,
    /// Prompt that produced `message`
    pub prompt: String,
    /// Model output before normalization
    pub raw: String,
}

impl CommitDraft {
    pub fn is_two_stage(&self) -> bool {
        self.summary.is_some()
    }
}

/// Health check, triage, optional summarization, composition, normalization.
///
/// Holds no state between runs; each call either yields a complete
/// normalized message or an error.
pub struct CommitPipeline {
    provider: Box<dyn LlmProvider>,
    commit: CommitConfig,
    context_window: u32,
    cancel: CancellationToken,
}

impl CommitPipeline {
    pub fn new(provider: Box<dyn LlmProvider>, config: &Config, cancel: CancellationToken) -> Self {
        Self::with_settings(provider, config.commit, config.context_window, cancel)
    }

    pub fn with_settings(
        provider: Box<dyn LlmProvider>,
        commit: CommitConfig,
        context_window: u32,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            provider,
            commit,
            context_window,
            cancel,
        }
    }

    /// Provider health check, abandoned as soon as the run is cancelled
    pub async fn health_check(&self) -> Result<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            res = self.provider.health_check() => res,
        }
    }

    /// Produce a commit message for `diff`, with `readme` as optional context
    pub async fn generate_commit_message(&self, diff: &str, readme: &str) -> Result<String> {
        self.run(diff, readme).await.map(|draft| draft.message)
    }

    /// Same as [`Self::generate_commit_message`], keeping the intermediate
    /// artifacts for display
    pub async fn run(&self, diff: &str, readme: &str) -> Result<CommitDraft> {
        self.ensure_not_cancelled()?;
        self.health_check().await?;

        let oversized = triage::is_oversized(diff, self.context_window);
        debug!(
            words = triage::word_count(diff),
            threshold = triage::word_threshold(self.context_window),
            oversized,
            "diff triaged"
        );

        let summary = if oversized {
            info!("large diff detected, summarizing changes first");
            let summary = self
                .summarize(diff)
                .await
                .map_err(|e| e.in_stage("summarize staged changes"))?;
            Some(summary)
        } else {
            None
        };

        let prompt = match summary {
            Some(ref summary) => prompt::build_commit_prompt(summary, readme, true, &self.commit),
            None => prompt::build_commit_prompt(diff, readme, false, &self.commit),
        };

        self.ensure_not_cancelled()?;
        let request = GenerationRequest::new(prompt, SamplingProfile::Compose, self.context_window);
        let result = self.provider.generate(&request, self.cancel.clone()).await?;

        if result.is_blank() {
            return Err(Error::EmptyResponse { raw: result.text });
        }

        let message = MessageNormalizer::normalize(&result.text, &self.commit)?;
        debug!(lines = message.lines().count(), "commit message normalized");

        Ok(CommitDraft {
            message,
            summary,
            prompt: request.prompt,
            raw: result.text,
        })
    }

    async fn summarize(&self, diff: &str) -> Result<String> {
        let request = GenerationRequest::new(
            prompt::build_summarize_prompt(diff),
            SamplingProfile::Summarize,
            self.context_window,
        );
        let result = self.provider.generate(&request, self.cancel.clone()).await?;

        // Reasoning models wrap their work in <think> blocks here too
        let summary = MessageNormalizer::strip_reasoning(&result.text);
        if summary.is_empty() {
            return Err(Error::EmptyResponse { raw: result.text });
        }

        debug!(chars = summary.len(), "summary generated");
        Ok(summary)
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
