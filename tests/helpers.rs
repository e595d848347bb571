// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use git_ac::config::CommitConfig;
use git_ac::domain::{GenerationRequest, GenerationResult};
use git_ac::error::{Error, Result};
use git_ac::services::llm::LlmProvider;
use git_ac::services::pipeline::CommitPipeline;

/// Provider that replays canned replies and records every request
#[allow(dead_code)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
    health: Mutex<Option<Error>>,
    stalled: bool,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String>>) -> (Self, Arc<Mutex<Vec<GenerationRequest>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let provider = Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::clone(&calls),
            health: Mutex::new(None),
            stalled: false,
        };
        (provider, calls)
    }

    pub fn unhealthy(mut self, err: Error) -> Self {
        self.health = Mutex::new(Some(err));
        self
    }

    /// Health check that never answers
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn health_check(&self) -> Result<()> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        match self.health.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        _cancel: CancellationToken,
    ) -> Result<GenerationResult> {
        self.calls.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("provider called more often than scripted");
        reply.map(GenerationResult::new)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Pipeline over a scripted provider with the default 4096-token window
#[allow(dead_code)]
pub fn scripted_pipeline(
    replies: Vec<Result<String>>,
) -> (CommitPipeline, Arc<Mutex<Vec<GenerationRequest>>>) {
    let (provider, calls) = ScriptedProvider::new(replies);
    let pipeline = CommitPipeline::with_settings(
        Box::new(provider),
        CommitConfig::default(),
        4096,
        CancellationToken::new(),
    );
    (pipeline, calls)
}

/// A diff body of exactly `words` whitespace-separated words
#[allow(dead_code)]
pub fn diff_of_words(words: usize) -> String {
    let mut diff = String::from("diff --git a/src/lib.rs b/src/lib.rs\n");
    let header_words = 4;
    for i in 0..words.saturating_sub(header_words) {
        diff.push_str(&format!("+w{i}"));
        diff.push(if i % 10 == 9 { '\n' } else { ' ' });
    }
    diff
}
