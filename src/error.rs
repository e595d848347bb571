// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("No staged changes found")]
    #[diagnostic(
        code(git_ac::git::no_staged),
        help("Stage files with `git add <files>` or pass -a to stage modified files")
    )]
    NoStagedChanges,

    #[error("No changes to stage")]
    #[diagnostic(
        code(git_ac::git::nothing_to_stage),
        help("Modify or add files before running git-ac")
    )]
    NothingToStage,

    #[error("Not a git repository")]
    #[diagnostic(
        code(git_ac::git::not_repo),
        help("Run this command inside a git repository")
    )]
    NotAGitRepo,

    #[error("Git error: {0}")]
    #[diagnostic(code(git_ac::git::error))]
    Git(String),

    #[error("Editor error: {0}")]
    #[diagnostic(
        code(git_ac::editor::error),
        help("Set $VISUAL or $EDITOR to your preferred editor")
    )]
    Editor(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Cannot connect to {endpoint}")]
    #[diagnostic(code(git_ac::provider::connectivity), help("{hint}"))]
    Connectivity { endpoint: String, hint: String },

    #[error("Request timed out after {secs}s")]
    #[diagnostic(
        code(git_ac::provider::timeout),
        help("Increase timeout_secs in your config, or check that the model is available")
    )]
    Timeout { secs: u64 },

    #[error("Health check against {endpoint} timed out after {secs}s")]
    #[diagnostic(
        code(git_ac::provider::health_timeout),
        help("Health checks use a fixed deadline independent of timeout_secs. Make sure the service is running and responsive")
    )]
    HealthCheckTimeout { endpoint: String, secs: u64 },

    #[error("Authentication with {provider} failed")]
    #[diagnostic(
        code(git_ac::provider::auth),
        help("Check your API key (openai.api_key or OPENAI_API_KEY)")
    )]
    Authentication { provider: String },

    #[error("Model '{model}' not found. {}", describe_available(available))]
    #[diagnostic(
        code(git_ac::provider::model_not_found),
        help("Check the model name and that you have access to it (for Ollama: ollama pull {model})")
    )]
    ModelNotFound {
        model: String,
        available: Vec<String>,
    },

    #[error("Rate limit exceeded at {provider}")]
    #[diagnostic(
        code(git_ac::provider::rate_limited),
        help("Try again later or increase timeout_secs")
    )]
    RateLimited { provider: String },

    #[error("{provider} returned server error {status}")]
    #[diagnostic(
        code(git_ac::provider::server),
        help("The service may be degraded or experiencing an outage")
    )]
    Server { provider: String, status: u16 },

    #[error("Model returned an empty commit message (raw response: {raw:?})")]
    #[diagnostic(
        code(git_ac::commit::empty),
        help("Try again, or use a model that follows instructions more closely")
    )]
    EmptyResponse { raw: String },

    #[error("Unexpected response from {provider} (status {status}): {body}")]
    #[diagnostic(code(git_ac::provider::protocol))]
    Protocol {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Failed to {stage}")]
    #[diagnostic(code(git_ac::pipeline::stage))]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(git_ac::config::error))]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Wrap `self` with the pipeline stage that produced it.
    pub fn in_stage(self, stage: &'static str) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Innermost error, looking through any stage wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

fn describe_available(available: &[String]) -> String {
    if available.is_empty() {
        "No models reported by the server".into()
    } else {
        format!("Available: {}", available.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
