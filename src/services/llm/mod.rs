// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

pub mod ollama;
pub mod openai;

use crate::config::{Config, Provider};
use crate::domain::{GenerationRequest, GenerationResult};
use crate::error::{Error, Result};

/// Health checks fail fast, independent of the generation timeout
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Verify the backend is reachable and the configured model is usable
    async fn health_check(&self) -> Result<()>;

    /// Run one non-streaming generation, bounded by the configured timeout
    /// and aborted when `cancel` fires
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationResult>;

    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

pub fn create_provider(config: &Config) -> Result<Box<dyn LlmProvider>> {
    match config.provider {
        Provider::Ollama => Ok(Box::new(ollama::OllamaProvider::new(config)?)),
        Provider::OpenAI => Ok(Box::new(openai::OpenAiProvider::new(config)?)),
    }
}

/// Race `fut` against a deadline and the cancellation token. Dropping the
/// future aborts the in-flight request and discards any partial body.
pub(crate) async fn with_deadline<T, F>(
    fut: F,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = tokio::time::timeout(timeout, fut) => match res {
            Ok(inner) => inner,
            Err(_) => Err(Error::Timeout { secs: timeout.as_secs() }),
        },
    }
}

/// Classify a transport failure from `reqwest`
pub(crate) fn transport_error(
    err: reqwest::Error,
    endpoint: &str,
    timeout: Duration,
    hint: &str,
) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            secs: timeout.as_secs(),
        }
    } else if err.is_connect() {
        Error::Connectivity {
            endpoint: endpoint.to_string(),
            hint: hint.to_string(),
        }
    } else {
        Error::Http(err)
    }
}

/// Health checks run on [`HEALTH_CHECK_TIMEOUT`], not the configured
/// timeout; report an expired deadline as such
pub(crate) fn health_check_error(err: Error, endpoint: &str) -> Error {
    match err {
        Error::Timeout { secs } => Error::HealthCheckTimeout {
            endpoint: endpoint.to_string(),
            secs,
        },
        other => other,
    }
}

/// Map a non-success HTTP status to an error kind
pub(crate) fn status_error(provider: &str, model: &str, status: StatusCode, body: String) -> Error {
    match status.as_u16() {
        401 => Error::Authentication {
            provider: provider.to_string(),
        },
        404 => Error::ModelNotFound {
            model: model.to_string(),
            available: Vec::new(),
        },
        429 => Error::RateLimited {
            provider: provider.to_string(),
        },
        code @ 500..=599 => Error::Server {
            provider: provider.to_string(),
            status: code,
        },
        code => Error::Protocol {
            provider: provider.to_string(),
            status: code,
            body,
        },
    }
}
