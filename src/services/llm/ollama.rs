// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{
    HEALTH_CHECK_TIMEOUT, LlmProvider, health_check_error, status_error, transport_error,
    with_deadline,
};
use crate::config::Config;
use crate::domain::{GenerationRequest, GenerationResult};
use crate::error::{Error, Result};

const PROVIDER: &str = "ollama";
const NOT_RUNNING_HINT: &str = "Make sure Ollama is running with: ollama serve";

pub struct OllamaProvider {
    client: Client,
    host: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Serialize)]
struct GenerateOptions<'a> {
    temperature: f32,
    top_p: f32,
    num_ctx: u32,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            // Sanitize: remove trailing slashes to avoid //api/generate
            host: config.ollama.host.trim_end_matches('/').to_string(),
            model: config.ollama.model.clone(),
            timeout: config.timeout(),
        })
    }

    /// Names of all locally available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.host);

        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.host, HEALTH_CHECK_TIMEOUT, NOT_RUNNING_HINT))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &self.host, HEALTH_CHECK_TIMEOUT, NOT_RUNNING_HINT))?;

        if !status.is_success() {
            return Err(status_error(PROVIDER, &self.model, status, body));
        }

        let tags: TagsResponse = serde_json::from_str(&body).map_err(|_| Error::Protocol {
            provider: PROVIDER.into(),
            status: status.as_u16(),
            body,
        })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Ollama reports untagged pulls as `name:latest`
    fn is_configured_model(&self, name: &str) -> bool {
        name == self.model
            || name.strip_suffix(":latest") == Some(self.model.as_str())
            || self.model.strip_suffix(":latest") == Some(name)
    }

    async fn request(&self, body: &GenerateRequest<'_>) -> Result<String> {
        let url = format!("{}/api/generate", self.host);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.host, self.timeout, NOT_RUNNING_HINT))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER, &self.model, status, body));
        }

        // Newline-delimited JSON. With stream=false there is a single object,
        // but chunked bodies are accumulated the same way. Buffer raw bytes so
        // multi-byte characters split across chunks survive.
        let mut stream = response.bytes_stream();
        let mut full_response = String::new();
        let mut pending: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| transport_error(e, &self.host, self.timeout, NOT_RUNNING_HINT))?;
            pending.extend_from_slice(&chunk);

            while let Some(newline_pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline_pos).collect();
                if Self::absorb_line(&line, &mut full_response)? {
                    return Ok(full_response);
                }
            }
        }

        Self::absorb_line(&pending, &mut full_response)?;
        Ok(full_response)
    }

    /// Append one NDJSON line to `out`. Returns `true` once the server
    /// reports the generation as done.
    fn absorb_line(line: &[u8], out: &mut String) -> Result<bool> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(false);
        }

        let chunk: GenerateChunk = serde_json::from_slice(line).map_err(|_| Error::Protocol {
            provider: PROVIDER.into(),
            status: 200,
            body: String::from_utf8_lossy(line).trim().to_string(),
        })?;

        if let Some(message) = chunk.error {
            return Err(Error::Protocol {
                provider: PROVIDER.into(),
                status: 200,
                body: message,
            });
        }

        out.push_str(&chunk.response);
        Ok(chunk.done)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn health_check(&self) -> Result<()> {
        let available = self
            .list_models()
            .await
            .map_err(|e| health_check_error(e, &self.host))?;

        if !available.iter().any(|name| self.is_configured_model(name)) {
            return Err(Error::ModelNotFound {
                model: self.model.clone(),
                available,
            });
        }

        debug!(host = %self.host, model = %self.model, "ollama model available");
        Ok(())
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationResult> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                top_p: request.top_p,
                num_ctx: request.context_window,
                stop: &request.stop,
            },
        };

        let text = with_deadline(self.request(&body), self.timeout, &cancel).await?;
        debug!(chars = text.len(), "ollama response received");

        Ok(GenerationResult::new(text))
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}
