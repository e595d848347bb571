// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{
    HEALTH_CHECK_TIMEOUT, LlmProvider, health_check_error, status_error, transport_error,
    with_deadline,
};
use crate::config::Config;
use crate::domain::{GenerationRequest, GenerationResult};
use crate::error::{Error, Result};

const PROVIDER: &str = "openai";
const UNREACHABLE_HINT: &str =
    "Check your network connection and openai.base_url in the config";

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
    stream: bool,
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.openai.base_url.trim_end_matches('/').to_string(),
            model: config.openai.model.clone(),
            api_key: SecretString::from(config.openai.api_key.clone().unwrap_or_default()),
            timeout: config.timeout(),
        })
    }

    async fn complete(&self, body: &ChatRequest<'_>, timeout: Duration) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url, timeout, UNREACHABLE_HINT))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, &self.base_url, timeout, UNREACHABLE_HINT))?;

        if status != reqwest::StatusCode::OK {
            return Err(status_error(PROVIDER, &self.model, status, text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|_| Error::Protocol {
            provider: PROVIDER.into(),
            status: status.as_u16(),
            body: text.clone(),
        })?;

        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(Error::Protocol {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body: text,
            });
        };

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    /// A one-token completion: proves the key, the endpoint and the model
    /// in a single round trip.
    async fn health_check(&self) -> Result<()> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: "test",
            }],
            max_tokens: 1,
            temperature: 0.1,
            top_p: None,
            stop: &[],
            stream: false,
        };

        self.complete(&body, HEALTH_CHECK_TIMEOUT)
            .await
            .map_err(|e| health_check_error(e, &self.base_url))?;
        debug!(base_url = %self.base_url, model = %self.model, "openai endpoint healthy");
        Ok(())
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationResult> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.context_window,
            temperature: request.temperature,
            top_p: Some(request.top_p),
            stop: &request.stop,
            stream: false,
        };

        let text = with_deadline(self.complete(&body, self.timeout), self.timeout, &cancel).await?;
        debug!(chars = text.len(), "openai response received");

        Ok(GenerationResult::new(text))
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}
