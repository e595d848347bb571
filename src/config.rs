// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::cli::Cli;
use crate::error::{Error, Result};

/// Commit message shape, shared by the prompt builder and the normalizer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitConfig {
    /// Maximum characters on the subject line (default: 72)
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Ollama,
    OpenAI,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            other => Err(Error::Config(format!(
                "unsupported provider '{other}' (supported: ollama, openai)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL for OpenAI-compatible APIs (default: https://api.openai.com/v1)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            model: default_openai_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: Provider,

    /// Generation request timeout in seconds (default 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Model context window in tokens. Drives the oversized-diff threshold
    /// and the per-request context budget (default 4096).
    #[serde(default = "default_context_window")]
    pub context_window: u32,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub commit: CommitConfig,
}

fn default_max_length() -> usize {
    72
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_context_window() -> u32 {
    4096
}
fn default_ollama_host() -> String {
    "http://localhost:11434".into()
}
fn default_ollama_model() -> String {
    "llama2".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            timeout_secs: default_timeout_secs(),
            context_window: default_context_window(),
            ollama: OllamaConfig::default(),
            openai: OpenAiConfig::default(),
            commit: CommitConfig::default(),
        }
    }
}

impl Config {
    /// Load with priority: CLI > ENV > user config > project config > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Project-level config (.git-ac.toml in the working directory)
        if let Ok(cwd) = std::env::current_dir() {
            let project_config = cwd.join(".git-ac.toml");
            if project_config.exists() {
                figment = figment.merge(Toml::file(&project_config));
            }
        }

        if let Some(path) = Self::config_path()
            && path.exists()
        {
            figment = figment.merge(Toml::file(&path));
        }

        // GIT_AC_PROVIDER, GIT_AC_OLLAMA__MODEL, GIT_AC_COMMIT__MAX_LENGTH, ...
        figment = figment.merge(Env::prefixed("GIT_AC_").split("__"));

        let mut config: Config = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        if config.openai.api_key.is_none() {
            config.openai.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        config.apply_cli(cli)?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "git-ac").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Model name for the selected provider
    pub fn model(&self) -> &str {
        match self.provider {
            Provider::Ollama => &self.ollama.model,
            Provider::OpenAI => &self.openai.model,
        }
    }

    /// Endpoint for the selected provider
    pub fn endpoint(&self) -> &str {
        match self.provider {
            Provider::Ollama => &self.ollama.host,
            Provider::OpenAI => &self.openai.base_url,
        }
    }

    fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(ref p) = cli.provider {
            self.provider = p.parse()?;
        }
        if let Some(ref m) = cli.model {
            match self.provider {
                Provider::Ollama => self.ollama.model = m.clone(),
                Provider::OpenAI => self.openai.model = m.clone(),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=600).contains(&self.timeout_secs) {
            return Err(Error::Config(format!(
                "timeout_secs must be 1–600, got {}",
                self.timeout_secs
            )));
        }

        if !(512..=1_048_576).contains(&self.context_window) {
            return Err(Error::Config(format!(
                "context_window must be 512–1048576, got {}",
                self.context_window
            )));
        }

        if !(20..=200).contains(&self.commit.max_length) {
            return Err(Error::Config(format!(
                "commit.max_length must be 20–200, got {}",
                self.commit.max_length
            )));
        }

        match self.provider {
            Provider::Ollama => {
                validate_endpoint("ollama.host", &self.ollama.host)?;
                if self.ollama.model.trim().is_empty() {
                    return Err(Error::Config("ollama.model cannot be empty".into()));
                }
            }
            Provider::OpenAI => {
                validate_endpoint("openai.base_url", &self.openai.base_url)?;
                let Some(ref key) = self.openai.api_key else {
                    return Err(Error::Config(
                        "openai requires an API key. Set openai.api_key, GIT_AC_OPENAI__API_KEY or OPENAI_API_KEY".into(),
                    ));
                };
                if key.len() < 10 {
                    return Err(Error::Config(format!(
                        "openai.api_key appears to be too short ({} characters)",
                        key.len()
                    )));
                }
                if self.openai.model.trim().is_empty() {
                    return Err(Error::Config("openai.model cannot be empty".into()));
                }
            }
        }

        Ok(())
    }

    /// Create default config file with secure permissions. An existing file
    /// is never overwritten.
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        let content = r#"# git-ac configuration

# LLM provider: ollama, openai
provider = "ollama"

# Request timeout in seconds (1-600)
timeout_secs = 30

# Model context window in tokens. Diffs longer than roughly half of this
# (in words) are summarized first, then the summary is turned into a message.
context_window = 4096

[ollama]
host = "http://localhost:11434"
# Use `ollama list` to see available models
model = "llama2"

[openai]
# Any OpenAI-compatible endpoint works here
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
# api_key = "sk-..."   # or set OPENAI_API_KEY

[commit]
# Maximum subject line length (20-200)
max_length = 72
"#;

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);

        // Secure permissions (0600) from the start, the file may hold an API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::Config(format!(
                "config already exists at {}, edit it or remove it first",
                path.display()
            )),
            _ => Error::Io(e),
        })?;
        file.write_all(content.as_bytes())?;

        Ok(path)
    }
}

fn validate_endpoint(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Config(format!("{key} cannot be empty")));
    }

    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("{key} is not a valid URL ('{value}'): {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{key} must start with http:// or https://, got '{value}'"
        )));
    }

    Ok(())
}
