// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::io::IsTerminal;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{editor, git::GitService, llm, pipeline::CommitPipeline};

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        // Writing a config or completions must work even when the current one is broken
        let config = match cli.command {
            Some(Commands::Init) | Some(Commands::Completions { .. }) => Config::default(),
            _ => Config::load(&cli)?,
        };
        debug!(
            provider = %config.provider,
            model = %config.model(),
            timeout_secs = config.timeout_secs,
            context_window = config.context_window,
            "config loaded"
        );
        let cancel_token = CancellationToken::new();
        Ok(Self {
            cli,
            config,
            cancel_token,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        if let Some(ref cmd) = self.cli.command {
            return self.handle_command(cmd).await;
        }

        self.generate_commit().await
    }

    async fn generate_commit(&self) -> Result<()> {
        let git = GitService::discover()?;

        if self.cli.all {
            self.print_status("Staging modified files...");
            git.stage_tracked().await?;
        }

        let diff = git.staged_diff().await?;
        if diff.trim().is_empty() {
            return Err(if self.cli.all {
                Error::NothingToStage
            } else {
                Error::NoStagedChanges
            });
        }

        let readme = git.readme();
        debug!(readme_chars = readme.len(), "readme context loaded");

        let provider = llm::create_provider(&self.config)?;
        let pipeline = CommitPipeline::new(provider, &self.config, self.cancel_token.clone());

        self.print_info(&format!(
            "Generating commit message using model '{}' (timeout: {}s)...",
            self.config.model(),
            self.config.timeout_secs
        ));

        let spinner = self.spinner("Waiting for the model...");
        let draft = pipeline.run(&diff, &readme).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let draft = draft?;

        if draft.is_two_stage() {
            self.print_info("Large diff detected, used a two-stage summary");
        }

        if self.cli.show_prompt {
            if let Some(ref summary) = draft.summary {
                eprintln!("{}", style("--- SUMMARY ---").dim());
                eprintln!("{summary}");
            }
            eprintln!("{}", style("--- PROMPT ---").dim());
            eprintln!("{}", draft.prompt);
            eprintln!("{}", style("--- END PROMPT ---").dim());
        }

        let message = if self.cli.edit {
            editor::edit(&draft.message)?
        } else {
            draft.message
        };

        if self.cli.dry_run {
            println!("{message}");
            return Ok(());
        }

        if self.cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        git.commit(&message).await?;

        println!("Successfully committed with message:\n{message}");
        Ok(())
    }

    async fn handle_command(&self, cmd: &Commands) -> Result<()> {
        match cmd {
            Commands::Init => {
                let path = Config::create_default()?;
                println!("Created config: {}", path.display());
                Ok(())
            }
            Commands::Config => {
                println!("Provider: {}", self.config.provider);
                println!("Timeout: {}s", self.config.timeout_secs);
                println!("Context window: {} tokens", self.config.context_window);
                println!();
                println!("[ollama]");
                println!("  host: {}", self.config.ollama.host);
                println!("  model: {}", self.config.ollama.model);
                println!();
                println!("[openai]");
                println!("  base_url: {}", self.config.openai.base_url);
                println!("  model: {}", self.config.openai.model);
                println!(
                    "  api_key: {}",
                    if self.config.openai.api_key.is_some() {
                        "(set)"
                    } else {
                        "(not set)"
                    }
                );
                println!();
                println!("[commit]");
                println!("  max_length: {}", self.config.commit.max_length);
                Ok(())
            }
            Commands::Doctor => self.run_doctor().await,
            Commands::Completions { shell } => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(*shell, &mut cmd, "git-ac", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    async fn run_doctor(&self) -> Result<()> {
        eprintln!("{} Running diagnostics...\n", style("→").cyan());

        eprintln!("{}", style("Configuration").bold().underlined());
        eprintln!("  Provider:    {}", self.config.provider);
        eprintln!("  Model:       {}", self.config.model());
        eprintln!("  Timeout:     {}s", self.config.timeout_secs);
        if let Some(ref path) = Config::config_path() {
            let status = if path.exists() { "found" } else { "not found" };
            eprintln!("  Config file: {} ({})", path.display(), status);
        }
        eprintln!();

        eprintln!("{}", style("Provider Check").bold().underlined());
        eprint!("  {} ({}): ", self.config.provider, self.config.endpoint());
        let provider = llm::create_provider(&self.config)?;
        let pipeline = CommitPipeline::new(provider, &self.config, self.cancel_token.clone());
        let outcome = pipeline.health_check().await;
        // Failures are only flagged here; the full diagnostic is rendered once on exit
        match outcome {
            Ok(()) => {
                eprintln!("{}", style("OK").green().bold());
                eprintln!(
                    "  Model '{}': {}",
                    self.config.model(),
                    style("available").green()
                );
            }
            Err(Error::ModelNotFound { .. }) => {
                eprintln!("{}", style("connected").green());
                eprintln!(
                    "  Model '{}': {}",
                    self.config.model(),
                    style("NOT FOUND").red().bold()
                );
            }
            Err(_) => eprintln!("{}", style("FAILED").red().bold()),
        }
        eprintln!();

        eprintln!("{}", style("Git Repository").bold().underlined());
        match GitService::discover() {
            Ok(git) => eprintln!(
                "  Repository: {} ({})",
                style("found").green(),
                git.work_dir().display()
            ),
            Err(_) => eprintln!("  Repository: {}", style("NOT FOUND").red().bold()),
        }

        eprintln!();
        outcome?;
        eprintln!("{} Diagnostics complete.", style("✓").green().bold());

        Ok(())
    }

    // ─── Output Helpers ───

    fn spinner(&self, msg: &'static str) -> Option<ProgressBar> {
        if !std::io::stderr().is_terminal() {
            return None;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(msg);
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }

    fn print_status(&self, msg: &str) {
        eprintln!("{} {}", style("→").cyan(), msg);
    }

    fn print_info(&self, msg: &str) {
        eprintln!("{} {}", style("info:").dim(), style(msg).dim());
    }
}
