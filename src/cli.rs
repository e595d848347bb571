// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;
use clap_complete::Shell;

#[derive(Parser, Debug, Default)]
#[command(name = "git-ac")]
#[command(version)]
#[command(about = "AI-powered conventional commit message generator", long_about = None)]
pub struct Cli {
    /// Stage modified tracked files before generating the message
    #[arg(short, long)]
    pub all: bool,

    /// Edit the generated message in $EDITOR before committing
    #[arg(short, long)]
    pub edit: bool,

    /// LLM provider (ollama, openai)
    #[arg(short, long, env = "GIT_AC_PROVIDER")]
    pub provider: Option<String>,

    /// Model name for the selected provider
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print message only, don't commit
    #[arg(long)]
    pub dry_run: bool,

    /// Show the prompts sent to the LLM
    #[arg(long)]
    pub show_prompt: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Check that the configured provider is reachable and the model exists
    Doctor,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
