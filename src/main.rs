// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_ac::{App, Cli, Error, Result};

#[tokio::main]
async fn main() -> ExitCode {
    install_report_hook();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // Ctrl+C is a user choice, not a failure
        Err(Error::Cancelled) => {
            eprintln!("Aborted.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut app = App::new(cli)?;
    app.run().await
}

fn install_report_hook() {
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(2)
                .build(),
        )
    }));
}

/// Diagnostics go to stderr so stdout stays clean for `--dry-run` output.
/// `-v` forces debug for this crate, otherwise `RUST_LOG` decides.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("git_ac=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("git_ac=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::env::var_os("NO_COLOR").is_none())
        .with_target(false)
        .without_time()
        .compact()
        .init();
}
