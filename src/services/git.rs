// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Checked in order; the first readable one wins
const README_FILES: &[&str] = &["README.md", "readme.md", "Readme.md", "README", "readme"];

pub struct GitService {
    work_dir: PathBuf,
}

impl GitService {
    pub fn discover() -> Result<Self> {
        Self::discover_at(".")
    }

    pub fn discover_at(path: impl AsRef<Path>) -> Result<Self> {
        let repo = gix::discover(path.as_ref()).map_err(|_| Error::NotAGitRepo)?;

        let work_dir = repo
            .workdir()
            .ok_or_else(|| Error::Git("Bare repository not supported".into()))?
            .to_path_buf();

        Ok(Self { work_dir })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Stage modifications and deletions of tracked files (`git add -u`)
    pub async fn stage_tracked(&self) -> Result<()> {
        self.run(&["add", "--update"]).await?;
        Ok(())
    }

    /// Unified diff of the index against HEAD
    pub async fn staged_diff(&self) -> Result<String> {
        let diff = self.run(&["diff", "--cached"]).await?;
        debug!(bytes = diff.len(), "staged diff read");
        Ok(diff)
    }

    /// README text from the repository root, or empty when there is none
    pub fn readme(&self) -> String {
        README_FILES
            .iter()
            .find_map(|name| std::fs::read_to_string(self.work_dir.join(name)).ok())
            .unwrap_or_default()
    }

    /// Commit the index with `message`, fed through stdin so multi-line
    /// messages survive untouched
    pub async fn commit(&self, message: &str) -> Result<()> {
        let mut child = Command::new("git")
            .args(["commit", "--file", "-"])
            .current_dir(&self.work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).await?;
            // Close stdin so git sees EOF
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(Error::Git(format!("git commit failed: {}", detail.trim())));
        }

        debug!("commit created");
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
