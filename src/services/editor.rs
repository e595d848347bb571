// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use dialoguer::Editor;
use tracing::debug;

use crate::error::{Error, Result};

/// Open `message` in `$VISUAL` / `$EDITOR` and return the edited text
pub fn edit(message: &str) -> Result<String> {
    let mut editor = Editor::new();
    editor.extension(".txt");

    let edited = editor
        .edit(message)
        .map_err(|e| Error::Editor(e.to_string()))?;

    finish_edit(edited)
}

fn finish_edit(edited: Option<String>) -> Result<String> {
    let Some(text) = edited else {
        return Err(Error::Editor("editor closed without saving".into()));
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Editor("commit message cannot be empty".into()));
    }

    debug!(chars = text.len(), "message edited");
    Ok(text.to_string())
}
