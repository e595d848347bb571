// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Write;

use crate::config::CommitConfig;
use crate::domain::CommitType;

/// README lines embedded as project context
pub const README_LINE_CAP: usize = 20;

pub const README_TRUNCATION_MARKER: &str = "... (truncated)";

pub const README_HEADER: &str = "PROJECT README:";
pub const DIFF_HEADER: &str = "STAGED DIFF:";
pub const SUMMARY_HEADER: &str = "FILE CHANGES SUMMARIZED:";

const SCOPE_EXAMPLES_GOOD: &str = "auth, parser, config, tests, api client";
const SCOPE_EXAMPLES_BAD: &str = "src, internal, pkg, lib/utils.rs, deps";

/// Stage one of the two-stage path: turn an oversized diff into prose.
pub fn build_summarize_prompt(diff: &str) -> String {
    format!(
        "Summarize the changes in the following diff. Go file by file and describe \
what changed in each one in a few sentences. Be precise and mention concrete \
names (functions, options, types) where they matter. The summary is for a \
developer who knows the codebase; do not speculate about intent.\n\n\
DIFF:\n{diff}\n\nSUMMARY:"
    )
}

/// Prompt for the final commit message.
///
/// `content` is the raw diff, or the stage-one summary when `is_summary`
/// is set. Only the section header differs between the two.
pub fn build_commit_prompt(
    content: &str,
    readme: &str,
    is_summary: bool,
    commit: &CommitConfig,
) -> String {
    let mut prompt = String::with_capacity(content.len() + 2048);

    prompt.push_str(
        "You are a Git commit message generator. Read the changes below and output \
ONLY a conventional commit message that summarizes the most significant changes. \
Be specific: 'raise subject limit to 72 characters' beats 'update commit rules'. \
Add a short description body only when the changes are large or complex.\n\n",
    );

    prompt.push_str("REQUIRED FORMAT:\ntype(scope): subject\n\noptional body\n\n");

    prompt.push_str("VALID TYPES:\n");
    for ty in CommitType::VARIANTS {
        let _ = writeln!(prompt, "{} - {}", ty.as_str(), ty.description());
    }
    prompt.push('\n');

    prompt.push_str("GOOD SUBJECT LINES:\n");
    prompt.push_str("feat(auth): add JWT token validation\n");
    prompt.push_str("fix(parser): handle empty input strings\n");
    prompt.push_str("refactor(config): simplify file loading\n");
    prompt.push_str("docs: update installation guide\n\n");

    prompt.push_str("RULES:\n");
    let _ = writeln!(
        prompt,
        "- The subject line MUST be under {} characters",
        commit.max_length
    );
    prompt.push_str("- Use present tense (add, not added)\n");
    prompt.push_str("- Start immediately with 'type(scope):', no preamble, headings or reasoning\n");
    prompt.push_str("- Output ONLY the commit message\n");
    prompt.push_str(
        "- The scope is one or two words naming the area of code, never a file or module path; \
omit it when several unrelated areas changed\n",
    );
    let _ = writeln!(prompt, "- Good scopes: {SCOPE_EXAMPLES_GOOD}");
    let _ = writeln!(prompt, "- Bad scopes: {SCOPE_EXAMPLES_BAD}");
    prompt.push_str(
        "- A body, if present, is specific and concise; never write filler such as \
'No extended description' or 'Note:'\n\n",
    );

    if !readme.trim().is_empty() {
        prompt.push_str(README_HEADER);
        prompt.push('\n');
        prompt.push_str(&truncate_readme(readme));
        prompt.push_str("\n\n");
    }

    prompt.push_str(if is_summary {
        SUMMARY_HEADER
    } else {
        DIFF_HEADER
    });
    prompt.push('\n');
    prompt.push_str(content);

    prompt
}

/// First [`README_LINE_CAP`] lines, with a marker when anything was cut
pub fn truncate_readme(readme: &str) -> String {
    let mut lines = readme.lines();
    let head: Vec<&str> = lines.by_ref().take(README_LINE_CAP).collect();
    let mut out = head.join("\n");

    if lines.next().is_some() {
        out.push('\n');
        out.push_str(README_TRUNCATION_MARKER);
    }

    out
}
