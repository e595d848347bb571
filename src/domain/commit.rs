// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

/// Conventional commit types the prompt allows the model to choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    Feat,
    Fix,
    Refactor,
    Docs,
    Style,
    Test,
    Chore,
}

impl CommitType {
    pub const VARIANTS: [CommitType; 7] = [
        Self::Feat,
        Self::Fix,
        Self::Refactor,
        Self::Docs,
        Self::Style,
        Self::Test,
        Self::Chore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Test => "test",
            Self::Chore => "chore",
        }
    }

    /// One-line guidance shown to the model next to the type name
    pub fn description(&self) -> &'static str {
        match self {
            Self::Feat => "a new feature or an improvement to an existing one",
            Self::Fix => "a bug fix or a correction of wrong behavior",
            Self::Refactor => {
                "restructuring that does not change behavior and is not user-facing"
            }
            Self::Docs => "documentation only",
            Self::Style => "formatting, whitespace, naming; no logic change",
            Self::Test => "adding or updating tests",
            Self::Chore => "maintenance that is neither a feature nor user-facing",
        }
    }
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
