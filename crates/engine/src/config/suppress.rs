// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Suppression rules and the compiled matcher.
//!
//! A rule names a diagnostic id and optionally narrows it to a path glob
//! and a line. The executor consults the compiled filter before a finding
//! enters the de-duplication set, so suppressed findings leave no trace.

use globset::{Glob, GlobMatcher};
use serde::Deserialize;

/// One suppression entry, as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuppressionRule {
    /// Diagnostic id to suppress. `*` suppresses every id.
    pub id: String,

    /// Glob over the diagnostic's primary file. Absent means any file.
    #[serde(default)]
    pub path: Option<String>,

    /// Exact line restriction. Absent means any line.
    #[serde(default)]
    pub line: Option<u32>,
}

/// What a diagnostic reduces to for suppression matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionQuery {
    pub id: String,
    pub file: String,
    pub line: u32,
}

struct CompiledRule {
    id: String,
    matcher: Option<GlobMatcher>,
    line: Option<u32>,
}

/// Compiled set of suppression rules.
#[derive(Default)]
pub struct SuppressionFilter {
    rules: Vec<CompiledRule>,
}

impl SuppressionFilter {
    /// Compile `rules`, skipping entries whose glob does not parse.
    pub fn new(rules: &[SuppressionRule]) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let matcher = match &rule.path {
                None => None,
                Some(pattern) => match Glob::new(pattern) {
                    Ok(glob) => Some(glob.compile_matcher()),
                    Err(err) => {
                        tracing::warn!("invalid suppression glob {:?}: {}", pattern, err);
                        continue;
                    }
                },
            };
            compiled.push(CompiledRule { id: rule.id.clone(), matcher, line: rule.line });
        }
        Self { rules: compiled }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when any rule matches the query.
    pub fn is_suppressed(&self, query: &SuppressionQuery) -> bool {
        self.rules.iter().any(|rule| {
            if rule.id != "*" && rule.id != query.id {
                return false;
            }
            if let Some(matcher) = &rule.matcher
                && !matcher.is_match(&query.file)
            {
                return false;
            }
            if let Some(line) = rule.line
                && line != query.line
            {
                return false;
            }
            true
        })
    }
}

#[cfg(test)]
#[path = "suppress_tests.rs"]
mod tests;
