// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The diagnostic record checkers report and loggers receive.
//!
//! Diagnostics cross the worker pipe in serialized form, are rendered to a
//! single canonical string for de-duplication, and reduce to a
//! [`SuppressionQuery`] when the suppression filter is consulted.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::config::suppress::SuppressionQuery;

/// One position in the location chain of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    /// 0 means "whole file".
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self { file: file.into(), line }
    }
}

/// Severity taxonomy, ordered roughly by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Style,
    Performance,
    Portability,
    Information,
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Style => "style",
            Severity::Performance => "performance",
            Severity::Portability => "portability",
            Severity::Information => "information",
            Severity::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// A single finding produced by a checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Location chain; the first entry is the primary location.
    pub locations: Vec<SourceLocation>,

    /// Short one-line message.
    pub summary: String,

    pub severity: Severity,

    /// Long-form message used in verbose rendering.
    pub detail: String,

    /// Stable identifier of the rule that produced this finding.
    pub id: String,

    /// Set when the checker could not prove the finding.
    pub inconclusive: bool,
}

impl Diagnostic {
    pub fn new(
        locations: Vec<SourceLocation>,
        summary: impl Into<String>,
        severity: Severity,
        detail: impl Into<String>,
        id: impl Into<String>,
        inconclusive: bool,
    ) -> Self {
        Self {
            locations,
            summary: summary.into(),
            severity,
            detail: detail.into(),
            id: id.into(),
            inconclusive,
        }
    }

    /// Wire form used for the worker pipe.
    pub fn serialize(&self) -> String {
        // A struct of strings, integers and booleans cannot fail to encode.
        serde_json::to_string(self).expect("diagnostic encoding cannot fail")
    }

    /// Parse the wire form. The executor treats failure as a framing error.
    pub fn deserialize(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Render the canonical single-line text form.
    ///
    /// This string is also the de-duplication key, so the verbosity setting
    /// changes which findings count as duplicates.
    pub fn to_text(&self, verbose: bool) -> String {
        let mut out = String::new();

        if !self.locations.is_empty() {
            let mut first = true;
            for loc in &self.locations {
                if !first {
                    out.push_str(" -> ");
                }
                let _ = write!(out, "[{}:{}]", loc.file, loc.line);
                first = false;
            }
            out.push_str(": ");
        }

        if self.inconclusive {
            let _ = write!(out, "({}, inconclusive) ", self.severity);
        } else {
            let _ = write!(out, "({}) ", self.severity);
        }

        let message = if verbose && !self.detail.is_empty() {
            &self.detail
        } else {
            &self.summary
        };
        out.push_str(message);

        if !self.id.is_empty() {
            let _ = write!(out, " [{}]", self.id);
        }

        out
    }

    /// Reduce to the form the suppression filter matches against.
    ///
    /// Only the primary location participates in suppression.
    pub fn suppression_form(&self) -> SuppressionQuery {
        let (file, line) = match self.locations.first() {
            Some(loc) => (loc.file.clone(), loc.line),
            None => (String::new(), 0),
        };
        SuppressionQuery { id: self.id.clone(), file, line }
    }
}

#[cfg(test)]
#[path = "diagnostic_tests.rs"]
mod tests;
