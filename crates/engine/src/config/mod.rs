// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Executor settings.

use serde::Deserialize;

use self::suppress::SuppressionRule;

pub mod suppress;

/// Knobs consulted by the executor. Everything defaults to the
/// single-job, unthrottled, non-verbose configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Maximum number of concurrent workers. Clamped to at least 1.
    #[serde(default = "Settings::default_jobs")]
    pub jobs: usize,

    /// Hold back new workers while the 1-minute load average is at or above
    /// this value. 0 disables the gate.
    #[serde(default)]
    pub load_average: f64,

    /// Render long-form diagnostic text. Also changes the de-duplication
    /// key, since findings are de-duplicated on their rendered form.
    #[serde(default)]
    pub verbose: bool,

    /// Drop all progress lines.
    #[serde(default)]
    pub quiet: bool,

    /// Findings matching any of these rules are never reported.
    #[serde(default)]
    pub suppressions: Vec<SuppressionRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jobs: Self::default_jobs(),
            load_average: 0.0,
            verbose: false,
            quiet: false,
            suppressions: Vec::new(),
        }
    }
}

impl Settings {
    pub(crate) fn default_jobs() -> usize {
        1
    }

    /// Effective worker cap.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.max(1)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
