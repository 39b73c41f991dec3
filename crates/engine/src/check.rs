// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Work units and the checker interface.
//!
//! The executor never inspects file contents itself; it hands each unit to
//! a [`Checker`] and forwards whatever the checker reports.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logger::ErrorLogger;

/// A source file scheduled for analysis, with its on-disk size.
///
/// The size only feeds the byte-progress counter; the checker decides how
/// the file is actually read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), size }
    }
}

/// A pre-configured entry from an imported project.
///
/// Carries the per-file build configuration the import step resolved. The
/// executor treats it as an opaque payload for [`Checker::check_settings`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FileSettings {
    /// Path of the file this entry configures.
    pub path: PathBuf,

    /// Configuration label, e.g. `"Debug|x64"`.
    #[serde(default)]
    pub config: String,

    /// Preprocessor defines, `NAME` or `NAME=VALUE`.
    #[serde(default)]
    pub defines: Vec<String>,

    /// Include search paths.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
}

impl FileSettings {
    /// Label used when attributing diagnostics to this entry.
    pub fn label(&self) -> String {
        if self.config.is_empty() {
            self.path.display().to_string()
        } else {
            format!("{} {}", self.path.display(), self.config)
        }
    }
}

/// The two input sequences of one run.
///
/// Files are dispatched first, then file-settings entries.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub files: Vec<SourceFile>,
    pub file_settings: Vec<FileSettings>,
}

impl Batch {
    pub fn total_units(&self) -> usize {
        self.files.len() + self.file_settings.len()
    }

    /// Sum of file sizes. Settings entries contribute no bytes, so the byte
    /// ratio of a progress line can reach 100% before the unit ratio does.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// One analysis work item.
#[derive(Debug, Clone)]
pub enum WorkUnit {
    File(SourceFile),
    Settings(FileSettings),
}

impl WorkUnit {
    /// Label used for progress and for attributing crash diagnostics.
    pub fn label(&self) -> String {
        match self {
            WorkUnit::File(file) => file.path.display().to_string(),
            WorkUnit::Settings(fs) => fs.label(),
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            WorkUnit::File(file) => file.size,
            WorkUnit::Settings(_) => 0,
        }
    }
}

/// Analyses one unit and reports diagnostics through the supplied logger.
///
/// The logger handed in is the executor's sink, so suppression and
/// de-duplication apply to everything reported here. Implementations must
/// return the unit's numeric result code; the executor sums these across
/// the batch. A checker instance may be invoked from several workers at
/// once and must not share mutable state between calls.
pub trait Checker: Sync {
    /// Analyse a file read from disk.
    fn check_path(&self, path: &Path, logger: &dyn ErrorLogger) -> u32;

    /// Analyse in-memory content standing in for `path`.
    fn check_content(&self, path: &Path, content: &str, logger: &dyn ErrorLogger) -> u32;

    /// Analyse a pre-configured project entry.
    fn check_settings(&self, settings: &FileSettings, logger: &dyn ErrorLogger) -> u32;
}

/// Dispatch one unit to the matching checker form.
///
/// In-memory content supplied up front takes precedence over reading the
/// path from disk.
pub(crate) fn check_unit(
    checker: &dyn Checker,
    unit: &WorkUnit,
    contents: &std::collections::HashMap<PathBuf, String>,
    logger: &dyn ErrorLogger,
) -> u32 {
    match unit {
        WorkUnit::Settings(fs) => checker.check_settings(fs, logger),
        WorkUnit::File(file) => match contents.get(&file.path) {
            Some(content) => checker.check_content(&file.path, content, logger),
            None => checker.check_path(&file.path, logger),
        },
    }
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
