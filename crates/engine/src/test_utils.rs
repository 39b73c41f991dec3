// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared doubles for executor tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::check::{Checker, FileSettings};
use crate::diagnostic::{Diagnostic, Severity, SourceLocation};
use crate::logger::ErrorLogger;
use crate::progress::ProgressReporter;

/// Everything the outer logger saw, in arrival order. Diagnostics are
/// recorded in their terse rendered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogEvent {
    Out(String),
    Err(String),
    Info(String),
}

#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLogger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LogEvent::Err(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: LogEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ErrorLogger for RecordingLogger {
    fn report_out(&self, text: &str) {
        self.push(LogEvent::Out(text.to_string()));
    }

    fn report_err(&self, diag: &Diagnostic) {
        self.push(LogEvent::Err(diag.to_text(false)));
    }

    fn report_info(&self, diag: &Diagnostic) {
        self.push(LogEvent::Info(diag.to_text(false)));
    }
}

#[derive(Default)]
pub(crate) struct RecordingProgress {
    calls: Mutex<Vec<(usize, usize, u64, u64)>>,
}

impl RecordingProgress {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<(usize, usize, u64, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report_status(&self, processed: usize, total: usize, bytes: u64, total_bytes: u64) {
        self.calls.lock().unwrap().push((processed, total, bytes, total_bytes));
    }
}

/// A checker scripted per unit label: a result code plus diagnostics to
/// emit. Records which checker form each unit arrived through.
#[derive(Default)]
pub(crate) struct ScriptedChecker {
    codes: HashMap<String, u32>,
    diags: HashMap<String, Vec<Diagnostic>>,
    path_calls: Mutex<Vec<String>>,
    content_calls: Mutex<Vec<String>>,
    settings_calls: Mutex<Vec<String>>,
}

impl ScriptedChecker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_code(mut self, label: &str, code: u32) -> Self {
        self.codes.insert(label.to_string(), code);
        self
    }

    pub(crate) fn with_diag(mut self, label: &str, diag: Diagnostic) -> Self {
        self.diags.entry(label.to_string()).or_default().push(diag);
        self
    }

    pub(crate) fn path_calls(&self) -> Vec<String> {
        self.path_calls.lock().unwrap().clone()
    }

    pub(crate) fn content_calls(&self) -> Vec<String> {
        self.content_calls.lock().unwrap().clone()
    }

    pub(crate) fn settings_calls(&self) -> Vec<String> {
        self.settings_calls.lock().unwrap().clone()
    }

    fn run(&self, label: &str, logger: &dyn ErrorLogger) -> u32 {
        if let Some(diags) = self.diags.get(label) {
            for diag in diags {
                match diag.severity {
                    Severity::Information => logger.report_info(diag),
                    _ => logger.report_err(diag),
                }
            }
        }
        self.codes.get(label).copied().unwrap_or(0)
    }
}

impl Checker for ScriptedChecker {
    fn check_path(&self, path: &Path, logger: &dyn ErrorLogger) -> u32 {
        let label = path.display().to_string();
        self.path_calls.lock().unwrap().push(label.clone());
        self.run(&label, logger)
    }

    fn check_content(&self, path: &Path, _content: &str, logger: &dyn ErrorLogger) -> u32 {
        let label = path.display().to_string();
        self.content_calls.lock().unwrap().push(label.clone());
        self.run(&label, logger)
    }

    fn check_settings(&self, settings: &FileSettings, logger: &dyn ErrorLogger) -> u32 {
        let label = settings.label();
        self.settings_calls.lock().unwrap().push(label.clone());
        self.run(&label, logger)
    }
}

/// One-location diagnostic with matching summary and detail.
pub(crate) fn diag(file: &str, line: u32, id: &str, text: &str) -> Diagnostic {
    Diagnostic::new(
        vec![SourceLocation::new(file, line)],
        text,
        Severity::Error,
        text,
        id,
        false,
    )
}
