// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborator doubles shared by the executor integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)] // each test binary uses its own subset
// Allow unsafe_code so the crash double can raise a real signal.
#![allow(unsafe_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vetch::check::FileSettings;
use vetch::diagnostic::{Diagnostic, Severity, SourceLocation};
use vetch::logger::ErrorLogger;
use vetch::progress::ProgressReporter;
use vetch::{Batch, Checker, SourceFile};

/// Everything the outer logger saw, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Out(String),
    Err(String),
    Info(String),
}

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LogEvent::Err(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn outs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LogEvent::Out(text) => Some(text),
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
pub struct RecordingProgress {
    calls: Mutex<Vec<(usize, usize, u64, u64)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(usize, usize, u64, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report_status(&self, processed: usize, total: usize, bytes: u64, total_bytes: u64) {
        self.calls.lock().unwrap().push((processed, total, bytes, total_bytes));
    }
}

/// A checker scripted per unit label: result code plus diagnostics to emit.
#[derive(Default)]
pub struct ScriptedChecker {
    codes: HashMap<String, u32>,
    diags: HashMap<String, Vec<Diagnostic>>,
    /// Announce `"<form>:<label>"` through `report_out` on every call, so
    /// process-backend tests can observe which checker form ran in the
    /// child.
    announce_form: bool,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, label: &str, code: u32) -> Self {
        self.codes.insert(label.to_string(), code);
        self
    }

    pub fn with_diag(mut self, label: &str, diag: Diagnostic) -> Self {
        self.diags.entry(label.to_string()).or_default().push(diag);
        self
    }

    pub fn announcing_forms(mut self) -> Self {
        self.announce_form = true;
        self
    }

    fn run(&self, form: &str, label: &str, logger: &dyn ErrorLogger) -> u32 {
        if self.announce_form {
            logger.report_out(&format!("{form}:{label}"));
        }
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
        self.run("path", &path.display().to_string(), logger)
    }

    fn check_content(&self, path: &Path, _content: &str, logger: &dyn ErrorLogger) -> u32 {
        self.run("content", &path.display().to_string(), logger)
    }

    fn check_settings(&self, settings: &FileSettings, logger: &dyn ErrorLogger) -> u32 {
        self.run("settings", &settings.label(), logger)
    }
}

/// Tracks how many units are being analysed at once.
#[derive(Default)]
pub struct GaugedChecker {
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl GaugedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn enter(&self) -> u32 {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        // Hold the slot long enough for other workers to pile in.
        std::thread::sleep(Duration::from_millis(10));
        self.active.fetch_sub(1, Ordering::SeqCst);
        1
    }
}

impl Checker for GaugedChecker {
    fn check_path(&self, _path: &Path, _logger: &dyn ErrorLogger) -> u32 {
        self.enter()
    }

    fn check_content(&self, _path: &Path, _content: &str, _logger: &dyn ErrorLogger) -> u32 {
        self.enter()
    }

    fn check_settings(&self, _settings: &FileSettings, _logger: &dyn ErrorLogger) -> u32 {
        self.enter()
    }
}

/// Kills its own process on the configured unit. Only meaningful on the
/// process backend, where the unit runs in a child.
#[cfg(unix)]
pub struct CrashingChecker {
    pub crash_on: &'static str,
    pub code: u32,
}

#[cfg(unix)]
impl Checker for CrashingChecker {
    fn check_path(&self, path: &Path, _logger: &dyn ErrorLogger) -> u32 {
        if path.display().to_string() == self.crash_on {
            // SIGKILL cannot be caught; the parent sees a signalled child.
            unsafe { libc::raise(libc::SIGKILL) };
        }
        self.code
    }

    fn check_content(&self, path: &Path, _content: &str, logger: &dyn ErrorLogger) -> u32 {
        self.check_path(path, logger)
    }

    fn check_settings(&self, _settings: &FileSettings, _logger: &dyn ErrorLogger) -> u32 {
        self.code
    }
}

/// One-location diagnostic with matching summary and detail.
pub fn diag(file: &str, line: u32, id: &str, text: &str) -> Diagnostic {
    Diagnostic::new(
        vec![SourceLocation::new(file, line)],
        text,
        Severity::Error,
        text,
        id,
        false,
    )
}

pub fn file_batch(files: &[(&str, u64)]) -> Batch {
    Batch {
        files: files.iter().map(|(path, size)| SourceFile::new(*path, *size)).collect(),
        file_settings: vec![],
    }
}
