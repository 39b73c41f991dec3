// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The de-duplicating, suppression-aware forwarder between workers and the
//! outer logger.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::Settings;
use crate::config::suppress::SuppressionFilter;
use crate::diagnostic::Diagnostic;
use crate::logger::ErrorLogger;
use crate::progress::ProgressReporter;

// A poisoned lock only means some checker panicked mid-report; the guarded
// data (a string set, plain counters) is still coherent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared by every worker of a run (threads directly, the process backend
/// through the parent's frame decoder). Implements [`ErrorLogger`], so a
/// checker reporting into it cannot tell it apart from the real logger.
pub(crate) struct DiagnosticSink<'a> {
    logger: &'a dyn ErrorLogger,
    progress: &'a dyn ProgressReporter,
    filter: SuppressionFilter,
    verbose: bool,
    /// Rendered forms already surfaced. Grows monotonically over the run.
    seen: Mutex<HashSet<String>>,
    /// Serialises every call into the outer logger and progress reporter.
    report: Mutex<()>,
}

enum DiagKind {
    Error,
    Info,
}

impl<'a> DiagnosticSink<'a> {
    pub(crate) fn new(
        settings: &Settings,
        logger: &'a dyn ErrorLogger,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            logger,
            progress,
            filter: SuppressionFilter::new(&settings.suppressions),
            verbose: settings.verbose,
            seen: Mutex::new(HashSet::new()),
            report: Mutex::new(()),
        }
    }

    /// Emit a progress line, serialised against diagnostic output.
    pub(crate) fn report_status(
        &self,
        processed: usize,
        total: usize,
        processed_bytes: u64,
        total_bytes: u64,
    ) {
        let _report = lock(&self.report);
        self.progress.report_status(processed, total, processed_bytes, total_bytes);
    }

    fn forward(&self, diag: &Diagnostic, kind: DiagKind) {
        if self.filter.is_suppressed(&diag.suppression_form()) {
            return;
        }

        let rendered = diag.to_text(self.verbose);

        // Membership-test-and-insert under the dedup lock; on first sight,
        // take the report lock while still holding it (the one permitted
        // nesting, dedup -> report) so delivery order matches insertion
        // order.
        let mut seen = lock(&self.seen);
        if !seen.insert(rendered) {
            return;
        }
        let _report = lock(&self.report);
        drop(seen);

        match kind {
            DiagKind::Error => self.logger.report_err(diag),
            DiagKind::Info => self.logger.report_info(diag),
        }
    }
}

impl ErrorLogger for DiagnosticSink<'_> {
    fn report_out(&self, text: &str) {
        let _report = lock(&self.report);
        self.logger.report_out(text);
    }

    fn report_err(&self, diag: &Diagnostic) {
        self.forward(diag, DiagKind::Error);
    }

    fn report_info(&self, diag: &Diagnostic) {
        self.forward(diag, DiagKind::Info);
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
