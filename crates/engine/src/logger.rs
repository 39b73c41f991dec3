// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The logger interface workers report into, and a console implementation.

use std::io::Write;
use std::sync::Mutex;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostic::{Diagnostic, Severity};

/// Receives everything the executor lets through.
///
/// Checkers are handed an `ErrorLogger` for every unit they analyse; on the
/// worker side that logger is the executor's sink, which applies suppression
/// and de-duplication before forwarding to the outer logger the caller
/// supplied.
pub trait ErrorLogger: Sync {
    /// Plain program output, e.g. a checker's own status text.
    fn report_out(&self, text: &str);

    /// A finding of error grade.
    fn report_err(&self, diag: &Diagnostic);

    /// An informational finding.
    fn report_info(&self, diag: &Diagnostic);
}

/// Console logger: `report_out` to stdout, diagnostics to stderr with the
/// severity coloured.
pub struct TextLogger {
    verbose: bool,
    // termcolor streams are not internally synchronized for interleaved
    // writers; one lock covers both.
    streams: Mutex<(StandardStream, StandardStream)>,
}

impl TextLogger {
    pub fn new(color: ColorChoice, verbose: bool) -> Self {
        Self {
            verbose,
            streams: Mutex::new((
                StandardStream::stdout(color),
                StandardStream::stderr(color),
            )),
        }
    }

    fn severity_color(severity: Severity) -> Option<Color> {
        match severity {
            Severity::Error => Some(Color::Red),
            Severity::Warning => Some(Color::Yellow),
            Severity::Style | Severity::Performance | Severity::Portability => {
                Some(Color::Cyan)
            }
            Severity::Information | Severity::Debug => None,
        }
    }

    fn write_diag(&self, diag: &Diagnostic) {
        let mut guard = self.streams.lock().unwrap_or_else(|e| e.into_inner());
        let stderr = &mut guard.1;
        let mut spec = ColorSpec::new();
        spec.set_fg(Self::severity_color(diag.severity));
        let _ = stderr.set_color(&spec);
        let _ = writeln!(stderr, "{}", diag.to_text(self.verbose));
        let _ = stderr.reset();
    }
}

impl ErrorLogger for TextLogger {
    fn report_out(&self, text: &str) {
        let mut guard = self.streams.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(guard.0, "{text}");
    }

    fn report_err(&self, diag: &Diagnostic) {
        self.write_diag(diag);
    }

    fn report_info(&self, diag: &Diagnostic) {
        self.write_diag(diag);
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
