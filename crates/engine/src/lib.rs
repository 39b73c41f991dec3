// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Analysis engine for vetch.
//!
//! This crate drives the checking phase across a batch of work units: it
//! runs up to `jobs` concurrent analyses, streams their diagnostics back to
//! a single logger with global de-duplication and suppression, throttles new
//! work on system load, and returns the unsigned sum of per-unit result
//! codes.
//!
//! The actual per-file analysis is performed by a [`Checker`] supplied by
//! the caller; diagnostics flow back through the [`ErrorLogger`] interface.
//! Two backends implement the same [`executor::Executor`] contract: a
//! process-per-unit backend (unix) that forwards diagnostics over pipes with
//! a small framing protocol, and a thread-pool backend over shared state.

pub mod check;
pub mod config;
pub mod diagnostic;
pub mod executor;
pub mod logger;
pub mod progress;

#[cfg(test)]
pub(crate) mod test_utils;

pub use check::{Batch, Checker, FileSettings, SourceFile};
pub use config::{Settings, suppress::SuppressionRule};
pub use diagnostic::{Diagnostic, Severity, SourceLocation};
pub use executor::{Backend, Executor, build_executor};
pub use logger::{ErrorLogger, TextLogger};
pub use progress::{ConsoleProgress, ProgressReporter, SilentProgress};
