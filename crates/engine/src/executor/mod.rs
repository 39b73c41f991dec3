// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The parallel analysis executor.
//!
//! One contract, three implementations: [`process::ProcessExecutor`] runs
//! one child process per unit and drains framed diagnostics from pipes
//! (unix only), [`thread::ThreadExecutor`] runs `jobs` long-lived workers
//! over shared state, and [`NullExecutor`] is the degenerate backend for
//! configurations with neither.

use std::fmt;
use std::path::PathBuf;

use crate::check::{Batch, Checker};
use crate::config::Settings;
use crate::logger::ErrorLogger;
use crate::progress::ProgressReporter;

mod frame;
mod governor;
mod queue;
mod sink;

#[cfg(unix)]
pub mod process;
pub mod thread;

/// Runs a batch to completion.
pub trait Executor {
    /// Register in-memory content standing in for `path`. Only meaningful
    /// before [`run`](Executor::run); the map is frozen once the run starts.
    fn add_file_content(&mut self, path: PathBuf, content: String);

    /// Dispatch every unit and return the sum of the per-unit result codes.
    ///
    /// Consumes the batch: a second call finds an empty queue and returns 0.
    fn run(&mut self) -> u32;
}

/// Which executor implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// One child process per unit, diagnostics over pipes.
    #[cfg(unix)]
    Process,
    /// `jobs` long-lived threads over shared state.
    Thread,
    /// Does nothing and returns 0.
    Null,
}

impl Default for Backend {
    fn default() -> Self {
        #[cfg(unix)]
        {
            Backend::Process
        }
        #[cfg(not(unix))]
        {
            Backend::Thread
        }
    }
}

/// Build the chosen backend over the caller's collaborators.
///
/// The logger and progress reporter must outlive the executor; both are
/// invoked from the run until it returns.
pub fn build_executor<'a>(
    backend: Backend,
    batch: Batch,
    settings: &'a Settings,
    checker: &'a dyn Checker,
    logger: &'a dyn ErrorLogger,
    progress: &'a dyn ProgressReporter,
) -> Box<dyn Executor + 'a> {
    match backend {
        #[cfg(unix)]
        Backend::Process => Box::new(process::ProcessExecutor::new(
            batch, settings, checker, logger, progress,
        )),
        Backend::Thread => Box::new(thread::ThreadExecutor::new(
            batch, settings, checker, logger, progress,
        )),
        Backend::Null => Box::new(NullExecutor),
    }
}

/// Backend for configurations without processes or threads.
pub struct NullExecutor;

impl Executor for NullExecutor {
    fn add_file_content(&mut self, _path: PathBuf, _content: String) {}

    fn run(&mut self) -> u32 {
        0
    }
}

/// Abort the batch. Resource-allocation and framing failures have no
/// recovery path; the contract is a message on stderr and a non-zero exit.
pub(crate) fn fatal(message: impl fmt::Display) -> ! {
    eprintln!("vetch: {message}");
    std::process::exit(1);
}
