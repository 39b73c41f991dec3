// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-pool backend: `jobs` long-lived workers over shared state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

use crate::check::{Batch, Checker, check_unit};
use crate::config::Settings;
use crate::executor::queue::WorkQueue;
use crate::executor::sink::{DiagnosticSink, lock};
use crate::executor::{Executor, fatal};
use crate::logger::ErrorLogger;
use crate::progress::ProgressReporter;

/// Everything the workers contend on: the unit cursor and the progress
/// counters, behind one mutex.
struct BatchState {
    queue: WorkQueue,
    processed_units: usize,
    processed_bytes: u64,
}

/// Spawns exactly `jobs` workers which loop pulling units until the queue
/// is empty, then sums their per-thread accumulators.
pub struct ThreadExecutor<'a> {
    batch: Batch,
    settings: &'a Settings,
    checker: &'a dyn Checker,
    logger: &'a dyn ErrorLogger,
    progress: &'a dyn ProgressReporter,
    contents: HashMap<PathBuf, String>,
}

impl<'a> ThreadExecutor<'a> {
    pub fn new(
        batch: Batch,
        settings: &'a Settings,
        checker: &'a dyn Checker,
        logger: &'a dyn ErrorLogger,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            batch,
            settings,
            checker,
            logger,
            progress,
            contents: HashMap::new(),
        }
    }
}

impl Executor for ThreadExecutor<'_> {
    fn add_file_content(&mut self, path: PathBuf, content: String) {
        self.contents.insert(path, content);
    }

    fn run(&mut self) -> u32 {
        let jobs = self.settings.effective_jobs();
        let quiet = self.settings.quiet;
        let sink = DiagnosticSink::new(self.settings, self.logger, self.progress);

        let queue = WorkQueue::new(std::mem::take(&mut self.batch));
        let total_units = queue.total_units();
        let total_bytes = queue.total_bytes();
        let state = Mutex::new(BatchState {
            queue,
            processed_units: 0,
            processed_bytes: 0,
        });

        let checker = self.checker;
        let contents = &self.contents;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(jobs);
            for index in 0..jobs {
                let builder = thread::Builder::new().name(format!("vetch-worker-{index}"));
                let sink = &sink;
                let state = &state;
                let spawned = builder.spawn_scoped(scope, move || {
                    worker_loop(state, sink, checker, contents, total_units, total_bytes, quiet)
                });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => fatal(format_args!("failed to spawn worker thread: {err}")),
                }
            }

            handles.into_iter().fold(0u32, |aggregate, handle| {
                match handle.join() {
                    Ok(code) => aggregate.wrapping_add(code),
                    Err(_) => fatal("worker thread panicked"),
                }
            })
        })
    }
}

/// One worker: draw a unit, run the checker, fold the code into the
/// per-thread accumulator, bump the shared counters, report progress.
fn worker_loop(
    state: &Mutex<BatchState>,
    sink: &DiagnosticSink<'_>,
    checker: &dyn Checker,
    contents: &HashMap<PathBuf, String>,
    total_units: usize,
    total_bytes: u64,
    quiet: bool,
) -> u32 {
    let mut accumulated: u32 = 0;

    loop {
        let unit = {
            let mut guard = lock(state);
            guard.queue.take_next()
        };
        let Some(unit) = unit else {
            return accumulated;
        };

        accumulated = accumulated.wrapping_add(check_unit(checker, &unit, contents, sink));

        // Counters under the state lock; the progress line afterwards under
        // the report lock. The two locks are never nested.
        let (processed_units, processed_bytes) = {
            let mut guard = lock(state);
            guard.processed_units += 1;
            guard.processed_bytes += unit.size();
            (guard.processed_units, guard.processed_bytes)
        };
        if !quiet {
            sink.report_status(processed_units, total_units, processed_bytes, total_bytes);
        }
    }
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod tests;
