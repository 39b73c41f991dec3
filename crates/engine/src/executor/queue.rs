// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cursor over the two input sequences of a run.

use crate::check::{Batch, WorkUnit};

/// Hands out units one at a time: files first, then file-settings.
///
/// Not thread-safe on its own. The thread backend keeps it inside the
/// batch-state mutex; the process backend only draws from the parent.
pub(crate) struct WorkQueue {
    batch: Batch,
    next_file: usize,
    next_settings: usize,
    total_units: usize,
    total_bytes: u64,
}

impl WorkQueue {
    pub(crate) fn new(batch: Batch) -> Self {
        let total_units = batch.total_units();
        let total_bytes = batch.total_bytes();
        Self { batch, next_file: 0, next_settings: 0, total_units, total_bytes }
    }

    /// Units in the batch, fixed for the run.
    pub(crate) fn total_units(&self) -> usize {
        self.total_units
    }

    /// File bytes in the batch, fixed for the run.
    pub(crate) fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.next_file < self.batch.files.len()
            || self.next_settings < self.batch.file_settings.len()
    }

    /// Draw the next unit and advance. Each unit is handed out exactly once.
    pub(crate) fn take_next(&mut self) -> Option<WorkUnit> {
        if let Some(file) = self.batch.files.get(self.next_file) {
            self.next_file += 1;
            return Some(WorkUnit::File(file.clone()));
        }
        if let Some(fs) = self.batch.file_settings.get(self.next_settings) {
            self.next_settings += 1;
            return Some(WorkUnit::Settings(fs.clone()));
        }
        None
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
