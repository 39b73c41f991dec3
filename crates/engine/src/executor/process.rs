// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-per-unit backend.
//!
//! The parent stays single-threaded: it forks one child per unit, drains
//! framed diagnostics from the children's pipes with a 1-second poll, and
//! reaps exits. A child analyses exactly one unit, writes an `End` frame
//! with its result code, and leaves without touching parent state. The
//! 1-second poll timeout doubles as the load-average re-sampling cadence,
//! so load relief promptly unblocks new spawns.

// fork and _exit require raw descriptor handling.
#![allow(unsafe_code)]

use std::collections::HashMap;
use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::path::PathBuf;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork, pipe};

use crate::check::{Batch, Checker, WorkUnit, check_unit};
use crate::config::Settings;
use crate::diagnostic::{Diagnostic, Severity, SourceLocation};
use crate::executor::frame::{self, Frame, FrameTag};
use crate::executor::governor::LoadGovernor;
use crate::executor::queue::WorkQueue;
use crate::executor::sink::DiagnosticSink;
use crate::executor::{Executor, fatal};
use crate::logger::ErrorLogger;
use crate::progress::ProgressReporter;

/// Read end of one live child's pipe, in spawn order.
struct PipeEntry {
    file: File,
    label: String,
    size: u64,
}

/// Forks one child per unit and aggregates their result codes.
pub struct ProcessExecutor<'a> {
    batch: Batch,
    settings: &'a Settings,
    checker: &'a dyn Checker,
    logger: &'a dyn ErrorLogger,
    progress: &'a dyn ProgressReporter,
    contents: HashMap<PathBuf, String>,
}

impl<'a> ProcessExecutor<'a> {
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

    fn spawn_worker(
        &self,
        unit: WorkUnit,
        pipes: &mut Vec<PipeEntry>,
        children: &mut HashMap<i32, String>,
    ) {
        let (read_end, write_end) = match pipe() {
            Ok(ends) => ends,
            Err(err) => fatal(format_args!("pipe() failed: {err}")),
        };
        if let Err(err) = set_nonblocking(&read_end) {
            fatal(format_args!("fcntl(O_NONBLOCK) failed: {err}"));
        }

        // SAFETY: the child never returns into this call; it runs one unit
        // against its copy-on-write view of the batch and leaves via _exit.
        match unsafe { fork() } {
            Err(err) => fatal(format_args!("failed to create child process: {err}")),
            Ok(ForkResult::Child) => {
                drop(read_end);
                let pipe = File::from(write_end);
                run_child(&unit, self.checker, &self.contents, &pipe);
            }
            Ok(ForkResult::Parent { child }) => {
                drop(write_end);
                let label = unit.label();
                tracing::debug!(pid = child.as_raw(), unit = %label, "spawned worker");
                children.insert(child.as_raw(), label.clone());
                pipes.push(PipeEntry {
                    file: File::from(read_end),
                    label,
                    size: unit.size(),
                });
            }
        }
    }

    fn run_unix(&mut self) -> u32 {
        let jobs = self.settings.effective_jobs();
        let governor = LoadGovernor::new(jobs, self.settings.load_average);
        let sink = DiagnosticSink::new(self.settings, self.logger, self.progress);

        let mut queue = WorkQueue::new(std::mem::take(&mut self.batch));
        let total_units = queue.total_units();
        let total_bytes = queue.total_bytes();

        let mut pipes: Vec<PipeEntry> = Vec::new();
        let mut children: HashMap<i32, String> = HashMap::new();
        let mut aggregate: u32 = 0;
        let mut processed_units: usize = 0;
        let mut processed_bytes: u64 = 0;

        loop {
            if queue.has_remaining() && governor.may_start(pipes.len()) {
                let Some(unit) = queue.take_next() else {
                    unreachable!("queue reported units remaining");
                };
                self.spawn_worker(unit, &mut pipes, &mut children);
            } else if !pipes.is_empty() {
                // Wait up to a second for any pipe, then decode at most one
                // frame per ready descriptor.
                let ready = poll_pipes(&pipes);
                let mut completed: Vec<usize> = Vec::new();

                for (index, entry) in pipes.iter().enumerate() {
                    if !ready[index] {
                        continue;
                    }
                    match frame::read_frame(&entry.file) {
                        Ok(Frame::NotReady) => {}
                        Ok(Frame::Out(text)) => sink.report_out(&text),
                        Ok(Frame::Err(payload)) => match Diagnostic::deserialize(&payload) {
                            Ok(diag) => sink.report_err(&diag),
                            Err(err) => fatal(format_args!(
                                "undecodable diagnostic from worker {}: {err}",
                                entry.label
                            )),
                        },
                        Ok(Frame::Info(payload)) => match Diagnostic::deserialize(&payload) {
                            Ok(diag) => sink.report_info(&diag),
                            Err(err) => fatal(format_args!(
                                "undecodable diagnostic from worker {}: {err}",
                                entry.label
                            )),
                        },
                        Ok(Frame::End(payload)) => {
                            let code: u32 = match payload.trim().parse() {
                                Ok(code) => code,
                                Err(_) => fatal(format_args!(
                                    "bad result code {payload:?} from worker {}",
                                    entry.label
                                )),
                            };
                            aggregate = aggregate.wrapping_add(code);
                            completed.push(index);
                        }
                        Ok(Frame::Closed) => completed.push(index),
                        Err(err) => fatal(format_args!(
                            "framing error on pipe from worker {}: {err}",
                            entry.label
                        )),
                    }
                }

                // Close finished pipes highest-index-first, then account
                // them in spawn order.
                let mut finished: Vec<PipeEntry> = Vec::with_capacity(completed.len());
                for index in completed.into_iter().rev() {
                    finished.push(pipes.remove(index));
                }
                finished.reverse();
                for entry in finished {
                    processed_units += 1;
                    processed_bytes += entry.size;
                    tracing::debug!(unit = %entry.label, "worker finished");
                    if !self.settings.quiet {
                        sink.report_status(
                            processed_units,
                            total_units,
                            processed_bytes,
                            total_bytes,
                        );
                    }
                }

                reap_children(&mut children, &sink);
            } else {
                break;
            }
        }

        aggregate
    }
}

impl Executor for ProcessExecutor<'_> {
    fn add_file_content(&mut self, path: PathBuf, content: String) {
        self.contents.insert(path, content);
    }

    fn run(&mut self) -> u32 {
        self.run_unix()
    }
}

/// Child side: run one unit, send the result, leave.
fn run_child(
    unit: &WorkUnit,
    checker: &dyn Checker,
    contents: &HashMap<PathBuf, String>,
    pipe: &File,
) -> ! {
    let logger = PipeLogger { pipe };
    let code = check_unit(checker, unit, contents, &logger);
    if let Err(err) = frame::write_frame(pipe, FrameTag::End, &code.to_string()) {
        eprintln!("vetch: failed to write result to pipe: {err}");
        // SAFETY: _exit only terminates the process.
        unsafe { libc::_exit(1) }
    }
    // _exit instead of exit: the atexit handlers and buffered stdio this
    // child inherited belong to the parent.
    // SAFETY: as above.
    unsafe { libc::_exit(0) }
}

/// The logger handed to a child's checker: every report becomes one frame.
/// Suppression and de-duplication happen in the parent; the child forwards
/// everything.
struct PipeLogger<'a> {
    pipe: &'a File,
}

impl PipeLogger<'_> {
    fn send(&self, tag: FrameTag, payload: &str) {
        if let Err(err) = frame::write_frame(self.pipe, tag, payload) {
            eprintln!("vetch: failed to write diagnostic to pipe: {err}");
            // SAFETY: _exit only terminates the process.
            unsafe { libc::_exit(1) }
        }
    }
}

impl ErrorLogger for PipeLogger<'_> {
    fn report_out(&self, text: &str) {
        self.send(FrameTag::Out, text);
    }

    fn report_err(&self, diag: &Diagnostic) {
        self.send(FrameTag::Err, &diag.serialize());
    }

    fn report_info(&self, diag: &Diagnostic) {
        self.send(FrameTag::Info, &diag.serialize());
    }
}

/// Poll all read pipes for up to a second; returns one readiness flag per
/// entry. An interrupted poll reads as "nothing ready".
fn poll_pipes(pipes: &[PipeEntry]) -> Vec<bool> {
    let mut poll_fds: Vec<PollFd<'_>> = pipes
        .iter()
        .map(|entry| PollFd::new(entry.file.as_fd(), PollFlags::POLLIN))
        .collect();

    match poll(&mut poll_fds, PollTimeout::from(1000u16)) {
        Ok(_) => {}
        Err(Errno::EINTR) => return vec![false; pipes.len()],
        Err(err) => fatal(format_args!("poll failed: {err}")),
    }

    poll_fds
        .iter()
        .map(|fd| fd.revents().is_some_and(|revents| !revents.is_empty()))
        .collect()
}

/// Collect every child the kernel will hand back without blocking. A child
/// that died from a signal becomes one synthetic error diagnostic routed
/// through the sink, so suppression and de-duplication still apply.
fn reap_children(children: &mut HashMap<i32, String>, sink: &DiagnosticSink<'_>) {
    loop {
        match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                let signo = signal as i32;
                let label = children.remove(&pid.as_raw()).unwrap_or_default();
                tracing::debug!(pid = pid.as_raw(), signal = signo, unit = %label, "child crashed");
                sink.report_err(&crash_diagnostic(&label, signo));
            }
            Ok(WaitStatus::Exited(pid, _)) => {
                children.remove(&pid.as_raw());
            }
            // StillAlive, or nothing left to reap.
            Ok(_) | Err(_) => break,
        }
    }
}

fn crash_diagnostic(label: &str, signal: i32) -> Diagnostic {
    let text = format!("Internal error: Child process crashed with signal {signal}");
    Diagnostic::new(
        vec![SourceLocation::new(label, 0)],
        text.clone(),
        Severity::Error,
        text,
        "internalError",
        false,
    )
}

fn set_nonblocking(fd: &OwnedFd) -> std::io::Result<()> {
    // SAFETY: fd is a valid descriptor owned by the caller.
    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: as above.
    if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}
