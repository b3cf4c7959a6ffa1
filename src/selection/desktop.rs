//! Clipboard, keystroke and foreground-application calls, run off the event
//! loop.
//!
//! `arboard`, `enigo` and the foreground probe all talk to the OS
//! synchronously and can stall (X11 hands clipboard ownership over on drop,
//! accessibility queries wait on the window server). The monitor queues that
//! work here instead. One task drains the queue in order and runs each job on
//! tokio's blocking pool; answers come back to the event loop as
//! [`MonitorEvent::Desktop`].

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};

use super::capabilities::{ClipboardAccess, KeystrokeSynthesizer, SelectionGate};
use super::error::MonitorError;
use super::events::MonitorEvent;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Work the monitor hands to the desktop worker
#[derive(Debug)]
pub enum DesktopJob {
    /// Record what the clipboard holds when monitoring starts
    ReadBaseline,
    /// Ignore-list check, baseline read, clear, copy shortcut
    Copy { cycle: u64 },
    /// Read what the copy shortcut put on the clipboard
    ReadSelection { cycle: u64 },
    ReadForShow,
    Restore(String),
    Clear,
    ReloadGate,
    /// Answered once every job queued before it has run
    Flush(oneshot::Sender<()>),
}

#[derive(Debug)]
pub enum CopyOutcome {
    /// Clipboard cleared and the shortcut sent; `baseline` is what it held before
    Sent { baseline: String },
    /// The focused application is on the ignore list; nothing was touched
    Ignored,
}

/// Results delivered back to the event loop
#[derive(Debug)]
pub enum DesktopReply {
    Baseline(Option<String>),
    CopyIssued {
        cycle: u64,
        result: Result<CopyOutcome, MonitorError>,
    },
    SelectionRead {
        cycle: u64,
        result: Result<Option<String>, MonitorError>,
    },
    ClipboardForShow(Result<Option<String>, MonitorError>),
}

/// The capabilities that block, owned by the worker
pub struct DesktopIo {
    pub clipboard: Box<dyn ClipboardAccess>,
    pub keystrokes: Box<dyn KeystrokeSynthesizer>,
    pub gate: Box<dyn SelectionGate>,
}

impl DesktopIo {
    fn run(&mut self, job: DesktopJob) -> Option<DesktopReply> {
        match job {
            DesktopJob::ReadBaseline => {
                let baseline = match self.clipboard.read_text() {
                    Ok(text) => text,
                    Err(e) => {
                        log::debug!("Could not read clipboard baseline: {}", e);
                        None
                    }
                };
                Some(DesktopReply::Baseline(baseline))
            }
            DesktopJob::Copy { cycle } => Some(DesktopReply::CopyIssued {
                cycle,
                result: self.copy_selection(),
            }),
            DesktopJob::ReadSelection { cycle } => Some(DesktopReply::SelectionRead {
                cycle,
                result: self.clipboard.read_text(),
            }),
            DesktopJob::ReadForShow => Some(DesktopReply::ClipboardForShow(self.clipboard.read_text())),
            DesktopJob::Restore(text) => {
                self.restore(&text);
                None
            }
            DesktopJob::Clear => {
                if let Err(e) = self.clipboard.clear() {
                    log::debug!("Could not clear clipboard on dismiss: {}", e);
                }
                None
            }
            DesktopJob::ReloadGate => {
                self.gate.reload();
                None
            }
            DesktopJob::Flush(done) => {
                let _ = done.send(());
                None
            }
        }
    }

    fn copy_selection(&mut self) -> Result<CopyOutcome, MonitorError> {
        if !self.gate.allows_capture() {
            return Ok(CopyOutcome::Ignored);
        }

        let baseline = self.clipboard.read_text()?.unwrap_or_default();
        self.clipboard.clear()?;

        if let Err(e) = self.keystrokes.send_copy() {
            self.restore(&baseline);
            return Err(e);
        }

        Ok(CopyOutcome::Sent { baseline })
    }

    fn restore(&mut self, baseline: &str) {
        if baseline.is_empty() {
            return;
        }
        if let Err(e) = self.clipboard.write_text(baseline) {
            log::debug!("Could not restore clipboard baseline: {}", e);
        }
    }
}

/// Queue feeding the desktop task. Dropping it lets the task drain what is
/// already queued and exit.
pub struct DesktopWorker {
    jobs: mpsc::UnboundedSender<DesktopJob>,
}

impl DesktopWorker {
    /// Must be called from within a tokio runtime. `replies` is weak so the
    /// worker never keeps the event loop alive.
    pub fn spawn(io: DesktopIo, replies: mpsc::WeakUnboundedSender<MonitorEvent>) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(Arc::new(Mutex::new(io)), jobs_rx, replies));
        Self { jobs: jobs_tx }
    }

    pub fn submit(&self, job: DesktopJob) {
        if let Err(e) = self.jobs.send(job) {
            log::warn!("Desktop worker gone, dropping {:?}", e.0);
        }
    }
}

async fn run_worker(
    io: Arc<Mutex<DesktopIo>>,
    mut jobs: mpsc::UnboundedReceiver<DesktopJob>,
    replies: mpsc::WeakUnboundedSender<MonitorEvent>,
) {
    while let Some(job) = jobs.recv().await {
        let io = io.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut desktop = lock(&io);
            desktop.run(job)
        })
        .await;

        let reply = match result {
            Ok(Some(reply)) => reply,
            Ok(None) => continue,
            Err(e) => {
                log::error!("Desktop job failed to complete: {}", e);
                continue;
            }
        };

        match replies.upgrade() {
            Some(tx) => {
                let _ = tx.send(MonitorEvent::Desktop(reply));
            }
            None => log::debug!("Event loop gone, dropping {:?}", reply),
        }
    }

    log::debug!("Desktop worker exited");
}
