use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, oneshot};

use super::capabilities::{Capabilities, InputSink};
use super::config::SelectionPolicy;
use super::error::MonitorError;
use super::events::{MonitorCommand, MonitorEvent};
use super::monitor::{SelectionMonitor, SelectionTimer};
use super::timers::{NamedTimers, TimerFired};
use crate::state_machine::MonitorPhase;
use crate::utils::logger::{log_operation_complete, log_operation_failed, log_operation_start};

/// Runs a `SelectionMonitor` on its own tokio task
pub struct MonitorService;

impl MonitorService {
    /// Must be called from within a tokio runtime.
    pub fn spawn(caps: Capabilities, policy: SelectionPolicy) -> MonitorHandle {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let monitoring = Arc::new(AtomicBool::new(false));

        let monitor = SelectionMonitor::new(caps, policy, &event_tx, NamedTimers::new(timer_tx));

        tokio::spawn(run_loop(monitor, event_rx, timer_rx, monitoring.clone()));

        MonitorHandle {
            tx: event_tx,
            monitoring,
        }
    }
}

async fn run_loop(
    mut monitor: SelectionMonitor,
    mut events: mpsc::UnboundedReceiver<MonitorEvent>,
    mut timers: mpsc::UnboundedReceiver<TimerFired<SelectionTimer>>,
    monitoring: Arc<AtomicBool>,
) {
    log::debug!("Selection monitor loop started");

    loop {
        tokio::select! {
            biased;

            event = events.recv() => {
                let Some(event) = event else {
                    log::info!("Every monitor handle dropped, stopping");
                    monitor.stop();
                    break;
                };

                match event {
                    MonitorEvent::Input(input) => monitor.handle_input(input),
                    MonitorEvent::PopupClicked => monitor.popup_clicked(),
                    MonitorEvent::Desktop(reply) => monitor.handle_desktop(reply),
                    MonitorEvent::Command(command) => {
                        if !handle_command(&mut monitor, command, &monitoring) {
                            break;
                        }
                    }
                }
            }
            Some(fired) = timers.recv() => monitor.handle_timer(fired),
        }

        monitoring.store(monitor.is_enabled(), Ordering::SeqCst);
    }

    monitoring.store(false, Ordering::SeqCst);
    log::debug!("Selection monitor loop exited");
}

/// Runs `f` with `block_in_place` on a multi-thread runtime so the other
/// tasks on this worker move elsewhere. Current-thread runtimes run it inline.
fn off_worker_thread<T>(f: impl FnOnce() -> T) -> T {
    match Handle::current().runtime_flavor() {
        RuntimeFlavor::MultiThread => tokio::task::block_in_place(f),
        _ => f(),
    }
}

/// Returns false when the loop should exit
fn handle_command(
    monitor: &mut SelectionMonitor,
    command: MonitorCommand,
    monitoring: &AtomicBool,
) -> bool {
    match command {
        MonitorCommand::Start(reply) => {
            let started_at = Instant::now();
            log_operation_start("SELECTION_MONITOR_START", &HashMap::new());

            // The first hook install waits for the OS listener to come up
            let result = off_worker_thread(|| monitor.start());
            match &result {
                Ok(()) => log_operation_complete(
                    "SELECTION_MONITOR_START",
                    started_at.elapsed().as_millis() as u64,
                    &HashMap::new(),
                ),
                Err(e) => log_operation_failed("SELECTION_MONITOR_START", &e.to_string(), &HashMap::new()),
            }

            monitoring.store(monitor.is_enabled(), Ordering::SeqCst);
            let _ = reply.send(result);
        }
        MonitorCommand::Stop(reply) => {
            let was_running = monitor.is_enabled();
            monitor.stop();
            if was_running {
                log::info!("🛑 Selection monitor stopped");
            }

            monitoring.store(false, Ordering::SeqCst);
            let _ = reply.send(());
        }
        MonitorCommand::ShowPopupAtCursor => monitor.show_popup_at_cursor(),
        MonitorCommand::HidePopup => monitor.hide_popup(),
        MonitorCommand::Pause => monitor.pause(),
        MonitorCommand::Resume => monitor.resume(),
        MonitorCommand::ReloadIgnoreConfig => monitor.reload_ignore_config(),
        MonitorCommand::Phase(reply) => {
            let _ = reply.send(monitor.phase());
        }
        MonitorCommand::Flush(reply) => monitor.flush_desktop(reply),
        MonitorCommand::Shutdown(reply) => {
            monitor.stop();
            monitoring.store(false, Ordering::SeqCst);
            // Answered after the clipboard restore queued by stop has run
            monitor.flush_desktop(reply);
            return false;
        }
    }
    true
}

/// Cloneable control handle for a running `MonitorService`. Dropping the
/// last one stops monitoring and ends the service task.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    tx: mpsc::UnboundedSender<MonitorEvent>,
    monitoring: Arc<AtomicBool>,
}

impl MonitorHandle {
    fn send(&self, command: MonitorCommand) -> Result<(), MonitorError> {
        self.tx
            .send(MonitorEvent::Command(command))
            .map_err(|_| MonitorError::ServiceUnavailable)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> MonitorCommand,
    ) -> Result<T, MonitorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx))?;
        reply_rx.await.map_err(|_| MonitorError::ServiceUnavailable)
    }

    /// Install hooks and begin watching for selections. Idempotent.
    pub async fn start_monitoring(&self) -> Result<(), MonitorError> {
        self.request(MonitorCommand::Start).await?
    }

    /// Resolves once hooks are uninstalled and every timer is cancelled
    pub async fn stop_monitoring(&self) -> Result<(), MonitorError> {
        self.request(MonitorCommand::Stop).await
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), MonitorError> {
        if enabled {
            self.start_monitoring().await
        } else {
            self.stop_monitoring().await
        }
    }

    pub fn popup_clicked(&self) -> Result<(), MonitorError> {
        self.tx
            .send(MonitorEvent::PopupClicked)
            .map_err(|_| MonitorError::ServiceUnavailable)
    }

    pub fn show_popup_at_cursor(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::ShowPopupAtCursor)
    }

    pub fn hide_popup(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::HidePopup)
    }

    pub fn pause(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::Pause)
    }

    pub fn resume(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::Resume)
    }

    pub fn reload_ignore_config(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::ReloadIgnoreConfig)
    }

    pub async fn phase(&self) -> Result<MonitorPhase, MonitorError> {
        self.request(MonitorCommand::Phase).await
    }

    /// Resolves once every clipboard, keystroke and ignore-list call queued
    /// so far has run
    pub async fn flush(&self) -> Result<(), MonitorError> {
        self.request(MonitorCommand::Flush).await
    }

    /// Stop monitoring and end the service task
    pub async fn shutdown(&self) -> Result<(), MonitorError> {
        self.request(MonitorCommand::Shutdown).await
    }

    /// Sink feeding the same loop as the OS hook
    pub fn input_sink(&self) -> InputSink {
        InputSink::new(&self.tx)
    }
}
