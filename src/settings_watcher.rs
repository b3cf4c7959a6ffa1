use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::selection::{MonitorError, MonitorHandle};
use crate::settings::Settings;

pub const SETTINGS_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Push settings into a running monitor: ignore list first, then the
/// enabled toggle.
pub async fn apply_settings(handle: &MonitorHandle, settings: &Settings) -> Result<(), MonitorError> {
    handle.reload_ignore_config()?;
    handle.set_enabled(settings.text_selection_enabled).await
}

/// Polls the settings file and applies changes to the monitor.
pub struct SettingsWatcher {
    started: Arc<AtomicBool>,
    path: PathBuf,
    handle: MonitorHandle,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl SettingsWatcher {
    pub fn new(path: PathBuf, handle: MonitorHandle) -> Self {
        Self::with_interval(path, handle, SETTINGS_POLL_INTERVAL)
    }

    pub fn with_interval(path: PathBuf, handle: MonitorHandle, interval: Duration) -> Self {
        Self {
            started: Arc::new(AtomicBool::new(false)),
            path,
            handle,
            interval,
            task: None,
        }
    }

    /// `applied` is what the monitor already runs with; only changes
    /// relative to it are pushed. Must be called from within a tokio runtime.
    pub fn start(&mut self, applied: Settings) {
        if self.started.swap(true, Ordering::SeqCst) {
            log::debug!("SettingsWatcher already running, skipping start");
            return;
        }

        log::info!("Watching settings file {:?}", self.path);

        let started = self.started.clone();
        let path = self.path.clone();
        let handle = self.handle.clone();
        let period = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut last_applied = applied;
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;

            while started.load(Ordering::SeqCst) {
                ticker.tick().await;

                let current = match Settings::load(&path) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("Ignoring unreadable settings file: {}", e);
                        continue;
                    }
                };
                if current == last_applied {
                    continue;
                }

                log::info!(
                    "Settings changed (text selection enabled: {})",
                    current.text_selection_enabled
                );
                match apply_settings(&handle, &current).await {
                    Ok(()) => {}
                    Err(MonitorError::ServiceUnavailable) => {
                        log::debug!("Monitor service gone, stopping settings watcher");
                        break;
                    }
                    Err(e) => log::error!("Failed to apply settings: {}", e),
                }
                last_applied = current;
            }
        }));
    }

    pub fn stop(&mut self) {
        self.started.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SettingsWatcher {
    fn drop(&mut self) {
        self.stop();
        log::debug!("SettingsWatcher stopped");
    }
}
