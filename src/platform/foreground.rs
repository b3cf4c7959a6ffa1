use std::path::PathBuf;

use crate::selection::SelectionGate;
use crate::settings::{IgnoreConfig, Settings};

/// Name of the application owning the focused window
#[cfg_attr(test, mockall::automock)]
pub trait ForegroundApp: Send {
    fn app_name(&self) -> Option<String>;
}

/// Foreground lookup through `active-win-pos-rs`
#[derive(Debug, Default, Clone, Copy)]
pub struct ActiveWindowProbe;

impl ForegroundApp for ActiveWindowProbe {
    fn app_name(&self) -> Option<String> {
        match active_win_pos_rs::get_active_window() {
            Ok(win) => Some(win.app_name),
            Err(_) => None,
        }
    }
}

/// Blocks synthesized copies while an ignored application is focused
pub struct IgnoreListGate<P: ForegroundApp> {
    settings_path: Option<PathBuf>,
    config: IgnoreConfig,
    probe: P,
}

impl<P: ForegroundApp> IgnoreListGate<P> {
    pub fn new(settings_path: Option<PathBuf>, probe: P) -> Self {
        Self {
            settings_path,
            config: IgnoreConfig::default(),
            probe,
        }
    }

    pub fn with_config(config: IgnoreConfig, probe: P) -> Self {
        Self {
            settings_path: None,
            config,
            probe,
        }
    }

    pub fn config(&self) -> &IgnoreConfig {
        &self.config
    }
}

impl<P: ForegroundApp> SelectionGate for IgnoreListGate<P> {
    fn allows_capture(&mut self) -> bool {
        if !self.config.enabled || self.config.ignored_applications.is_empty() {
            return true;
        }

        match self.probe.app_name() {
            Some(name) if self.config.should_ignore(&name) => {
                log::debug!("Foreground app '{}' is on the ignore list", name);
                false
            }
            Some(_) => true,
            // Unknown foreground app: behave as if nothing is ignored
            None => true,
        }
    }

    fn reload(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };

        match Settings::load(path) {
            Ok(settings) => {
                log::info!(
                    "Ignore list loaded: {} applications (enabled: {})",
                    settings.ignore.ignored_applications.len(),
                    settings.ignore.enabled
                );
                self.config = settings.ignore;
            }
            Err(e) => log::warn!("Keeping previous ignore list, reload failed: {}", e),
        }
    }
}
