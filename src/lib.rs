pub mod platform;
pub mod selection;
pub mod settings;
pub mod settings_watcher;
pub mod state_machine;
pub mod translation;
pub mod utils;

#[cfg(test)]
mod tests;

use selection::{MonitorError, MonitorService, SelectionPolicy};
use settings::Settings;
use settings_watcher::SettingsWatcher;
use translation::StdoutTranslationConsumer;

pub fn run() -> Result<(), MonitorError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| MonitorError::Runtime(format!("Failed to build tokio runtime: {}", e)))?;

    runtime.block_on(run_service())
}

async fn run_service() -> Result<(), MonitorError> {
    let settings_path = Settings::default_path();
    let settings = match &settings_path {
        Some(path) => Settings::load(path)?,
        None => {
            log::warn!("No config directory available, running with default settings");
            Settings::default()
        }
    };

    let capabilities = platform::desktop_capabilities(
        settings_path.clone(),
        Box::new(StdoutTranslationConsumer::stdout()),
    );
    let handle = MonitorService::spawn(capabilities, SelectionPolicy::default());

    if settings.text_selection_enabled {
        // A missing hook permission disables the feature, not the process
        if let Err(e) = handle.start_monitoring().await {
            log::error!("Text selection monitoring unavailable: {}", e);
        }
    } else {
        log::info!("Text selection monitoring disabled in settings");
    }

    let mut watcher = settings_path.map(|path| SettingsWatcher::new(path, handle.clone()));
    if let Some(watcher) = watcher.as_mut() {
        watcher.start(settings);
    }

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| MonitorError::Runtime(format!("Failed to wait for shutdown signal: {}", e)))?;

    log::info!("Shutting down selection monitor");
    drop(watcher);
    handle.shutdown().await
}
