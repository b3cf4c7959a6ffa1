use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to install global input hook: {0}")]
    HookInstall(String),
    #[error("clipboard access failed: {0}")]
    Clipboard(String),
    #[error("failed to synthesize copy keystroke: {0}")]
    SynthesizeCopy(String),
    #[error("popup surface error: {0}")]
    Popup(String),
    #[error("settings io error: {0}")]
    Settings(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    SettingsParse(#[from] serde_json::Error),
    #[error("selection monitor service is not running")]
    ServiceUnavailable,
    #[error("runtime error: {0}")]
    Runtime(String),
}
