use arboard::Clipboard;

use crate::selection::{ClipboardAccess, MonitorError};

fn open() -> Result<Clipboard, MonitorError> {
    Clipboard::new().map_err(|e| MonitorError::Clipboard(format!("Failed to initialize clipboard: {}", e)))
}

/// System clipboard through `arboard`, opened fresh for every call
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl ClipboardAccess for ArboardClipboard {
    fn read_text(&mut self) -> Result<Option<String>, MonitorError> {
        let mut clipboard = open()?;
        match clipboard.get_text() {
            Ok(text) if text.is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            // Empty clipboard or non-text content
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(MonitorError::Clipboard(format!("Failed to read clipboard: {}", e))),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), MonitorError> {
        open()?
            .set_text(text)
            .map_err(|e| MonitorError::Clipboard(format!("Failed to set clipboard: {}", e)))
    }

    fn clear(&mut self) -> Result<(), MonitorError> {
        open()?
            .clear()
            .map_err(|e| MonitorError::Clipboard(format!("Failed to clear clipboard: {}", e)))
    }
}
