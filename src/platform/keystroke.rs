use enigo::{
    Direction::{Click, Press, Release},
    Enigo, Key, Keyboard, Settings,
};

use crate::selection::{KeystrokeSynthesizer, MonitorError};

// Must agree with `selection::COPY_MODIFIER`, which the hook uses to spot
// the echo of this shortcut
#[cfg(target_os = "macos")]
const COPY_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const COPY_MODIFIER: Key = Key::Control;

/// Sends Ctrl+C (Cmd+C on macOS) to the focused window via `enigo`
#[derive(Debug, Default, Clone, Copy)]
pub struct EnigoKeystrokes;

impl KeystrokeSynthesizer for EnigoKeystrokes {
    fn send_copy(&mut self) -> Result<(), MonitorError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| MonitorError::SynthesizeCopy(format!("Failed to initialize Enigo: {:?}", e)))?;

        enigo
            .key(COPY_MODIFIER, Press)
            .map_err(|e| MonitorError::SynthesizeCopy(format!("Failed to press modifier: {:?}", e)))?;

        let clicked = enigo
            .key(Key::Unicode('c'), Click)
            .map_err(|e| MonitorError::SynthesizeCopy(format!("Failed to press C key: {:?}", e)));

        // Never leave the modifier stuck down
        let released = enigo
            .key(COPY_MODIFIER, Release)
            .map_err(|e| MonitorError::SynthesizeCopy(format!("Failed to release modifier: {:?}", e)));

        clicked.and(released)
    }
}
