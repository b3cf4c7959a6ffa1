use tokio::sync::oneshot;

use super::desktop::DesktopReply;
use super::error::MonitorError;
use super::geometry::Point;
use crate::state_machine::MonitorPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

/// The keys the monitor cares about; everything else is `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ControlLeft,
    ControlRight,
    ShiftLeft,
    ShiftRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,
    Tab,
    Escape,
    C,
    Other,
}

impl KeyCode {
    pub fn is_ctrl(self) -> bool {
        matches!(self, KeyCode::ControlLeft | KeyCode::ControlRight)
    }

    pub fn is_meta(self) -> bool {
        matches!(self, KeyCode::MetaLeft | KeyCode::MetaRight)
    }

    /// Either side of the modifier the platform copy shortcut uses
    pub fn is_copy_modifier(self) -> bool {
        if cfg!(target_os = "macos") {
            self.is_meta()
        } else {
            self.is_ctrl()
        }
    }
}

/// Modifier of the synthesized copy shortcut: Cmd on macOS, Ctrl elsewhere
#[cfg(target_os = "macos")]
pub const COPY_MODIFIER: KeyCode = KeyCode::MetaLeft;
#[cfg(not(target_os = "macos"))]
pub const COPY_MODIFIER: KeyCode = KeyCode::ControlLeft;

/// Modifier keys held when a key event was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::NONE
        }
    }
}

/// A global input event as delivered by the OS hook
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseDown { button: MouseButton, position: Point },
    MouseUp { button: MouseButton, position: Point },
    KeyDown { key: KeyCode, modifiers: Modifiers },
    KeyUp { key: KeyCode, modifiers: Modifiers },
}

/// Window-switch combinations and the explicit cancel key dismiss the popup:
/// Alt+Tab, Ctrl+Tab, either Windows/Meta key, Escape.
pub fn is_dismiss_key(key: KeyCode, modifiers: Modifiers) -> bool {
    let alt_tab = modifiers.alt && key == KeyCode::Tab;
    let ctrl_tab = modifiers.ctrl && key == KeyCode::Tab;
    alt_tab || ctrl_tab || key.is_meta() || key == KeyCode::Escape
}

/// Ctrl+Shift+C: show the popup for whatever is already on the clipboard
pub fn is_show_popup_shortcut(key: KeyCode, modifiers: Modifiers) -> bool {
    key == KeyCode::C && modifiers.ctrl && modifiers.shift && !modifiers.alt
}

/// Requests sent to the monitor's event loop through `MonitorHandle`
#[derive(Debug)]
pub enum MonitorCommand {
    Start(oneshot::Sender<Result<(), MonitorError>>),
    Stop(oneshot::Sender<()>),
    ShowPopupAtCursor,
    HidePopup,
    Pause,
    Resume,
    ReloadIgnoreConfig,
    Phase(oneshot::Sender<MonitorPhase>),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Everything the event loop reacts to, apart from its own timers
#[derive(Debug)]
pub enum MonitorEvent {
    Input(InputEvent),
    PopupClicked,
    Command(MonitorCommand),
    Desktop(DesktopReply),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_switch_keys_dismiss() {
        assert!(is_dismiss_key(KeyCode::Tab, Modifiers::alt()));
        assert!(is_dismiss_key(KeyCode::Tab, Modifiers::ctrl()));
        assert!(is_dismiss_key(KeyCode::MetaLeft, Modifiers::NONE));
        assert!(is_dismiss_key(KeyCode::MetaRight, Modifiers::NONE));
        assert!(is_dismiss_key(KeyCode::Escape, Modifiers::NONE));
    }

    #[test]
    fn test_plain_keys_do_not_dismiss() {
        assert!(!is_dismiss_key(KeyCode::Tab, Modifiers::NONE));
        assert!(!is_dismiss_key(KeyCode::C, Modifiers::ctrl()));
        assert!(!is_dismiss_key(KeyCode::ShiftLeft, Modifiers::NONE));
        assert!(!is_dismiss_key(KeyCode::Other, Modifiers::alt()));
    }

    #[test]
    fn test_copy_modifier_matches_platform() {
        assert!(COPY_MODIFIER.is_copy_modifier());
        assert!(!KeyCode::C.is_copy_modifier());
        assert!(!KeyCode::ShiftLeft.is_copy_modifier());

        #[cfg(target_os = "macos")]
        {
            assert!(KeyCode::MetaRight.is_copy_modifier());
            assert!(!KeyCode::ControlLeft.is_copy_modifier());
        }
        #[cfg(not(target_os = "macos"))]
        {
            assert!(KeyCode::ControlRight.is_copy_modifier());
            assert!(!KeyCode::MetaLeft.is_copy_modifier());
        }
    }

    #[test]
    fn test_show_popup_shortcut() {
        assert!(is_show_popup_shortcut(KeyCode::C, Modifiers::ctrl_shift()));
        assert!(!is_show_popup_shortcut(KeyCode::C, Modifiers::ctrl()));
        assert!(!is_show_popup_shortcut(KeyCode::Tab, Modifiers::ctrl_shift()));
    }
}
