//! OS-facing seams of the selection monitor.
//!
//! The monitor only talks to the outside world through these traits so that
//! the state machine stays platform independent. `crate::platform` provides
//! the real implementations; tests inject fakes.

use tokio::sync::mpsc;

use super::error::MonitorError;
use super::events::{InputEvent, MonitorEvent};
use super::geometry::{Point, Rect};

/// Where hook callbacks push their events. Cheap to clone, safe to use from
/// any thread.
///
/// Holds a weak sender: an installed hook never keeps the event loop alive
/// once every `MonitorHandle` is gone.
#[derive(Debug, Clone)]
pub struct InputSink {
    tx: mpsc::WeakUnboundedSender<MonitorEvent>,
}

impl InputSink {
    pub(crate) fn new(tx: &mpsc::UnboundedSender<MonitorEvent>) -> Self {
        Self { tx: tx.downgrade() }
    }

    fn push(&self, event: MonitorEvent) -> bool {
        match self.tx.upgrade() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Returns false once the monitor loop has gone away
    pub fn send(&self, event: InputEvent) -> bool {
        self.push(MonitorEvent::Input(event))
    }

    /// Report a click on the popup's action button
    pub fn popup_clicked(&self) -> bool {
        self.push(MonitorEvent::PopupClicked)
    }
}

/// Global mouse/keyboard hook
pub trait GlobalInputSource: Send {
    fn install(&mut self, sink: InputSink) -> Result<(), MonitorError>;
    fn uninstall(&mut self);
}

pub trait ClipboardAccess: Send {
    /// `Ok(None)` when the clipboard holds no text
    fn read_text(&mut self) -> Result<Option<String>, MonitorError>;
    fn write_text(&mut self, text: &str) -> Result<(), MonitorError>;
    fn clear(&mut self) -> Result<(), MonitorError>;
}

/// Sends the platform copy shortcut to the focused application
pub trait KeystrokeSynthesizer: Send {
    fn send_copy(&mut self) -> Result<(), MonitorError>;
}

/// The floating translate button
pub trait PopupSurface: Send {
    fn open(&mut self, bounds: Rect, text: &str) -> Result<(), MonitorError>;
    fn close(&mut self);
}

pub trait ScreenInfo: Send {
    fn cursor_position(&self) -> Point;
    /// Bounds of the display containing `at`
    fn display_bounds(&self, at: Point) -> Rect;
}

/// Receives the captured text when the popup action is clicked
pub trait TranslationConsumer: Send {
    fn deliver(&mut self, text: &str);
}

/// Decides whether a synthesized copy may be issued right now. Runs on the
/// blocking pool, so implementations may query the OS.
pub trait SelectionGate: Send {
    fn allows_capture(&mut self) -> bool;

    fn reload(&mut self) {}
}

/// Everything the monitor needs from the OS. Clipboard, keystrokes and gate
/// move to the desktop worker; the rest stay on the event loop.
pub struct Capabilities {
    pub input: Box<dyn GlobalInputSource>,
    pub clipboard: Box<dyn ClipboardAccess>,
    pub keystrokes: Box<dyn KeystrokeSynthesizer>,
    pub popup: Box<dyn PopupSurface>,
    pub screen: Box<dyn ScreenInfo>,
    pub consumer: Box<dyn TranslationConsumer>,
    pub gate: Box<dyn SelectionGate>,
}
