//! Desktop implementations of the selection monitor's capabilities.

pub mod clipboard;
pub mod foreground;
pub mod input;
pub mod keystroke;
pub mod popup;
pub mod screen;

use std::path::PathBuf;

use crate::selection::{Capabilities, TranslationConsumer};

pub use clipboard::ArboardClipboard;
pub use foreground::{ActiveWindowProbe, ForegroundApp, IgnoreListGate};
pub use input::{CursorTracker, PopupRegion, RdevInputSource};
pub use keystroke::EnigoKeystrokes;
pub use popup::RegionPopup;
pub use screen::RdevScreen;

/// Wire the real OS capabilities together. The hook thread, the screen
/// query and the popup share one cursor tracker and one popup region.
pub fn desktop_capabilities(
    settings_path: Option<PathBuf>,
    consumer: Box<dyn TranslationConsumer>,
) -> Capabilities {
    let cursor = CursorTracker::default();
    let region = PopupRegion::default();

    Capabilities {
        input: Box::new(RdevInputSource::new(cursor.clone(), region.clone())),
        clipboard: Box::new(ArboardClipboard),
        keystrokes: Box::new(EnigoKeystrokes),
        popup: Box::new(RegionPopup::new(region)),
        screen: Box::new(RdevScreen::new(cursor)),
        consumer,
        gate: Box::new(IgnoreListGate::new(settings_path, ActiveWindowProbe)),
    }
}
