//! Headless popup surface.
//!
//! Nothing is drawn: `RegionPopup` opens no window, so on screen the
//! translate button is an invisible 48x48 hit region near the cursor. The
//! open/close calls are logged and the bounds are published to the input
//! hook. A windowed surface can be swapped in behind `PopupSurface` without
//! touching the monitor.

use super::input::PopupRegion;
use crate::selection::{MonitorError, PopupSurface, Rect};

/// Publishes its bounds to the input hook, which turns clicks inside them
/// into popup clicks.
pub struct RegionPopup {
    region: PopupRegion,
}

impl RegionPopup {
    pub fn new(region: PopupRegion) -> Self {
        Self { region }
    }
}

impl PopupSurface for RegionPopup {
    fn open(&mut self, bounds: Rect, text: &str) -> Result<(), MonitorError> {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Err(MonitorError::Popup(format!(
                "invalid popup size {}x{}",
                bounds.width, bounds.height
            )));
        }

        self.region.set(bounds);
        log::info!(
            "🔘 Translate popup at ({:.0}, {:.0}) for {} chars",
            bounds.x,
            bounds.y,
            text.chars().count()
        );
        Ok(())
    }

    fn close(&mut self) {
        self.region.clear();
    }
}
