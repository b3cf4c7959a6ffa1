use super::input::CursorTracker;
use crate::selection::{Point, Rect, ScreenInfo};

/// Used when the display size cannot be queried
const FALLBACK_DISPLAY: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

/// Half-extent of the unbounded area used for secondary displays
const UNBOUNDED_EXTENT: f64 = 100_000.0;

/// Cursor from the hook thread's tracker, bounds of the main display from `rdev`
pub struct RdevScreen {
    cursor: CursorTracker,
}

impl RdevScreen {
    pub fn new(cursor: CursorTracker) -> Self {
        Self { cursor }
    }
}

fn main_display() -> Rect {
    match rdev::display_size() {
        Ok((width, height)) => Rect::new(0.0, 0.0, width as f64, height as f64),
        Err(e) => {
            log::warn!("Could not query display size: {:?}", e);
            FALLBACK_DISPLAY
        }
    }
}

/// `rdev` only knows the main display. A cursor outside it is on another
/// monitor whose edges are unknown, so no edge flipping is applied there.
fn display_for(at: Point, main: Rect) -> Rect {
    if main.contains(at) {
        main
    } else {
        Rect::new(
            at.x - UNBOUNDED_EXTENT,
            at.y - UNBOUNDED_EXTENT,
            UNBOUNDED_EXTENT * 2.0,
            UNBOUNDED_EXTENT * 2.0,
        )
    }
}

impl ScreenInfo for RdevScreen {
    fn cursor_position(&self) -> Point {
        self.cursor.get()
    }

    fn display_bounds(&self, at: Point) -> Rect {
        display_for(at, main_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::popup_bounds;

    #[test]
    fn test_cursor_on_main_display_uses_its_bounds() {
        let main = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        assert_eq!(display_for(Point::new(500.0, 500.0), main), main);
    }

    #[test]
    fn test_cursor_on_secondary_display_is_not_flipped() {
        let main = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let cursor = Point::new(2500.0, 400.0);

        let bounds = popup_bounds(cursor, display_for(cursor, main));
        assert_eq!(bounds.x, 2510.0);
        assert_eq!(bounds.y, 342.0);
    }
}
