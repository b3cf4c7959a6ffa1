/// Timing and distance policy for the selection monitor
use std::time::Duration;

/// Maximum gap between two releases to count as a double-click
pub const DOUBLE_CLICK_THRESHOLD_MS: u64 = 200;

/// Maximum distance between two releases to count as a double-click
pub const DOUBLE_CLICK_DISTANCE_PX: f64 = 5.0;

/// Minimum pointer travel for a press/release pair to count as a drag selection
pub const MIN_DRAG_DISTANCE_PX: f64 = 10.0;

/// Minimum press duration for a press/release pair to count as a drag selection
pub const MIN_DRAG_DURATION_MS: u64 = 100;

/// Coalesces double/triple-click bursts into a single synthesized copy
pub const COPY_DEBOUNCE_MS: u64 = 300;

/// Wait after the synthesized copy before reading the clipboard back
pub const CLIPBOARD_SETTLE_MS: u64 = 100;

/// Debounce before the popup is actually created
pub const POPUP_DEBOUNCE_MS: u64 = 220;

/// How long the popup stays on screen without interaction
pub const POPUP_AUTO_HIDE_MS: u64 = 5000;

/// A copy debounce firing this soon after a Ctrl press is dropped
pub const CTRL_PRIORITY_WINDOW_MS: u64 = 500;

/// Popup button size in logical pixels
pub const POPUP_WIDTH: f64 = 48.0;
pub const POPUP_HEIGHT: f64 = 48.0;

/// Gap between the cursor and the popup edge
pub const POPUP_CURSOR_OFFSET: f64 = 10.0;

/// Vertical offset used when the popup is flipped below the cursor
pub const POPUP_BELOW_OFFSET: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPolicy {
    pub double_click_threshold: Duration,
    pub double_click_distance: f64,
    pub min_drag_distance: f64,
    pub min_drag_duration: Duration,
    pub copy_debounce: Duration,
    pub clipboard_settle: Duration,
    pub popup_debounce: Duration,
    pub popup_auto_hide: Duration,
    pub ctrl_priority_window: Duration,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            double_click_threshold: Duration::from_millis(DOUBLE_CLICK_THRESHOLD_MS),
            double_click_distance: DOUBLE_CLICK_DISTANCE_PX,
            min_drag_distance: MIN_DRAG_DISTANCE_PX,
            min_drag_duration: Duration::from_millis(MIN_DRAG_DURATION_MS),
            copy_debounce: Duration::from_millis(COPY_DEBOUNCE_MS),
            clipboard_settle: Duration::from_millis(CLIPBOARD_SETTLE_MS),
            popup_debounce: Duration::from_millis(POPUP_DEBOUNCE_MS),
            popup_auto_hide: Duration::from_millis(POPUP_AUTO_HIDE_MS),
            ctrl_priority_window: Duration::from_millis(CTRL_PRIORITY_WINDOW_MS),
        }
    }
}
