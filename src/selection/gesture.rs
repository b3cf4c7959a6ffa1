use tokio::time::Instant;

use super::config::SelectionPolicy;
use super::geometry::Point;

/// What a left-button release means for text selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Plain click, nothing selected
    Click,
    /// Second release close in time and space to the previous one
    DoubleClick,
    /// Press held and moved far enough to have swept a selection
    Drag,
}

impl Gesture {
    pub fn selects_text(self) -> bool {
        !matches!(self, Gesture::Click)
    }
}

/// Where and when a button event happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerStamp {
    pub at: Instant,
    pub position: Point,
}

impl PointerStamp {
    pub fn new(at: Instant, position: Point) -> Self {
        Self { at, position }
    }
}

/// Classify a release against its press and the previous release.
///
/// Double-click detection runs first and only looks at the previous release,
/// so the first click of a pair is never a selection on its own.
pub fn classify_release(
    press: PointerStamp,
    release: PointerStamp,
    last_click: Option<PointerStamp>,
    policy: &SelectionPolicy,
) -> Gesture {
    if let Some(last) = last_click {
        let since_last = release.at.saturating_duration_since(last.at);
        let from_last = release.position.distance_to(last.position);
        if since_last <= policy.double_click_threshold && from_last <= policy.double_click_distance {
            return Gesture::DoubleClick;
        }
    }

    let held_for = release.at.saturating_duration_since(press.at);
    let travelled = release.position.distance_to(press.position);
    if held_for >= policy.min_drag_duration && travelled >= policy.min_drag_distance {
        Gesture::Drag
    } else {
        Gesture::Click
    }
}
