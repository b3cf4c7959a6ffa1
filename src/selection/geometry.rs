use serde::Serialize;

use super::config::{POPUP_BELOW_OFFSET, POPUP_CURSOR_OFFSET, POPUP_HEIGHT, POPUP_WIDTH};

/// Screen coordinates in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edges are inclusive: a press on the border counts as inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Place the popup above and to the right of the cursor, flipping to the
/// left or below when it would leave the display.
pub fn popup_bounds(cursor: Point, display: Rect) -> Rect {
    let mut x = cursor.x + POPUP_CURSOR_OFFSET;
    let mut y = cursor.y - POPUP_HEIGHT - POPUP_CURSOR_OFFSET;

    if x + POPUP_WIDTH > display.right() {
        x = cursor.x - POPUP_WIDTH - POPUP_CURSOR_OFFSET;
    }
    if y < display.y {
        y = cursor.y + POPUP_BELOW_OFFSET;
    }

    Rect::new(x, y, POPUP_WIDTH, POPUP_HEIGHT)
}
