//! Pixel geometry shared by the layout model and the backends.
//!
//! Monitor discovery is not gridwm's business: a [`Backend`](crate::traits::Backend)
//! reports [`MonitorInfo`] records and the engine only ever asks one
//! question about them: which monitor, if any, contains a given point.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle on the virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `(x, y)` lies inside the rectangle.  The right and bottom
    /// edges are exclusive.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        let left = self.x as i64;
        let top = self.y as i64;
        x >= left && x < left + self.width as i64 && y >= top && y < top + self.height as i64
    }

    /// Center point, rounded towards the top-left.
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// X coordinate one past the right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Y coordinate one past the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Static information about a physical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorInfo {
    /// Name the transport uses for this output (e.g. `"DP-1"`).
    pub name: String,
    /// X position on the virtual desktop (pixels).
    pub x: i32,
    /// Y position on the virtual desktop (pixels).
    pub y: i32,
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
}

impl MonitorInfo {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Return the index of the first rectangle in `rects` that contains
/// `(x, y)`.
///
/// Outputs do not overlap in practice; if they do, the earliest one in
/// discovery order wins.
pub fn find_monitor_containing<'a>(
    rects: impl IntoIterator<Item = &'a Rect>,
    x: i32,
    y: i32,
) -> Option<usize> {
    rects.into_iter().position(|r| r.contains(x, y))
}
