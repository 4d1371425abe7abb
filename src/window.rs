//! Low/high watermark tracking for the changed region of the framebuffer.

/// Axis-aligned bounding box of the pixels changed since the last flush.
///
/// The empty state is encoded with inverted watermarks (`x_low == width`,
/// `x_high == 0`) so that any changed pixel pulls all four bounds onto
/// itself. Coalescing is by bounding box only; pixels inside the box that
/// did not change are re-sent on flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// Leftmost changed column
    pub x_low: u16,
    /// Topmost changed row
    pub y_low: u16,
    /// Rightmost changed column
    pub x_high: u16,
    /// Bottommost changed row
    pub y_high: u16,
}

impl Window {
    /// The canonical empty window for a panel of the given size
    pub const fn empty(width: u16, height: u16) -> Self {
        Self {
            x_low: width,
            y_low: height,
            x_high: 0,
            y_high: 0,
        }
    }

    /// Whether no pixel has changed since the last reset
    pub const fn is_empty(&self) -> bool {
        self.x_high < self.x_low || self.y_high < self.y_low
    }

    /// Extend the window to cover a changed pixel
    pub fn expand(&mut self, x: u16, y: u16) {
        if x < self.x_low {
            self.x_low = x;
        }
        if y < self.y_low {
            self.y_low = y;
        }
        if x > self.x_high {
            self.x_high = x;
        }
        if y > self.y_high {
            self.y_high = y;
        }
    }

    /// Mark the full panel extent changed
    pub fn cover_full(&mut self, width: u16, height: u16) {
        self.x_low = 0;
        self.y_low = 0;
        self.x_high = width - 1;
        self.y_high = height - 1;
    }

    /// Width of a non-empty window in pixels
    pub const fn width(&self) -> u16 {
        self.x_high - self.x_low + 1
    }

    /// Height of a non-empty window in pixels
    pub const fn height(&self) -> u16 {
        self.y_high - self.y_low + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_with_inverted_watermarks() {
        let w = Window::empty(240, 320);
        assert!(w.is_empty());
        assert_eq!(w.x_low, 240);
        assert_eq!(w.y_low, 320);
        assert_eq!(w.x_high, 0);
        assert_eq!(w.y_high, 0);
    }

    #[test]
    fn single_pixel_pulls_all_four_bounds() {
        let mut w = Window::empty(240, 320);
        w.expand(17, 42);
        assert!(!w.is_empty());
        assert_eq!((w.x_low, w.y_low, w.x_high, w.y_high), (17, 42, 17, 42));
        assert_eq!(w.width(), 1);
        assert_eq!(w.height(), 1);
    }

    #[test]
    fn expand_is_minimal_bounding_box() {
        let mut w = Window::empty(240, 320);
        w.expand(10, 20);
        w.expand(50, 60);
        w.expand(30, 30); // interior point, no growth
        assert_eq!((w.x_low, w.y_low, w.x_high, w.y_high), (10, 20, 50, 60));
        assert_eq!(w.width(), 41);
        assert_eq!(w.height(), 41);
    }

    #[test]
    fn cover_full_spans_the_panel() {
        let mut w = Window::empty(240, 320);
        w.cover_full(240, 320);
        assert_eq!((w.x_low, w.y_low, w.x_high, w.y_high), (0, 0, 239, 319));
        assert_eq!(w.width(), 240);
        assert_eq!(w.height(), 320);
    }
}
