mod sdl;

#[cfg(test)]
mod recording;

pub use sdl::{SdlSurface, WindowOptions};

#[cfg(test)]
pub use recording::{DrawCall, RecordingSurface};

use crate::error::Result;

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Why the current mode should stop early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelSignal {
    /// Abandon the current mode, keep going with the next one (Escape)
    Skip,
    /// Abandon everything (window closed)
    Quit,
}

/// Something the pattern renderer can draw on.
///
/// A frame is always `clear`, zero or more fills, then `present`.
pub trait Surface {
    /// Drain pending input; `Some` if the user asked to stop
    fn poll_cancel(&mut self) -> Option<CancelSignal>;

    fn clear(&mut self, color: Color) -> Result<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) -> Result<()>;

    fn present(&mut self) -> Result<()>;

    /// Drawable size in pixels
    fn size(&self) -> (u32, u32);
}

/// Horizontal spans `(x1, x2, y)` of a filled midpoint circle, top to bottom,
/// one per row. A negative radius yields nothing.
pub fn circle_spans(cx: i32, cy: i32, radius: i32) -> Vec<(i32, i32, i32)> {
    if radius < 0 {
        return Vec::new();
    }

    // Half-width of the row `dy` away from the center, from one octant
    let mut half = vec![0; radius as usize + 1];
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    while x >= y {
        half[y as usize] = half[y as usize].max(x);
        half[x as usize] = half[x as usize].max(y);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    (-radius..=radius)
        .map(|dy| {
            let w = half[dy.unsigned_abs() as usize];
            (cx - w, cx + w, cy + dy)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_spans_one_per_row() {
        for radius in [5, 30] {
            let spans = circle_spans(100, 200, radius);
            assert_eq!(spans.len(), (2 * radius + 1) as usize);
            for (row, &(_, _, y)) in spans.iter().enumerate() {
                assert_eq!(y, 200 - radius + row as i32);
            }
        }
    }

    #[test]
    fn test_circle_spans_symmetric() {
        for radius in [5, 30] {
            let spans = circle_spans(100, 200, radius);
            for &(x1, x2, _) in &spans {
                assert_eq!(100 - x1, x2 - 100);
            }
            let widths: Vec<i32> = spans.iter().map(|(x1, x2, _)| x2 - x1).collect();
            let mut flipped = widths.clone();
            flipped.reverse();
            assert_eq!(widths, flipped);
            assert_eq!(widths[radius as usize], 2 * radius);
        }
    }

    #[test]
    fn test_circle_spans_cover_disc() {
        for radius in [5, 30] {
            let r2 = radius * radius;
            for (x1, x2, y) in circle_spans(0, 0, radius) {
                let w = x2;
                assert_eq!(x1, -w);
                // Nothing past radius + 0.5
                assert!(w * w + y * y <= r2 + radius, "row {} too wide", y);
                // Every pixel inside the radius is filled
                assert!((w + 1) * (w + 1) + y * y > r2, "row {} too narrow", y);
            }
        }
    }

    #[test]
    fn test_circle_spans_small_radius() {
        assert_eq!(circle_spans(3, 4, 0), vec![(3, 3, 4)]);
        assert!(circle_spans(3, 4, -1).is_empty());
        assert_eq!(
            circle_spans(0, 0, 5),
            vec![
                (-2, 2, -5),
                (-3, 3, -4),
                (-4, 4, -3),
                (-5, 5, -2),
                (-5, 5, -1),
                (-5, 5, 0),
                (-5, 5, 1),
                (-5, 5, 2),
                (-4, 4, 3),
                (-3, 3, 4),
                (-2, 2, 5),
            ]
        );
    }
}
