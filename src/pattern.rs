//! Test pattern geometry and the renderer that draws it.
//!
//! Rendering is a pure function of `(Pattern, FrameState)`: it never looks at
//! a clock, which keeps the scheduler testable without a display.

use crate::display::{Color, Rect, Surface};
use crate::error::Result;

pub const CHECKER_ROWS: u32 = 30;
pub const CHECKER_COLS: u32 = 45;
pub const CHECKER_DARK: Color = Color::gray(150);
pub const CHECKER_LIGHT: Color = Color::gray(255);

/// Offset of the flashing dot from the screen center
pub const FLASH_DOT_OFFSET: (i32, i32) = (300, -200);
pub const FLASH_DOT_RADIUS: i32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkerboard {
    pub rows: u32,
    pub cols: u32,
    /// Area covered, anchored at the origin
    pub width: u32,
    pub height: u32,
    /// Color of block (0, 0) when not inverted, and of the other parity
    pub colors: (Color, Color),
}

impl Checkerboard {
    pub fn block_size(&self) -> (u32, u32) {
        (self.width / self.cols.max(1), self.height / self.rows.max(1))
    }

    fn draw<S: Surface + ?Sized>(&self, surface: &mut S, inverted: bool) -> Result<()> {
        let (block_w, block_h) = self.block_size();
        for i in 0..self.rows {
            for j in 0..self.cols {
                let mut primary = (i + j) % 2 == 0;
                if inverted {
                    primary = !primary;
                }
                let color = if primary { self.colors.0 } else { self.colors.1 };
                let rect = Rect::new((j * block_w) as i32, (i * block_h) as i32, block_w, block_h);
                surface.fill_rect(rect, color)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dot {
    /// Label used in frequency reports
    pub name: &'static str,
    pub cx: i32,
    pub cy: i32,
    pub radius: i32,
    pub color: Color,
}

impl Dot {
    fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        surface.fill_circle(self.cx, self.cy, self.radius, self.color)
    }
}

/// Fixed geometry of one mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub background: Color,
    pub checkerboard: Option<Checkerboard>,
    /// Drawn every frame regardless of flashing
    pub reference_dot: Dot,
    /// Each one belongs to the flash channel with the same index
    pub dots: Vec<Dot>,
}

impl Pattern {
    /// Gray/white checkerboard, small black center marker, red dot off-center
    pub fn checkerboard_with_red_dot(width: u32, height: u32) -> Self {
        let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
        Self {
            background: Color::BLACK,
            checkerboard: Some(Checkerboard {
                rows: CHECKER_ROWS,
                cols: CHECKER_COLS,
                width,
                height,
                colors: (CHECKER_DARK, CHECKER_LIGHT),
            }),
            reference_dot: Dot {
                name: "Reference Dot",
                cx,
                cy,
                radius: 10,
                color: Color::BLACK,
            },
            dots: vec![Dot {
                name: "Red Dot",
                cx: cx + FLASH_DOT_OFFSET.0,
                cy: cy + FLASH_DOT_OFFSET.1,
                radius: FLASH_DOT_RADIUS,
                color: Color::RED,
            }],
        }
    }

    /// Black screen, tiny white center marker, white dot off-center
    pub fn white_dot_on_black(width: u32, height: u32) -> Self {
        let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
        Self {
            background: Color::BLACK,
            checkerboard: None,
            reference_dot: Dot {
                name: "Reference Dot",
                cx,
                cy,
                radius: 5,
                color: Color::WHITE,
            },
            dots: vec![Dot {
                name: "White Dot",
                cx: cx + FLASH_DOT_OFFSET.0,
                cy: cy + FLASH_DOT_OFFSET.1,
                radius: FLASH_DOT_RADIUS,
                color: Color::WHITE,
            }],
        }
    }
}

/// Visibility of every flash channel for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameState {
    /// A flashing checkerboard is inverted while its channel is visible
    pub checkerboard_inverted: bool,
    pub dots_visible: Vec<bool>,
}

impl FrameState {
    /// Everything shown, nothing inverted
    pub fn all_visible(dots: usize) -> Self {
        Self {
            checkerboard_inverted: false,
            dots_visible: vec![true; dots],
        }
    }
}

/// Draw one complete frame: clear, checkerboard, dots, present
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    pattern: &Pattern,
    state: &FrameState,
) -> Result<()> {
    surface.clear(pattern.background)?;

    if let Some(board) = &pattern.checkerboard {
        board.draw(surface, state.checkerboard_inverted)?;
    }

    pattern.reference_dot.draw(surface)?;

    for (dot, visible) in pattern.dots.iter().zip(&state.dots_visible) {
        if *visible {
            dot.draw(surface)?;
        }
    }

    surface.present()
}
