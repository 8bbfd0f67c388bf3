use std::collections::VecDeque;

use super::{CancelSignal, Color, Rect, Surface};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Clear(Color),
    FillRect(Rect, Color),
    FillCircle {
        cx: i32,
        cy: i32,
        radius: i32,
        color: Color,
    },
    Present,
}

/// Headless surface that records every call, for tests
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
    width: u32,
    height: u32,
    /// Answer for each `poll_cancel`, front first; `None` once exhausted
    cancel_script: VecDeque<Option<CancelSignal>>,
    polls: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            width,
            height,
            cancel_script: VecDeque::new(),
            polls: 0,
        }
    }

    /// Report `signal` on the `poll`-th call to `poll_cancel` (zero based)
    pub fn cancel_on_poll(mut self, poll: usize, signal: CancelSignal) -> Self {
        self.cancel_script = std::iter::repeat(None).take(poll).collect();
        self.cancel_script.push_back(Some(signal));
        self
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn frames(&self) -> usize {
        self.calls.iter().filter(|c| **c == DrawCall::Present).count()
    }

    /// Calls of each presented frame, split at `Present`
    pub fn frame_calls(&self) -> Vec<&[DrawCall]> {
        self.calls
            .split_inclusive(|c| *c == DrawCall::Present)
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn poll_cancel(&mut self) -> Option<CancelSignal> {
        self.polls += 1;
        self.cancel_script.pop_front().flatten()
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.calls.push(DrawCall::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillRect(rect, color));
        Ok(())
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillCircle {
            cx,
            cy,
            radius,
            color,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.calls.push(DrawCall::Present);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
