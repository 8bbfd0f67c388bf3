use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color as SdlColor;
use sdl2::rect::{Point, Rect as SdlRect};
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::EventPump;

use super::{circle_spans, CancelSignal, Color, Rect, Surface};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub title: String,
    /// `None` uses the current mode of the primary display
    pub resolution: Option<(u32, u32)>,
    pub fullscreen: bool,
    /// Off by default: the pacer, not the display, decides when frames go out
    pub vsync: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Flashing Modes".to_string(),
            resolution: None,
            fullscreen: true,
            vsync: false,
        }
    }
}

/// SDL2 window drawn through an accelerated canvas
pub struct SdlSurface {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

impl SdlSurface {
    pub fn open(options: &WindowOptions) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(Error::Surface)?;
        let video_subsystem = sdl_context.video().map_err(Error::Surface)?;

        let (width, height) = match options.resolution {
            Some(size) => size,
            None => {
                let mode = video_subsystem
                    .current_display_mode(0)
                    .map_err(Error::Surface)?;
                (mode.w as u32, mode.h as u32)
            },
        };

        let mut builder = video_subsystem.window(&options.title, width, height);
        builder.position_centered();
        if options.fullscreen {
            builder.fullscreen_desktop();
        }
        let mut window = builder.build().map_err(|e| Error::Surface(e.to_string()))?;
        // Escape must reach us without a click first
        window.raise();

        let mut canvas_builder = window.into_canvas().accelerated();
        if options.vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| Error::Surface(e.to_string()))?;

        let event_pump = sdl_context.event_pump().map_err(Error::Surface)?;

        log::debug!(
            "opened {}x{} window (fullscreen: {}, vsync: {})",
            width,
            height,
            options.fullscreen,
            options.vsync
        );

        Ok(Self {
            canvas,
            event_pump,
            width,
            height,
        })
    }

    /// Horizontal span from x1 to x2 inclusive
    fn hline(&mut self, x1: i32, x2: i32, y: i32) -> Result<()> {
        self.canvas
            .draw_line(Point::new(x1, y), Point::new(x2, y))
            .map_err(Error::Surface)
    }
}

impl Surface for SdlSurface {
    fn poll_cancel(&mut self) -> Option<CancelSignal> {
        let mut signal = None;
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Q),
                    ..
                } => signal = Some(CancelSignal::Quit),
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    if signal.is_none() {
                        signal = Some(CancelSignal::Skip);
                    }
                },
                _ => {},
            }
        }
        signal
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.canvas
            .set_draw_color(SdlColor::RGB(color.r, color.g, color.b));
        self.canvas.clear();
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.canvas
            .set_draw_color(SdlColor::RGB(color.r, color.g, color.b));
        self.canvas
            .fill_rect(SdlRect::new(rect.x, rect.y, rect.w, rect.h))
            .map_err(Error::Surface)
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) -> Result<()> {
        self.canvas
            .set_draw_color(SdlColor::RGB(color.r, color.g, color.b));
        for (x1, x2, y) in circle_spans(cx, cy, radius) {
            self.hline(x1, x2, y)?;
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.canvas.present();
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
