//! Spectrum rendering: layout, band aggregation, quantization and drawing.
//!
//! Everything here draws through [`Surface`], a minimal 2D canvas with a
//! y-down coordinate system. [`DrawList`] records the calls so a frame can
//! be inspected in tests or replayed by the terminal layer.

pub mod bands;
pub mod display;
pub mod frame;
pub mod geometry;
pub mod quantize;

pub use bands::{Bar, BandLayout, aggregate};
pub use display::{ColorScheme, DisplayConfig, DisplayMode};
pub use frame::{FrameInput, FrameRenderer};
pub use geometry::{Geometry, Margins, Rect};
pub use quantize::{BarPaint, quantize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// The drawing capability a frame is rendered onto.
pub trait Surface {
    /// Fills the whole surface.
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
    fn stroke_rect(&mut self, rect: Rect, color: Rgb);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb);
    /// Horizontal text with its baseline at `y`.
    fn text(&mut self, text: &str, x: f64, y: f64, align: TextAlign, color: Rgb);
    /// Text running along the vertical axis, centred on `(x, y)`.
    fn vertical_text(&mut self, text: &str, x: f64, y: f64, color: Rgb);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Rgb),
    FillRect(Rect, Rgb),
    StrokeRect(Rect, Rgb),
    Line((f64, f64), (f64, f64), Rgb),
    Text {
        text: String,
        x: f64,
        y: f64,
        align: TextAlign,
        color: Rgb,
    },
    VerticalText {
        text: String,
        x: f64,
        y: f64,
        color: Rgb,
    },
}

/// A [`Surface`] that records every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Background color of the last `clear`, if any.
    pub fn background(&self) -> Option<Rgb> {
        self.ops.iter().rev().find_map(|op| match op {
            DrawOp::Clear(c) => Some(*c),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } | DrawOp::VerticalText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for DrawList {
    fn clear(&mut self, color: Rgb) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::StrokeRect(rect, color));
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb) {
        self.ops.push(DrawOp::Line(from, to, color));
    }

    fn text(&mut self, text: &str, x: f64, y: f64, align: TextAlign, color: Rgb) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            align,
            color,
        });
    }

    fn vertical_text(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        self.ops.push(DrawOp::VerticalText {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}
