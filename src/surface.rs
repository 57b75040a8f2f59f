//! # Drawing Surface
//!
//! One page is an append-only list of draw operations at absolute
//! coordinates. Coordinates are top-down (y grows toward the bottom of the
//! page); the PDF writer flips them at serialization time.
//!
//! The op list is the entire contract between layout and output: any backend
//! that can interpret [`DrawOp`] can produce the document.

use crate::text::Font;

/// An RGB color, each channel 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::gray(0.0);
    pub const WHITE: Color = Color::gray(1.0);
    /// Row banding fill.
    pub const BAND: Color = Color::gray(0.93);
    /// Rule lines under headers.
    pub const RULE: Color = Color::gray(0.55);

    pub const fn gray(v: f64) -> Color {
        Color { r: v, g: v, b: v }
    }
}

/// Stroke parameters for rectangle borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// A single drawing operation on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline at (x, y).
    Text {
        x: f64,
        y: f64,
        text: String,
        font: Font,
        size: f64,
        color: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        thickness: f64,
        color: Color,
    },
    /// Rectangle with top-left corner at (x, y).
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
}

/// An append-only drawing target with fixed dimensions. Once sealed, no
/// further body writes are accepted.
#[derive(Debug, Clone)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    ops: Vec<DrawOp>,
    sealed: bool,
}

impl Page {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            sealed: false,
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: impl Into<String>,
        font: Font,
        size: f64,
        color: Color,
    ) {
        self.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            font,
            size,
            color,
        });
    }

    pub fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, thickness: f64, color: Color) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color,
        });
    }

    pub fn draw_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    ) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        });
    }

    fn push(&mut self, op: DrawOp) {
        debug_assert!(!self.sealed, "draw on sealed page");
        if self.sealed {
            return;
        }
        self.ops.push(op);
    }
}
