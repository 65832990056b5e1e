use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line as TextLine,
    widgets::canvas::{Canvas, Context, Line, Rectangle},
};

use crate::render::{DrawList, DrawOp, Rgb, TextAlign};

/// Canvas units per terminal cell, so pixel-sized margins keep their
/// proportions on a character grid.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;
/// Braille cells hold two dot columns.
const DOT_WIDTH: f64 = CELL_WIDTH / 2.0;

pub fn virtual_size(area: Rect) -> (f64, f64) {
    (
        area.width as f64 * CELL_WIDTH,
        area.height as f64 * CELL_HEIGHT,
    )
}

pub fn color(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// Replays a recorded frame as a ratatui canvas covering `area`.
pub fn spectrum_canvas(list: &DrawList, area: Rect) -> Canvas<'_, impl Fn(&mut Context) + '_> {
    let (width, height) = virtual_size(area);
    let background = list.background().map_or(Color::Reset, color);

    Canvas::default()
        .marker(Marker::Braille)
        .background_color(background)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            for op in list.ops() {
                paint_op(ctx, op, height);
            }
        })
}

// Recorded ops are y-down; the canvas is y-up.
fn paint_op(ctx: &mut Context, op: &DrawOp, height: f64) {
    match op {
        DrawOp::Clear(_) => {}
        DrawOp::FillRect(r, c) => {
            if r.width <= 0.0 || r.height <= 0.0 {
                return;
            }
            let column = |x: f64| Line {
                x1: x,
                y1: height - r.y,
                x2: x,
                y2: height - r.bottom(),
                color: color(*c),
            };
            if r.width < DOT_WIDTH {
                ctx.draw(&column(r.x + r.width / 2.0));
                return;
            }
            let mut x = r.x + DOT_WIDTH / 2.0;
            while x < r.right() {
                ctx.draw(&column(x));
                x += DOT_WIDTH;
            }
        }
        DrawOp::StrokeRect(r, c) => ctx.draw(&Rectangle {
            x: r.x,
            y: height - r.bottom(),
            width: r.width,
            height: r.height,
            color: color(*c),
        }),
        DrawOp::Line(from, to, c) => ctx.draw(&Line {
            x1: from.0,
            y1: height - from.1,
            x2: to.0,
            y2: height - to.1,
            color: color(*c),
        }),
        DrawOp::Text {
            text,
            x,
            y,
            align,
            color: c,
        } => {
            let span = text.chars().count() as f64 * CELL_WIDTH;
            let left = match align {
                TextAlign::Left => *x,
                TextAlign::Center => x - span / 2.0,
                TextAlign::Right => x - span,
            };
            ctx.print(
                left,
                height - y,
                TextLine::styled(text.clone(), Style::default().fg(color(*c))),
            );
        }
        DrawOp::VerticalText {
            text,
            x,
            y,
            color: c,
        } => {
            let count = text.chars().count() as f64;
            let top = y - count * CELL_HEIGHT / 2.0;
            for (i, ch) in text.chars().enumerate() {
                let cy = top + (i as f64 + 0.5) * CELL_HEIGHT;
                ctx.print(
                    x - CELL_WIDTH / 2.0,
                    height - cy,
                    TextLine::styled(ch.to_string(), Style::default().fg(color(*c))),
                );
            }
        }
    }
}
