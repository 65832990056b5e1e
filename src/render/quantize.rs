use super::Rgb;
use super::bands::Bar;
use super::display::ColorScheme;
use super::geometry::{Geometry, Rect};

pub const BACKGROUND: Rgb = Rgb(0x1e, 0x00, 0x1e);
/// Flat key color for compositing the output over video.
pub const CHROMA_KEY: Rgb = Rgb(0x00, 0xff, 0x00);
pub const MONO: Rgb = Rgb(50, 200, 255);
const GRADIENT_FROM: Rgb = Rgb(102, 0, 102);
const GRADIENT_TO: Rgb = Rgb(255, 100, 150);

/// Tiered bands from the baseline up; the final band takes the remainder.
pub const TIERS: [(u32, Rgb); 3] = [
    (15, Rgb(0x00, 0xff, 0x00)),
    (3, Rgb(0xff, 0xff, 0x00)),
    (u32::MAX, Rgb(0xff, 0x00, 0x00)),
];

/// Share of a step slot a tiered block covers.
const BLOCK_FILL: f64 = 0.9;

pub fn background(chroma_key: bool) -> Rgb {
    if chroma_key { CHROMA_KEY } else { BACKGROUND }
}

/// Maps a 0..=255 magnitude onto `0..=steps` whole steps of a plot
/// `height` pixels tall.
pub fn quantize(magnitude: u8, height: f64, steps: u32) -> u32 {
    if steps == 0 || height <= 0.0 {
        return 0;
    }
    let continuous = height * magnitude as f64 / 255.0;
    let step_height = height / steps as f64;
    ((continuous / step_height).round() as u32).min(steps)
}

/// Linear blend across the gradient range; `ratio` is the bar's horizontal
/// position in `[0, 1)`.
pub fn gradient_color(ratio: f64) -> Rgb {
    let r = ratio.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * r).floor() as u8;
    Rgb(
        lerp(GRADIENT_FROM.0, GRADIENT_TO.0),
        lerp(GRADIENT_FROM.1, GRADIENT_TO.1),
        lerp(GRADIENT_FROM.2, GRADIENT_TO.2),
    )
}

/// Color of the tiered block at `step` (0 = lowest).
pub fn tier_color(step: u32) -> Rgb {
    let mut floor = 0u32;
    for (size, color) in TIERS {
        floor = floor.saturating_add(size);
        if step < floor {
            return color;
        }
    }
    TIERS[TIERS.len() - 1].1
}

/// Filled shapes for one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum BarPaint {
    Solid(Rect, Rgb),
    Blocks(Vec<(Rect, Rgb)>),
}

impl BarPaint {
    pub fn shapes(&self) -> Vec<(Rect, Rgb)> {
        match self {
            BarPaint::Solid(rect, color) => vec![(*rect, *color)],
            BarPaint::Blocks(blocks) => blocks.clone(),
        }
    }
}

/// Turns a positioned bar into shapes for `scheme`.
pub fn paint_bar(
    bar: &Bar,
    bar_count: usize,
    geometry: &Geometry,
    step_count: u32,
    scheme: ColorScheme,
) -> BarPaint {
    let lit = quantize(bar.magnitude, geometry.height, step_count);
    let step_height = geometry.step_height(step_count);
    let base = geometry.end_y();

    match scheme {
        ColorScheme::Tiered => {
            let blocks = (0..lit)
                .map(|step| {
                    let top = base - (step + 1) as f64 * step_height;
                    let rect = Rect::new(bar.left_x, top, bar.width, step_height * BLOCK_FILL);
                    (rect, tier_color(step))
                })
                .collect();
            BarPaint::Blocks(blocks)
        }
        ColorScheme::Gradient | ColorScheme::Mono => {
            let color = match scheme {
                ColorScheme::Mono => MONO,
                _ => gradient_color(bar.index as f64 / bar_count.max(1) as f64),
            };
            let height = lit as f64 * step_height;
            BarPaint::Solid(Rect::new(bar.left_x, base - height, bar.width, height), color)
        }
    }
}
