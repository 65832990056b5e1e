use super::bands::{BandLayout, aggregate};
use super::display::DisplayConfig;
use super::geometry::{Geometry, Margins};
use super::quantize::{background, paint_bar};
use super::{Rgb, Surface, TextAlign};

const BORDER: Rgb = Rgb(0x00, 0xff, 0xff);
const GRID: Rgb = Rgb(0x4b, 0x33, 0x4b);
const TEXT: Rgb = Rgb::WHITE;

const DB_TICKS: [f64; 5] = [0.0, 20.0, 40.0, 60.0, 80.0];
const FREQ_TICKS: [f64; 4] = [0.0, 5_000.0, 10_000.0, 15_000.0];
pub const FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// Everything one frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub width: f64,
    pub height: f64,
    pub display: &'a DisplayConfig,
    /// Current analyser frame; `None` when nothing is loaded.
    pub frame: Option<&'a [u8]>,
    pub sample_rate: u32,
    /// Analyser dB window, `(min, max)`.
    pub decibels: (f64, f64),
}

/// Composes layout, aggregation and coloring into one drawn frame.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    margins: Margins,
}

impl FrameRenderer {
    pub fn new(margins: Margins) -> Self {
        Self { margins }
    }

    /// Draws a full frame. Safe to call on every tick in any playback state.
    pub fn render(&self, surface: &mut impl Surface, input: &FrameInput<'_>) {
        let display = input.display;
        surface.clear(background(display.chroma_key_background));

        let geometry = Geometry::plan(input.width, input.height, self.margins);
        if geometry.is_empty() {
            return;
        }

        surface.stroke_rect(geometry.bounds(), BORDER);
        self.draw_amplitude_axis(surface, &geometry, display.show_axis_labels, input.decibels);

        if let Some(frame) = input.frame {
            let layout = BandLayout::plan(frame.len(), display.mode, geometry.width, display.band_count);
            for bar in aggregate(frame, &layout, &geometry) {
                let paint = paint_bar(
                    &bar,
                    layout.bar_count,
                    &geometry,
                    display.vertical_steps,
                    display.color_scheme,
                );
                for (rect, color) in paint.shapes() {
                    surface.fill_rect(rect, color);
                }
            }
        }

        let sample_rate = if input.sample_rate == 0 {
            FALLBACK_SAMPLE_RATE
        } else {
            input.sample_rate
        };
        self.draw_frequency_axis(surface, &geometry, sample_rate);
    }

    fn draw_amplitude_axis(
        &self,
        surface: &mut impl Surface,
        g: &Geometry,
        show_labels: bool,
        (min_db, max_db): (f64, f64),
    ) {
        let range = (max_db - min_db).max(f64::EPSILON);
        let label_x = self.margins.left - 10.0;

        if show_labels {
            for db in DB_TICKS {
                if db <= 0.0 || db >= range {
                    continue;
                }
                let y = g.end_y() - g.height * (1.0 - db / range);
                surface.line((g.start_x, y), (g.end_x(), y), GRID);
                surface.text(&format!("-{db}"), label_x, y + 6.0, TextAlign::Right, TEXT);
            }
        }

        surface.text("-0", label_x, g.start_y + 6.0, TextAlign::Right, TEXT);
        surface.text(&format!("-{range}"), label_x, g.end_y() + 6.0, TextAlign::Right, TEXT);

        if show_labels {
            surface.vertical_text(
                "AMPLITUDE (dB)",
                self.margins.left / 2.0,
                g.start_y + g.height / 2.0,
                TEXT,
            );
        }
    }

    fn draw_frequency_axis(&self, surface: &mut impl Surface, g: &Geometry, sample_rate: u32) {
        let nyquist = sample_rate as f64 / 2.0;
        let y = g.end_y() + 30.0;

        for freq in FREQ_TICKS.into_iter().chain(std::iter::once(nyquist)) {
            let ratio = freq / nyquist;
            if !(0.0..=1.0).contains(&ratio) {
                continue;
            }
            let align = if ratio == 1.0 {
                TextAlign::Right
            } else if ratio == 0.0 {
                TextAlign::Left
            } else {
                TextAlign::Center
            };
            let x = g.start_x + g.width * ratio;
            surface.text(&format_frequency(freq), x, y, align, TEXT);
        }

        surface.text("FREQUENCY (Hz)", g.end_x(), g.end_y() + 60.0, TextAlign::Right, TEXT);
    }
}

/// `15000` becomes `15`, `22050` becomes `22.1`, values under 1000 stay as
/// whole hertz.
pub fn format_frequency(freq: f64) -> String {
    if freq >= 1000.0 {
        let kilo = format!("{:.1}", freq / 1000.0);
        match kilo.strip_suffix(".0") {
            Some(whole) => whole.to_string(),
            None => kilo,
        }
    } else {
        format!("{}", freq.round() as i64)
    }
}
