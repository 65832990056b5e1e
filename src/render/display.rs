use clap::ValueEnum;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Up to one bar per horizontal pixel.
    #[default]
    Detail,
    /// A small fixed number of wide bands.
    Grouped,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Detail => DisplayMode::Grouped,
            DisplayMode::Grouped => DisplayMode::Detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// One solid bar per position, colored by horizontal position.
    #[default]
    Gradient,
    Mono,
    /// Stacked blocks colored like a level meter.
    Tiered,
}

impl ColorScheme {
    pub fn next(self) -> Self {
        match self {
            ColorScheme::Gradient => ColorScheme::Mono,
            ColorScheme::Mono => ColorScheme::Tiered,
            ColorScheme::Tiered => ColorScheme::Gradient,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorScheme::Gradient => "gradient",
            ColorScheme::Mono => "mono",
            ColorScheme::Tiered => "tiered",
        }
    }
}

/// User-toggled presentation settings, read once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    /// Bar count in grouped mode.
    pub band_count: usize,
    pub show_axis_labels: bool,
    pub color_scheme: ColorScheme,
    pub chroma_key_background: bool,
    /// Vertical quantization steps.
    pub vertical_steps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Detail,
            band_count: 20,
            show_axis_labels: true,
            color_scheme: ColorScheme::Gradient,
            chroma_key_background: false,
            vertical_steps: 20,
        }
    }
}
