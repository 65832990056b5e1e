use clap::Parser;
use std::path::PathBuf;

use crate::render::{ColorScheme, DisplayMode};

#[derive(Parser, Debug)]
#[command(
    name = "spectrum_player",
    about = "Terminal audio player with a live frequency-spectrum display"
)]
pub struct Cli {
    /// Audio files to play (WAV, MP3, FLAC, OGG). `n` switches to the next one.
    pub inputs: Vec<PathBuf>,

    /// Config file (defaults to ./spectrum_player.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bar layout
    #[arg(short, long, value_enum)]
    pub mode: Option<DisplayMode>,

    /// Bar coloring
    #[arg(long, value_enum)]
    pub color: Option<ColorScheme>,

    /// Hide gridlines and axis titles
    #[arg(long)]
    pub no_labels: bool,

    /// Paint the background in the chroma-key color
    #[arg(long)]
    pub chroma_key: bool,

    /// Do not open an audio device; playback is simulated
    #[arg(long)]
    pub mute: bool,

    /// Display refresh rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Where log output goes (defaults to a file in the temp dir)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("spectrum_player.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_flags() {
        let cli = Cli::parse_from([
            "spectrum_player",
            "song.mp3",
            "other.wav",
            "--mode",
            "grouped",
            "--color",
            "tiered",
            "--no-labels",
            "--mute",
        ]);
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.mode, Some(DisplayMode::Grouped));
        assert_eq!(cli.color, Some(ColorScheme::Tiered));
        assert!(cli.no_labels);
        assert!(cli.mute);
        assert!(!cli.chroma_key);
    }
}
