use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::AnalyserSettings;
use crate::cli::Cli;
use crate::render::DisplayConfig;

pub const LOCAL_CONFIG: &str = "spectrum_player.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub analyser: AnalyserSettings,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: default_progress_interval_ms(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl TimingConfig {
    pub fn progress_interval(&self) -> f64 {
        self.progress_interval_ms.max(1) as f64 / 1000.0
    }

    pub fn frame_interval(&self) -> f64 {
        1.0 / self.frame_rate.clamp(1, 240) as f64
    }
}

fn default_progress_interval_ms() -> u64 { 50 }
fn default_frame_rate() -> u32 { 60 }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Explicit path first, then `./spectrum_player.toml`, then the user config dir.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    let global = dirs::config_dir()?.join("spectrum_player").join("config.toml");
    global.exists().then_some(global)
}

impl Config {
    /// Resolves and loads the config for `cli`, falling back to defaults.
    pub fn resolve(cli: &Cli) -> Self {
        let mut config = match find_config(cli.config.as_deref()) {
            Some(path) => match load_config(&path) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path.display());
                    cfg
                }
                Err(err) => {
                    log::warn!("{:#}; using defaults", err);
                    Config::default()
                }
            },
            None => Config::default(),
        };
        config.apply_cli(cli);
        config
    }

    /// Command-line flags win over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(mode) = cli.mode {
            self.display.mode = mode;
        }
        if let Some(color) = cli.color {
            self.display.color_scheme = color;
        }
        if cli.no_labels {
            self.display.show_axis_labels = false;
        }
        if cli.chroma_key {
            self.display.chroma_key_background = true;
        }
        if let Some(fps) = cli.fps {
            self.timing.frame_rate = fps;
        }
    }
}
