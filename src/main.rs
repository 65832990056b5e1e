use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use spectrum_player::audio::device::DeviceOutput;
use spectrum_player::audio::{AudioOutput, SimulatedOutput};
use spectrum_player::cli::Cli;
use spectrum_player::config::Config;
use spectrum_player::playback::{MonotonicTime, TimeSource};
use spectrum_player::render::Margins;
use spectrum_player::ui::{self, App};
use spectrum_player::{Session, SessionSettings};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the UI, so logs go to a file.
    let log_path = cli.log_path();
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let config = Config::resolve(&cli);
    let settings = SessionSettings {
        display: config.display,
        analyser: config.analyser,
        progress_interval: config.timing.progress_interval(),
        margins: Margins::default(),
    };

    let time: Arc<dyn TimeSource> = Arc::new(MonotonicTime::new());
    let sim_time = time.clone();
    let mute = cli.mute;
    let session = Session::create(settings, time, move |tap| -> Box<dyn AudioOutput> {
        if mute {
            return Box::new(SimulatedOutput::new(sim_time, tap));
        }
        match DeviceOutput::open(tap.clone()) {
            Ok(device) => Box::new(device),
            Err(err) => {
                log::warn!("{}; falling back to silent playback", err);
                Box::new(SimulatedOutput::new(sim_time, tap))
            }
        }
    });

    if cli.inputs.is_empty() {
        log::info!("No input files given");
    }
    let mut app = App::new(session, cli.inputs, config.timing.frame_interval());
    app.load_first();
    ui::run(&mut app)
}
