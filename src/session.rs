//! The player session: one object owning the clip, the transport, the
//! progress poller, the analyser and the display settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

use crate::audio::decode::{decode_bytes, spawn_decode};
use crate::audio::{AnalyserSettings, AudioOutput, Clip, ClipInfo, FrequencyAnalyser, SampleTap};
use crate::error::{DecodeError, OutputError};
use crate::playback::{
    CommandOutcome, IgnoreReason, PlaybackClock, PlaybackPhase, ProgressIndicator, ProgressState,
    ProgressSynchronizer, SyncTick, TimeSource,
};
use crate::render::{ColorScheme, DisplayConfig, FrameInput, FrameRenderer, Margins, Surface};

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub display: DisplayConfig,
    pub analyser: AnalyserSettings,
    /// Seconds between progress updates while playing.
    pub progress_interval: f64,
    pub margins: Margins,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            analyser: AnalyserSettings::default(),
            progress_interval: 0.05,
            margins: Margins::default(),
        }
    }
}

/// Where clip loading stands, shown to the user as a status line.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Decoding(String),
    Loaded(String),
    Failed(String),
}

impl LoadStatus {
    pub fn message(&self) -> String {
        match self {
            LoadStatus::Idle => "SELECT A FILE".to_string(),
            LoadStatus::Decoding(name) => format!("DECODING... {name}"),
            LoadStatus::Loaded(name) => format!("LOADED {name}"),
            LoadStatus::Failed(reason) => format!("DECODE FAILED: {reason}"),
        }
    }
}

/// What one call to [`Session::update`] observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateReport {
    pub progress: SyncTick,
    /// The clip played out and the transport went back to the start.
    pub finished: bool,
}

struct PendingLoad {
    name: String,
    rx: Receiver<Result<Clip, DecodeError>>,
}

pub struct Session {
    time: Arc<dyn TimeSource>,
    clock: PlaybackClock,
    progress: ProgressSynchronizer,
    indicator: ProgressState,
    display: DisplayConfig,
    analyser: FrequencyAnalyser,
    tap: SampleTap,
    renderer: FrameRenderer,
    status: LoadStatus,
    pending: Option<PendingLoad>,
    output_error: Option<String>,
}

impl Session {
    /// Builds a session; `make_output` receives the tap the output must feed.
    pub fn create(
        settings: SessionSettings,
        time: Arc<dyn TimeSource>,
        make_output: impl FnOnce(SampleTap) -> Box<dyn AudioOutput>,
    ) -> Self {
        let analyser = FrequencyAnalyser::new(settings.analyser);
        let tap = SampleTap::new(analyser.settings().fft_size);
        let output = make_output(tap.clone());
        log::info!("Audio output: {}", output.name());

        Self {
            clock: PlaybackClock::new(output, time.clone()),
            time,
            progress: ProgressSynchronizer::new(settings.progress_interval),
            indicator: ProgressState::default(),
            display: settings.display,
            analyser,
            tap,
            renderer: FrameRenderer::new(settings.margins),
            status: LoadStatus::Idle,
            pending: None,
            output_error: None,
        }
    }

    /// Starts decoding `path` in the background. The clip is installed by a
    /// later [`update`](Self::update) once decoding finishes.
    pub fn begin_load(&mut self, path: &Path) {
        let name = display_name(path);
        log::info!("Decoding {}", path.display());
        self.pending = Some(PendingLoad {
            name: name.clone(),
            rx: spawn_decode(PathBuf::from(path)),
        });
        self.status = LoadStatus::Decoding(name);
    }

    /// Decodes in-memory file bytes right away.
    pub fn load_bytes(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        extension: Option<&str>,
    ) -> Result<ClipInfo, DecodeError> {
        self.pending = None;
        match decode_bytes(bytes, extension) {
            Ok(clip) => {
                let info = clip.info();
                self.install_clip(clip, name);
                Ok(info)
            }
            Err(err) => {
                self.fail_load(&err);
                Err(err)
            }
        }
    }

    /// Replaces the current clip. The transport starts Stopped at 0.
    pub fn install_clip(&mut self, clip: Clip, name: &str) {
        let info = clip.info();
        self.pending = None;
        self.progress.cancel();
        self.clock.load(clip);
        self.analyser.reset();
        self.indicator.set_ratio(0.0);
        self.output_error = None;
        self.status = LoadStatus::Loaded(name.to_string());
        log::info!(
            "Loaded {}: {:.2}s at {} Hz",
            name,
            info.duration,
            info.sample_rate
        );
    }

    /// Picks up a finished background decode, if any.
    pub fn poll_load(&mut self) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(DecodeError::WorkerLost),
        };
        let Some(pending) = self.pending.take() else {
            return;
        };
        match result {
            Ok(clip) => self.install_clip(clip, &pending.name),
            Err(err) => self.fail_load(&err),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Tears everything down; the session goes back to its initial state.
    pub fn dispose(&mut self) {
        self.progress.cancel();
        self.pending = None;
        self.clock.unload();
        self.analyser.reset();
        self.indicator.set_ratio(0.0);
        self.output_error = None;
        self.status = LoadStatus::Idle;
    }

    pub fn play(&mut self) -> CommandOutcome {
        match self.clock.play() {
            Ok(CommandOutcome::Applied) => {
                self.output_error = None;
                self.progress.start(self.time.now());
                self.publish_elapsed();
                CommandOutcome::Applied
            }
            Ok(outcome) => outcome,
            Err(err) => self.fail_output(err),
        }
    }

    pub fn pause(&mut self) -> CommandOutcome {
        let outcome = self.clock.pause();
        if outcome.applied() {
            self.progress.cancel();
            self.publish_elapsed();
        }
        outcome
    }

    pub fn toggle_play(&mut self) -> CommandOutcome {
        if self.clock.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Jumps to `seconds`, clamped to the clip.
    pub fn seek(&mut self, seconds: f64) -> CommandOutcome {
        let result = self.clock.seek(seconds);
        // The poller is restarted so its next tick lands a full interval
        // after the new position.
        if self.clock.is_playing() {
            self.progress.start(self.time.now());
        } else {
            self.progress.cancel();
        }
        match result {
            Ok(outcome) => {
                if outcome.applied() {
                    self.publish_elapsed();
                }
                outcome
            }
            Err(err) => {
                self.publish_elapsed();
                self.fail_output(err)
            }
        }
    }

    /// Seeks to a fraction of the clip, as a click on the progress bar does.
    pub fn seek_ratio(&mut self, ratio: f64) -> CommandOutcome {
        let duration = self.clock.duration();
        self.seek(ratio.clamp(0.0, 1.0) * duration)
    }

    pub fn skip(&mut self, delta: f64) -> CommandOutcome {
        let target = self.clock.elapsed() + delta;
        self.seek(target)
    }

    pub fn rewind(&mut self) -> CommandOutcome {
        let outcome = self.clock.rewind();
        if outcome.applied() {
            self.progress.cancel();
            self.indicator.set_ratio(0.0);
        }
        outcome
    }

    /// Runs the due progress tick and reacts to the output finishing.
    pub fn update(&mut self) -> UpdateReport {
        self.poll_load();

        let now = self.time.now();
        let progress = self.progress.poll(now, &mut self.clock, &mut self.indicator);

        let finished = self.clock.poll_output();
        if finished {
            self.progress.cancel();
            self.indicator.set_ratio(0.0);
        }
        UpdateReport { progress, finished }
    }

    /// When the progress poller next wants to run, on the session clock.
    pub fn next_deadline(&self) -> Option<f64> {
        self.progress.next_deadline()
    }

    pub fn now(&self) -> f64 {
        self.time.now()
    }

    /// Pulls one analyser frame and draws the spectrum onto `surface`.
    pub fn render_frame(&mut self, surface: &mut impl Surface, width: f64, height: f64) {
        let loaded = self.clock.clip().is_some();
        if loaded {
            self.analyser.refresh(&self.tap);
        }
        let settings = self.analyser.settings();
        let input = FrameInput {
            width,
            height,
            display: &self.display,
            frame: loaded.then(|| self.analyser.frame()),
            sample_rate: self.clock.clip().map_or(0, Clip::sample_rate),
            decibels: (settings.min_decibels as f64, settings.max_decibels as f64),
        };
        self.renderer.render(surface, &input);
    }

    pub fn toggle_mode(&mut self) {
        self.display.mode = self.display.mode.toggled();
        log::debug!("Display mode: {:?}", self.display.mode);
    }

    pub fn toggle_labels(&mut self) {
        self.display.show_axis_labels = !self.display.show_axis_labels;
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.display.color_scheme = scheme;
    }

    pub fn cycle_color_scheme(&mut self) {
        self.display.color_scheme = self.display.color_scheme.next();
        log::debug!("Color scheme: {}", self.display.color_scheme.label());
    }

    pub fn toggle_chroma(&mut self) {
        self.display.chroma_key_background = !self.display.chroma_key_background;
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn controls_enabled(&self) -> bool {
        self.clock.clip().is_some()
    }

    pub fn clip_info(&self) -> Option<ClipInfo> {
        self.clock.clip().map(Clip::info)
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.clock.phase()
    }

    pub fn progress_ratio(&self) -> f64 {
        self.indicator.ratio()
    }

    pub fn progress_running(&self) -> bool {
        self.progress.is_running()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Status line text; output failures take precedence.
    pub fn status_message(&self) -> String {
        match &self.output_error {
            Some(err) => format!("OUTPUT ERROR: {err}"),
            None => self.status.message(),
        }
    }

    pub fn output_name(&self) -> &str {
        self.clock.output_name()
    }

    fn publish_elapsed(&mut self) {
        let ratio = crate::playback::progress::progress_ratio(self.clock.elapsed(), self.clock.duration());
        self.indicator.set_ratio(ratio);
    }

    fn fail_load(&mut self, err: &DecodeError) {
        log::error!("Audio decoding failed: {}", err);
        self.status = LoadStatus::Failed(err.to_string());
    }

    fn fail_output(&mut self, err: OutputError) -> CommandOutcome {
        log::error!("Audio output failed: {}", err);
        self.output_error = Some(err.to_string());
        CommandOutcome::Ignored(IgnoreReason::OutputFailed)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SimulatedOutput;
    use crate::playback::ManualTime;
    use crate::render::{DisplayMode, DrawList};
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;

    fn session() -> (Arc<ManualTime>, Session) {
        let time = Arc::new(ManualTime::new());
        let sim_time = time.clone();
        let session = Session::create(SessionSettings::default(), time.clone(), move |tap| {
            Box::new(SimulatedOutput::new(sim_time, tap))
        });
        (time, session)
    }

    fn loaded(seconds: usize) -> (Arc<ManualTime>, Session) {
        let (time, mut s) = session();
        s.install_clip(Clip::from_samples(vec![0.0; seconds * 1000], 1000), "clip.wav");
        (time, s)
    }

    /// Advances in poll-sized steps, running the loop body each time.
    fn run_for(time: &ManualTime, s: &mut Session, seconds: f64) -> Vec<UpdateReport> {
        let steps = (seconds / 0.01).round() as usize;
        (0..steps)
            .map(|_| {
                time.advance(0.01);
                s.update()
            })
            .collect()
    }

    #[test]
    fn fresh_session_has_controls_disabled() {
        let (_time, mut s) = session();
        assert!(!s.controls_enabled());
        assert_eq!(s.status_message(), "SELECT A FILE");
        assert_eq!(s.play(), CommandOutcome::Ignored(IgnoreReason::NoClipLoaded));
        assert_eq!(s.seek_ratio(0.5), CommandOutcome::Ignored(IgnoreReason::NoClipLoaded));
        assert_eq!(s.rewind(), CommandOutcome::Ignored(IgnoreReason::NoClipLoaded));
        assert!(!s.progress_running());
    }

    #[test]
    fn failed_decode_is_reported_and_recoverable() {
        let (_time, mut s) = session();
        assert!(s.load_bytes("junk.bin", vec![7; 256], None).is_err());
        assert!(matches!(s.status(), LoadStatus::Failed(_)));
        assert!(s.status_message().starts_with("DECODE FAILED"));
        assert!(!s.controls_enabled());

        s.install_clip(Clip::from_samples(vec![0.0; 1000], 1000), "good.wav");
        assert!(s.controls_enabled());
        assert_eq!(s.status_message(), "LOADED good.wav");
    }

    #[test]
    fn paused_seek_updates_indicator_immediately() {
        let (_time, mut s) = loaded(10);
        s.seek(7.0);
        assert_approx_eq!(s.progress_ratio(), 0.7);
        assert!(!s.progress_running());
        s.seek_ratio(0.25);
        assert_approx_eq!(s.elapsed(), 2.5);
    }

    #[test]
    fn playing_drives_the_poller() {
        let (time, mut s) = loaded(10);
        s.play();
        assert!(s.progress_running());
        run_for(&time, &mut s, 1.0);
        assert_approx_eq!(s.progress_ratio(), 0.1, 0.006);

        s.pause();
        assert!(!s.progress_running());
        assert_approx_eq!(s.progress_ratio(), 0.1);
    }

    #[test]
    fn natural_end_resets_indicator_once() {
        let (time, mut s) = loaded(1);
        s.play();
        let mut ratios = Vec::new();
        let mut finished = 0;
        for _ in 0..150 {
            time.advance(0.01);
            let report = s.update();
            if report.finished {
                finished += 1;
            }
            ratios.push(s.progress_ratio());
        }
        assert_eq!(finished, 1);
        assert_eq!(s.phase(), PlaybackPhase::Stopped);
        assert_eq!(s.progress_ratio(), 0.0);

        let peak = ratios
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!(ratios[peak] >= 0.95);
        assert!(ratios[..=peak].windows(2).all(|w| w[0] <= w[1]));
        assert!(ratios[peak + 1..].iter().all(|&r| r == 0.0));
    }

    #[test]
    fn seek_while_playing_restarts_the_poller() {
        let (time, mut s) = loaded(10);
        s.play();
        run_for(&time, &mut s, 1.0);
        s.seek(2.0);

        assert!(s.is_playing());
        assert_approx_eq!(s.elapsed(), 2.0);
        assert_approx_eq!(s.progress_ratio(), 0.2);
        let deadline = s.next_deadline().unwrap();
        assert_approx_eq!(deadline, s.now() + 0.05);

        run_for(&time, &mut s, 0.5);
        assert_approx_eq!(s.progress_ratio(), 0.25, 0.006);
    }

    #[test]
    fn installed_clip_wins_over_a_pending_decode() {
        let (_time, mut s) = session();
        s.begin_load(Path::new("/no/such/dir/late.wav"));
        s.install_clip(Clip::from_samples(vec![0.0; 1000], 1000), "now.wav");
        assert!(!s.is_loading());

        std::thread::sleep(std::time::Duration::from_millis(50));
        s.update();
        assert_eq!(s.status(), &LoadStatus::Loaded("now.wav".to_string()));
        assert!(s.controls_enabled());
    }

    #[test]
    fn rewind_while_playing_stops_everything() {
        let (time, mut s) = loaded(10);
        s.play();
        run_for(&time, &mut s, 0.5);
        s.rewind();
        assert_eq!(s.elapsed(), 0.0);
        assert!(!s.is_playing());
        assert!(!s.progress_running());
        assert_eq!(s.progress_ratio(), 0.0);
    }

    #[test]
    fn loading_a_new_clip_replaces_the_old_one() {
        let (time, mut s) = loaded(10);
        s.play();
        run_for(&time, &mut s, 0.3);
        s.install_clip(Clip::from_samples(vec![0.0; 4000], 2000), "next.wav");
        assert_eq!(s.phase(), PlaybackPhase::Stopped);
        assert_eq!(s.progress_ratio(), 0.0);
        assert_eq!(
            s.clip_info(),
            Some(ClipInfo {
                duration: 2.0,
                sample_rate: 2000
            })
        );
    }

    #[test]
    fn dispose_returns_to_initial_state() {
        let (_time, mut s) = loaded(3);
        s.play();
        s.dispose();
        assert!(!s.controls_enabled());
        assert_eq!(s.status(), &LoadStatus::Idle);
        assert_eq!(s.elapsed(), 0.0);
    }

    #[test]
    fn display_toggles_flip_settings() {
        let (_time, mut s) = session();
        s.toggle_mode();
        s.toggle_labels();
        s.toggle_chroma();
        s.cycle_color_scheme();
        let d = s.display();
        assert_eq!(d.mode, DisplayMode::Grouped);
        assert!(!d.show_axis_labels);
        assert!(d.chroma_key_background);
        assert_eq!(d.color_scheme, ColorScheme::Mono);
        s.set_color_scheme(ColorScheme::Tiered);
        assert_eq!(s.display().color_scheme, ColorScheme::Tiered);
    }

    #[test]
    fn renders_with_and_without_a_clip() {
        let (time, mut s) = session();
        let mut list = DrawList::new();
        s.render_frame(&mut list, 1280.0, 720.0);
        assert!(!list.ops().is_empty());

        s.install_clip(Clip::from_samples(vec![0.5; 8000], 8000), "tone.wav");
        s.toggle_mode();
        s.play();
        time.advance(0.2);
        s.update();
        let mut list = DrawList::new();
        s.render_frame(&mut list, 1280.0, 720.0);
        let fills = list
            .ops()
            .iter()
            .filter(|op| matches!(op, crate::render::DrawOp::FillRect(..)))
            .count();
        assert_eq!(fills, 20);
    }
}
