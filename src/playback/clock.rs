use std::sync::Arc;

use super::time::TimeSource;
use crate::audio::{AudioOutput, Clip, OutputEvent, StreamId};
use crate::error::OutputError;

/// Raw transport bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Audio-clock time when the current play segment began.
    pub clock_start_reference: f64,
    /// Played duration accumulated before the current segment.
    pub paused_offset: f64,
    pub last_known_elapsed: f64,
}

/// Transport state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackPhase {
    Stopped,
    Paused { offset: f64 },
    Playing { since: f64, offset: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoClipLoaded,
    AlreadyPlaying,
    NotPlaying,
    /// The output could not start a stream.
    OutputFailed,
}

/// Result of a transport command that was not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Ignored(IgnoreReason),
}

impl CommandOutcome {
    pub fn applied(self) -> bool {
        self == CommandOutcome::Applied
    }
}

/// Owns the output connection and answers "where are we in the clip".
pub struct PlaybackClock {
    time: Arc<dyn TimeSource>,
    output: Box<dyn AudioOutput>,
    clip: Option<Clip>,
    state: PlaybackState,
    stream: Option<StreamId>,
    /// Set by `pause`, so a paused clock sought to 0 stays Paused.
    held: bool,
}

impl PlaybackClock {
    pub fn new(output: Box<dyn AudioOutput>, time: Arc<dyn TimeSource>) -> Self {
        Self {
            time,
            output,
            clip: None,
            state: PlaybackState::default(),
            stream: None,
            held: false,
        }
    }

    /// Installs a new clip, dropping whatever was playing. Starts Stopped(0).
    pub fn load(&mut self, clip: Clip) {
        self.output.stop();
        self.stream = None;
        self.state = PlaybackState::default();
        self.held = false;
        self.clip = Some(clip);
    }

    pub fn unload(&mut self) {
        self.output.stop();
        self.stream = None;
        self.state = PlaybackState::default();
        self.held = false;
        self.clip = None;
    }

    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    pub fn duration(&self) -> f64 {
        self.clip.as_ref().map_or(0.0, Clip::duration)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn output_name(&self) -> &str {
        self.output.name()
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.state.is_playing {
            PlaybackPhase::Playing {
                since: self.state.clock_start_reference,
                offset: self.state.paused_offset,
            }
        } else if self.held || self.state.paused_offset > 0.0 {
            PlaybackPhase::Paused {
                offset: self.state.paused_offset,
            }
        } else {
            PlaybackPhase::Stopped
        }
    }

    pub fn play(&mut self) -> Result<CommandOutcome, OutputError> {
        let Some(clip) = self.clip.as_ref() else {
            log::debug!("play ignored: no clip loaded");
            return Ok(CommandOutcome::Ignored(IgnoreReason::NoClipLoaded));
        };
        if self.state.is_playing {
            return Ok(CommandOutcome::Ignored(IgnoreReason::AlreadyPlaying));
        }

        let id = self.output.start(clip, self.state.paused_offset)?;
        self.stream = Some(id);
        self.state.clock_start_reference = self.time.now();
        self.state.is_playing = true;
        self.held = false;
        log::debug!("Playing from {:.3}s", self.state.paused_offset);
        Ok(CommandOutcome::Applied)
    }

    pub fn pause(&mut self) -> CommandOutcome {
        if self.clip.is_none() {
            log::debug!("pause ignored: no clip loaded");
            return CommandOutcome::Ignored(IgnoreReason::NoClipLoaded);
        }
        if !self.state.is_playing {
            return CommandOutcome::Ignored(IgnoreReason::NotPlaying);
        }

        let played = self.time.now() - self.state.clock_start_reference;
        self.halt_output();
        self.state.paused_offset = (self.state.paused_offset + played).clamp(0.0, self.duration());
        self.state.last_known_elapsed = self.state.paused_offset;
        self.held = true;
        log::debug!("Paused at {:.3}s", self.state.paused_offset);
        CommandOutcome::Applied
    }

    /// Moves to `target` seconds, clamped to the clip. A playing clock
    /// restarts its stream at the new offset.
    pub fn seek(&mut self, target: f64) -> Result<CommandOutcome, OutputError> {
        if self.clip.is_none() {
            log::debug!("seek ignored: no clip loaded");
            return Ok(CommandOutcome::Ignored(IgnoreReason::NoClipLoaded));
        }

        let duration = self.duration();
        let clamped = if target.is_nan() {
            0.0
        } else {
            target.clamp(0.0, duration)
        };
        if clamped != target {
            log::debug!("Seek target {:.3}s clamped to {:.3}s", target, clamped);
        }

        let was_playing = self.state.is_playing;
        if was_playing {
            self.halt_output();
        }
        self.state.paused_offset = clamped;
        self.state.last_known_elapsed = clamped;

        if was_playing {
            self.play()?;
        }
        Ok(CommandOutcome::Applied)
    }

    /// Back to Stopped(0) from any state.
    pub fn rewind(&mut self) -> CommandOutcome {
        if self.clip.is_none() {
            log::debug!("rewind ignored: no clip loaded");
            return CommandOutcome::Ignored(IgnoreReason::NoClipLoaded);
        }
        if self.state.is_playing {
            self.halt_output();
        }
        self.reset_to_start();
        CommandOutcome::Applied
    }

    /// Current position in seconds, always within `[0, duration]`.
    pub fn elapsed(&self) -> f64 {
        let duration = self.duration();
        let raw = if self.state.is_playing {
            self.state.paused_offset + (self.time.now() - self.state.clock_start_reference)
        } else {
            self.state.paused_offset
        };
        raw.clamp(0.0, duration)
    }

    /// Like [`elapsed`](Self::elapsed) but records the reading, never
    /// reporting less than the previous reading while playing.
    pub fn sample_elapsed(&mut self) -> f64 {
        let mut elapsed = self.elapsed();
        if self.state.is_playing {
            elapsed = elapsed.max(self.state.last_known_elapsed);
        }
        self.state.last_known_elapsed = elapsed;
        elapsed
    }

    /// Pumps the output once. Returns true if the clip ran out naturally.
    pub fn poll_output(&mut self) -> bool {
        match self.output.poll() {
            Some(event) => self.handle_event(event),
            None => false,
        }
    }

    pub fn handle_event(&mut self, event: OutputEvent) -> bool {
        match event {
            OutputEvent::Ended(id) => {
                if !self.state.is_playing || self.stream != Some(id) {
                    log::debug!("Ignoring end of stale stream {:?}", id);
                    return false;
                }
                log::info!("Clip finished, returning to start");
                self.stream = None;
                self.reset_to_start();
                true
            }
        }
    }

    fn halt_output(&mut self) {
        self.output.stop();
        self.stream = None;
        self.state.is_playing = false;
    }

    fn reset_to_start(&mut self) {
        self.state.is_playing = false;
        self.held = false;
        self.state.paused_offset = 0.0;
        self.state.last_known_elapsed = 0.0;
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.output.stop();
    }
}
