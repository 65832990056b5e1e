use std::sync::Arc;

use super::clip::Clip;
use super::tap::SampleTap;
use crate::error::OutputError;
use crate::playback::time::TimeSource;

/// Identifies one started output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    /// The stream played to the end of the clip without being stopped.
    Ended(StreamId),
}

/// The audio-device playback primitive.
///
/// At most one stream is alive. `start` tears down any previous stream
/// before starting the new one, and a stream that was stopped or replaced
/// never reports [`OutputEvent::Ended`].
pub trait AudioOutput {
    fn start(&mut self, clip: &Clip, offset: f64) -> Result<StreamId, OutputError>;
    fn stop(&mut self);
    /// Drains at most one pending event. Called once per loop iteration.
    fn poll(&mut self) -> Option<OutputEvent>;
    fn name(&self) -> &str;
}

/// Hands out increasing stream ids.
#[derive(Debug, Default)]
pub(crate) struct StreamIds {
    next: u64,
}

impl StreamIds {
    pub(crate) fn next(&mut self) -> StreamId {
        self.next += 1;
        StreamId(self.next)
    }
}

struct SimulatedStream {
    id: StreamId,
    clip: Clip,
    offset: f64,
    started_at: f64,
    fed_until: usize,
}

/// Output without a device: progress is derived from the time source.
///
/// Played samples are still pushed into the tap so the spectrum moves.
pub struct SimulatedOutput {
    time: Arc<dyn TimeSource>,
    tap: SampleTap,
    ids: StreamIds,
    active: Option<SimulatedStream>,
}

impl SimulatedOutput {
    pub fn new(time: Arc<dyn TimeSource>, tap: SampleTap) -> Self {
        Self {
            time,
            tap,
            ids: StreamIds::default(),
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl AudioOutput for SimulatedOutput {
    fn start(&mut self, clip: &Clip, offset: f64) -> Result<StreamId, OutputError> {
        self.stop();
        let id = self.ids.next();
        self.active = Some(SimulatedStream {
            id,
            clip: clip.clone(),
            offset,
            started_at: self.time.now(),
            fed_until: clip.sample_index(offset),
        });
        log::debug!("Simulated stream {:?} started at {:.3}s", id, offset);
        Ok(id)
    }

    fn stop(&mut self) {
        if let Some(stream) = self.active.take() {
            log::debug!("Simulated stream {:?} stopped", stream.id);
            self.tap.clear();
        }
    }

    fn poll(&mut self) -> Option<OutputEvent> {
        let stream = self.active.as_mut()?;
        let position = stream.offset + (self.time.now() - stream.started_at);

        let until = stream.clip.sample_index(position);
        if until > stream.fed_until {
            self.tap
                .push_slice(&stream.clip.samples()[stream.fed_until..until]);
            stream.fed_until = until;
        }

        if position >= stream.clip.duration() {
            let id = stream.id;
            self.active = None;
            self.tap.clear();
            return Some(OutputEvent::Ended(id));
        }
        None
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
