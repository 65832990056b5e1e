use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::clip::Clip;
use super::output::{AudioOutput, OutputEvent, StreamId, StreamIds};
use super::tap::SampleTap;
use crate::error::OutputError;

struct ActiveStream {
    id: StreamId,
    // Dropping the stream stops it.
    _stream: cpal::Stream,
    finished: Arc<AtomicBool>,
}

/// Plays clips on the default output device through cpal.
pub struct DeviceOutput {
    device: cpal::Device,
    config: cpal::StreamConfig,
    name: String,
    tap: SampleTap,
    ids: StreamIds,
    active: Option<ActiveStream>,
}

impl DeviceOutput {
    pub fn open(tap: SampleTap) -> Result<Self, OutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;

        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(OutputError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }
        let config: cpal::StreamConfig = supported.into();

        let name = match device.description() {
            Ok(description) => description.to_string(),
            Err(_) => "default output".to_string(),
        };
        log::info!(
            "Playing through: {} ({} Hz, {} ch)",
            name,
            config.sample_rate,
            config.channels
        );

        Ok(Self {
            device,
            config,
            name,
            tap,
            ids: StreamIds::default(),
            active: None,
        })
    }
}

impl AudioOutput for DeviceOutput {
    fn start(&mut self, clip: &Clip, offset: f64) -> Result<StreamId, OutputError> {
        self.stop();

        let samples = clip.samples().clone();
        let step = clip.sample_rate() as f64 / self.config.sample_rate as f64;
        let channels = (self.config.channels as usize).max(1);
        let mut cursor = clip.sample_index(offset) as f64;
        let finished = Arc::new(AtomicBool::new(false));
        let finished_cb = finished.clone();
        let tap = self.tap.clone();

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let first = (cursor as usize).min(samples.len());
                for frame in data.chunks_mut(channels) {
                    let idx = cursor as usize;
                    let value = match samples.get(idx) {
                        Some(&v) => {
                            cursor += step;
                            v
                        }
                        None => {
                            finished_cb.store(true, Ordering::Release);
                            0.0
                        }
                    };
                    frame.fill(value);
                }
                let last = (cursor as usize).min(samples.len());
                tap.push_slice(&samples[first..last]);
            },
            |err| log::error!("Output stream error: {}", err),
            None,
        )?;
        stream.play()?;

        let id = self.ids.next();
        log::debug!("Device stream {:?} started at {:.3}s", id, offset);
        self.active = Some(ActiveStream {
            id,
            _stream: stream,
            finished,
        });
        Ok(id)
    }

    fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            log::debug!("Device stream {:?} stopped", active.id);
            self.tap.clear();
        }
    }

    fn poll(&mut self) -> Option<OutputEvent> {
        let done = self
            .active
            .as_ref()
            .is_some_and(|a| a.finished.load(Ordering::Acquire));
        if !done {
            return None;
        }
        let active = self.active.take()?;
        self.tap.clear();
        Some(OutputEvent::Ended(active.id))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
