use std::sync::Arc;

/// Immutable facts about a decoded clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipInfo {
    /// Length in seconds.
    pub duration: f64,
    pub sample_rate: u32,
}

/// A decoded clip: mono samples plus their [`ClipInfo`].
///
/// Samples are shared with output streams, so cloning a `Clip` is cheap.
#[derive(Debug, Clone)]
pub struct Clip {
    info: ClipInfo,
    samples: Arc<[f32]>,
}

impl Clip {
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f64 / sample_rate as f64
        };
        Self {
            info: ClipInfo {
                duration,
                sample_rate,
            },
            samples: samples.into(),
        }
    }

    pub fn info(&self) -> ClipInfo {
        self.info
    }

    pub fn duration(&self) -> f64 {
        self.info.duration
    }

    pub fn sample_rate(&self) -> u32 {
        self.info.sample_rate
    }

    pub fn samples(&self) -> &Arc<[f32]> {
        &self.samples
    }

    /// Index of the first sample at `offset` seconds, clamped to the clip.
    pub fn sample_index(&self, offset: f64) -> usize {
        let idx = (offset.max(0.0) * self.info.sample_rate as f64) as usize;
        idx.min(self.samples.len())
    }
}
