use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of audio-clock time in seconds.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> f64;
}

/// Seconds since construction, from the monotonic system clock.
#[derive(Debug)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Time that only moves when told to. Stored as whole microseconds.
#[derive(Debug, Default)]
pub struct ManualTime {
    micros: AtomicU64,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.micros
            .store(to_micros(seconds), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.micros
            .fetch_add(to_micros(seconds), Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1_000_000.0
    }
}

fn to_micros(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1_000_000.0).round() as u64
}
