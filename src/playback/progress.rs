use super::clock::PlaybackClock;

/// Anything that can show a 0..=1 playback ratio.
pub trait ProgressIndicator {
    fn set_ratio(&mut self, ratio: f64);
}

/// The ratio most recently published.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressState {
    ratio: f64,
}

impl ProgressState {
    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl ProgressIndicator for ProgressState {
    fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio;
    }
}

/// What a call to [`ProgressSynchronizer::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncTick {
    /// Not running, or not due yet.
    Idle,
    Published(f64),
    /// Published 1.0 and stopped.
    Completed,
    /// Saw a non-playing clock and stopped without publishing.
    Stopped,
}

/// `elapsed / duration`, or 0 for an empty clip.
pub fn progress_ratio(elapsed: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        (elapsed / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Fixed-interval poller that copies clock position into an indicator.
///
/// There is only ever one pending deadline, so restarting replaces the
/// previous schedule instead of stacking a second poller on top of it.
#[derive(Debug)]
pub struct ProgressSynchronizer {
    interval: f64,
    next_due: Option<f64>,
}

impl ProgressSynchronizer {
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(0.001),
            next_due: None,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.next_due
    }

    /// Cancels any running schedule, then starts a fresh one.
    pub fn start(&mut self, now: f64) {
        if self.is_running() {
            log::debug!("Restarting progress poller");
        }
        self.cancel();
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Runs the tick if it is due.
    pub fn poll(
        &mut self,
        now: f64,
        clock: &mut PlaybackClock,
        indicator: &mut impl ProgressIndicator,
    ) -> SyncTick {
        match self.next_due {
            Some(due) if now >= due => {}
            _ => return SyncTick::Idle,
        }

        if !clock.is_playing() {
            self.cancel();
            return SyncTick::Stopped;
        }

        let duration = clock.duration();
        let elapsed = clock.sample_elapsed().clamp(0.0, duration);
        let ratio = progress_ratio(elapsed, duration);
        indicator.set_ratio(ratio);

        if elapsed >= duration {
            self.cancel();
            return SyncTick::Completed;
        }

        // Missed ticks are dropped rather than replayed in a burst.
        let mut next = self.next_due.unwrap_or(now) + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_due = Some(next);
        SyncTick::Published(ratio)
    }
}
