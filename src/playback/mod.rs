pub mod clock;
pub mod progress;
pub mod time;

pub use clock::{CommandOutcome, IgnoreReason, PlaybackClock, PlaybackPhase, PlaybackState};
pub use progress::{ProgressIndicator, ProgressState, ProgressSynchronizer, SyncTick};
pub use time::{ManualTime, MonotonicTime, TimeSource};
