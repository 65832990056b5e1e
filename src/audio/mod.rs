pub mod analyser;
pub mod clip;
pub mod decode;
pub mod device;
pub mod output;
pub mod tap;

pub use analyser::{AnalyserSettings, FrequencyAnalyser};
pub use clip::{Clip, ClipInfo};
pub use output::{AudioOutput, OutputEvent, SimulatedOutput, StreamId};
pub use tap::SampleTap;
