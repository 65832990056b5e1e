use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn user-supplied bytes into a playable clip.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or malformed audio: {0}")]
    Malformed(String),
    #[error("no audio track found")]
    NoTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("clip contains no samples")]
    Empty,
    #[error("decoder worker stopped before finishing")]
    WorkerLost,
}

impl From<symphonia::core::errors::Error> for DecodeError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        DecodeError::Malformed(err.to_string())
    }
}

/// Failure to open or drive the audio output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no output device found")]
    NoDevice,
    #[error("unsupported output sample format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}
