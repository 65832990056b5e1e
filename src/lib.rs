pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod playback;
pub mod render;
pub mod session;
pub mod ui;

pub use session::{LoadStatus, Session, SessionSettings, UpdateReport};
