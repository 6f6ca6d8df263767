//! Pitch-contour comparison for tone practice.
//!
//! Trims reference and learner pitch traces to their voice onsets, plots both
//! on a shared onset-relative axis, and keeps a single playhead in sync with
//! whichever recording is playing.

pub mod audio;
pub mod cli;
pub mod config;
pub mod playback;
pub mod source;
pub mod trace;
pub mod types;
pub mod ui;
