//! Core types shared by the trace, playback and source layers

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One analyzer frame: a timestamp and the detected pitch at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchFrame {
    /// Seconds from the start of the recording
    pub time: f64,
    /// Hz; zero (or anything non-positive) marks an unvoiced frame
    pub pitch: f64,
}

impl PitchFrame {
    pub fn new(time: f64, pitch: f64) -> Self {
        Self { time, pitch }
    }

    pub fn is_voiced(&self) -> bool {
        self.pitch > 0.0
    }
}

/// Pitch analysis payload as returned by the analysis and TTS services.
///
/// `time` and `pitch` are parallel arrays. `message` is informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchAnalysis {
    #[serde(default)]
    pub time: Vec<f64>,
    #[serde(default)]
    pub pitch: Vec<f64>,
    #[serde(default)]
    pub message: String,
}

impl PitchAnalysis {
    pub fn from_frames(frames: &[PitchFrame]) -> Self {
        Self {
            time: frames.iter().map(|f| f.time).collect(),
            pitch: frames.iter().map(|f| f.pitch).collect(),
            message: String::new(),
        }
    }

    /// Zip the parallel arrays into frames.
    ///
    /// Mismatched lengths are malformed input and yield an empty sequence.
    pub fn frames(&self) -> Vec<PitchFrame> {
        if self.time.len() != self.pitch.len() {
            warn!(
                time_len = self.time.len(),
                pitch_len = self.pitch.len(),
                "pitch analysis arrays differ in length; treating as empty"
            );
            return Vec::new();
        }
        self.time
            .iter()
            .zip(self.pitch.iter())
            .map(|(&time, &pitch)| PitchFrame::new(time, pitch))
            .collect()
    }
}

/// Which of the two compared tracks an action refers to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TrackSelection {
    Reference,
    #[default]
    User,
}

impl TrackSelection {
    pub const ALL: [TrackSelection; 2] = [TrackSelection::Reference, TrackSelection::User];

    /// Legend label used on the chart.
    pub fn label(self) -> &'static str {
        match self {
            TrackSelection::Reference => "Reference",
            TrackSelection::User => "Your Recording",
        }
    }

    pub fn other(self) -> Self {
        match self {
            TrackSelection::Reference => TrackSelection::User,
            TrackSelection::User => TrackSelection::Reference,
        }
    }
}

impl Display for TrackSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TrackSelection::Reference => write!(f, "reference"),
            TrackSelection::User => write!(f, "user"),
        }
    }
}

/// A value held once per track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackPair<T> {
    pub reference: T,
    pub user: T,
}

impl<T> TrackPair<T> {
    pub fn new(reference: T, user: T) -> Self {
        Self { reference, user }
    }

    pub fn get(&self, track: TrackSelection) -> &T {
        match track {
            TrackSelection::Reference => &self.reference,
            TrackSelection::User => &self.user,
        }
    }

    pub fn get_mut(&mut self, track: TrackSelection) -> &mut T {
        match track {
            TrackSelection::Reference => &mut self.reference,
            TrackSelection::User => &mut self.user,
        }
    }
}

/// A chart coordinate: seconds since the track's voice onset, and pitch.
///
/// `y` is `None` for unvoiced frames so the chart leaves a gap there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: Option<f64>,
}

/// Shared playhead position in display coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayheadState {
    pub position: Option<f64>,
}
