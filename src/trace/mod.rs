//! Silence trimming for raw pitch sequences.
//!
//! A trace keeps everything between the first and the last voiced frame,
//! interior silence included, and remembers where the voice started so the
//! chart can place every track on a common onset-relative axis.

pub mod axis;

use serde::Serialize;

use crate::types::{DisplayPoint, PitchAnalysis, PitchFrame, TrackSelection};

/// Display-ready pitch frames of one track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchTrace {
    /// Contiguous run from the first to the last voiced frame, inclusive
    pub frames: Vec<PitchFrame>,
    /// Absolute time of the first voiced frame (0 without voice)
    pub voice_onset: f64,
    /// Absolute time of the last voiced frame (0 without voice)
    pub voice_end: f64,
    pub has_voice: bool,
}

/// Trim leading and trailing unvoiced frames.
///
/// Pure and idempotent: the boundary frames of a trimmed trace are voiced, so
/// trimming its frames again returns the same frames.
pub fn trim(raw: &[PitchFrame]) -> PitchTrace {
    let Some(first) = raw.iter().position(PitchFrame::is_voiced) else {
        return PitchTrace::default();
    };
    let last = raw
        .iter()
        .rposition(PitchFrame::is_voiced)
        .unwrap_or(first);

    PitchTrace {
        frames: raw[first..=last].to_vec(),
        voice_onset: raw[first].time,
        voice_end: raw[last].time,
        has_voice: true,
    }
}

impl PitchTrace {
    pub fn from_analysis(analysis: &PitchAnalysis) -> Self {
        trim(&analysis.frames())
    }

    pub fn display_points(&self) -> Vec<DisplayPoint> {
        self.frames
            .iter()
            .map(|frame| axis::display_point(frame, self.voice_onset))
            .collect()
    }

    /// Length of the plotted curve on the display axis.
    pub fn display_duration(&self) -> f64 {
        if self.has_voice {
            axis::to_display(self.voice_end, self.voice_onset)
        } else {
            0.0
        }
    }

    /// Lowest and highest voiced pitch, if any frame is voiced.
    pub fn voiced_pitch_range(&self) -> Option<(f64, f64)> {
        self.frames
            .iter()
            .filter(|frame| frame.is_voiced())
            .fold(None, |range, frame| match range {
                None => Some((frame.pitch, frame.pitch)),
                Some((min, max)) => Some((min.min(frame.pitch), max.max(frame.pitch))),
            })
    }

    pub fn report(&self, track: TrackSelection) -> TraceReport {
        TraceReport {
            track,
            has_voice: self.has_voice,
            voice_onset: self.voice_onset,
            voice_end: self.voice_end,
            points: self.display_points(),
        }
    }
}

/// Serializable summary of a trimmed trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    pub track: TrackSelection,
    pub has_voice: bool,
    pub voice_onset: f64,
    pub voice_end: f64,
    pub points: Vec<DisplayPoint>,
}
