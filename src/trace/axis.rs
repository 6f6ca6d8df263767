//! Conversions between a track's absolute time and the shared display axis.
//!
//! Each track is shifted by its own voice onset, so both curves start at zero
//! on the chart even when the recordings begin speaking at different times.

use crate::types::{DisplayPoint, PitchFrame};

pub fn to_display(absolute_time: f64, voice_onset: f64) -> f64 {
    absolute_time - voice_onset
}

pub fn to_absolute(display_time: f64, voice_onset: f64) -> f64 {
    display_time + voice_onset
}

pub fn display_point(frame: &PitchFrame, voice_onset: f64) -> DisplayPoint {
    DisplayPoint {
        x: to_display(frame.time, voice_onset),
        y: frame.is_voiced().then_some(frame.pitch),
    }
}

/// Hover text showing both the display time and the original recording time.
pub fn tooltip_label(label: &str, point: &DisplayPoint, voice_onset: f64) -> String {
    let original = to_absolute(point.x, voice_onset);
    let hz = match point.y {
        Some(pitch) => format!("{} Hz", pitch.round() as i64),
        None => "—".to_string(),
    };
    format!(
        "{}: t={:.2}s (orig {:.2}s), {}",
        label, point.x, original, hz
    )
}
