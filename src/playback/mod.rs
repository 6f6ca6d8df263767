//! Playhead synchronization between the pitch chart and the two audio tracks.
//!
//! The controller is the single owner of the track selection and the cursor
//! position. Audio resources are injected through [`AudioTrack`]; the chart
//! reports clicks in display time and the controller translates them into
//! absolute seek times for the selected track.

pub mod rodio_track;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::trace::axis::{to_absolute, to_display};
use crate::trace::PitchTrace;
use crate::types::{PlayheadState, TrackPair, TrackSelection};

/// Slack allowed past the last plotted frame when validating a click.
const CLICK_TOLERANCE: f64 = 1e-9;

/// Non-fatal conditions surfaced to the caller of the controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CursorError {
    #[error("click at {time}s does not map onto the plotted {track} trace")]
    InvalidClickTarget { time: f64, track: TrackSelection },
    #[error("no audio loaded for the {0} track")]
    NoAudioLoaded(TrackSelection),
    #[error("{track} audio rejected the command: {reason}")]
    Audio {
        track: TrackSelection,
        reason: String,
    },
}

/// Position and lifecycle notifications emitted by an audio resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackEvent {
    /// Current playback position in absolute seconds
    Progress(f64),
    Ended,
}

/// A seekable, playable audio resource owned by the host.
pub trait AudioTrack {
    fn seek(&mut self, seconds: f64) -> anyhow::Result<()>;
    fn play(&mut self) -> anyhow::Result<()>;
    fn stop(&mut self);
    /// Next pending event, if any. Called once per host frame.
    fn poll(&mut self) -> Option<TrackEvent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Playing,
}

/// Result of feeding a progress report to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressOutcome {
    /// The cursor moved to this display position
    Applied(f64),
    /// The report came from a track that does not drive the cursor
    Stale,
}

#[derive(Debug, Clone, Copy, Default)]
struct TrackTiming {
    voice_onset: f64,
    display_duration: f64,
    has_voice: bool,
}

impl From<&PitchTrace> for TrackTiming {
    fn from(trace: &PitchTrace) -> Self {
        Self {
            voice_onset: trace.voice_onset,
            display_duration: trace.display_duration(),
            has_voice: trace.has_voice,
        }
    }
}

pub struct PlaybackCursorController<A: AudioTrack> {
    selection: TrackSelection,
    cursor: PlayheadState,
    /// Track most recently started; only it may move the cursor
    active: Option<TrackSelection>,
    phase: PlaybackPhase,
    timing: TrackPair<TrackTiming>,
    audio: TrackPair<Option<A>>,
}

impl<A: AudioTrack> Default for PlaybackCursorController<A> {
    fn default() -> Self {
        Self {
            selection: TrackSelection::default(),
            cursor: PlayheadState::default(),
            active: None,
            phase: PlaybackPhase::Idle,
            timing: TrackPair::default(),
            audio: TrackPair::new(None, None),
        }
    }
}

impl<A: AudioTrack> PlaybackCursorController<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> TrackSelection {
        self.selection
    }

    pub fn cursor(&self) -> PlayheadState {
        self.cursor
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn active_track(&self) -> Option<TrackSelection> {
        self.active
    }

    pub fn voice_onset(&self, track: TrackSelection) -> f64 {
        self.timing.get(track).voice_onset
    }

    pub fn audio(&self, track: TrackSelection) -> Option<&A> {
        self.audio.get(track).as_ref()
    }

    /// Install the audio resource for `track`, returning the one it replaces.
    pub fn attach_audio(&mut self, track: TrackSelection, audio: A) -> Option<A> {
        if self.active == Some(track) {
            self.active = None;
            self.phase = PlaybackPhase::Idle;
        }
        info!(%track, "audio attached");
        self.audio.get_mut(track).replace(audio)
    }

    /// Remove and stop the audio resource for `track`.
    pub fn detach_audio(&mut self, track: TrackSelection) -> Option<A> {
        if self.active == Some(track) {
            self.active = None;
            self.phase = PlaybackPhase::Idle;
        }
        let mut audio = self.audio.get_mut(track).take()?;
        audio.stop();
        debug!(%track, "audio detached");
        Some(audio)
    }

    /// Adopt the onset and extent of a freshly trimmed trace.
    pub fn set_trace(&mut self, track: TrackSelection, trace: &PitchTrace) {
        *self.timing.get_mut(track) = TrackTiming::from(trace);
        if self.active == Some(track) {
            self.cursor = PlayheadState::default();
        }
        debug!(
            %track,
            voice_onset = trace.voice_onset,
            voice_end = trace.voice_end,
            has_voice = trace.has_voice,
            "trace timing updated"
        );
    }

    /// Choose which audio resource future clicks target. Never starts playback.
    pub fn select_track(&mut self, which: TrackSelection) {
        if self.selection != which {
            info!(from = %self.selection, to = %which, "track selection changed");
        }
        self.selection = which;
    }

    /// Seek the selected track to the absolute time under a chart click.
    ///
    /// The display time is mapped back with the onset of the dataset that was
    /// clicked; the audio that responds is always the selected track's.
    pub fn on_chart_click(
        &mut self,
        display_time: f64,
        clicked: TrackSelection,
    ) -> Result<f64, CursorError> {
        let timing = *self.timing.get(clicked);
        let in_range = display_time.is_finite()
            && timing.has_voice
            && display_time >= 0.0
            && display_time <= timing.display_duration + CLICK_TOLERANCE;
        if !in_range {
            warn!(
                display_time,
                dataset = %clicked,
                duration = timing.display_duration,
                "ignoring click outside the plotted range"
            );
            return Err(CursorError::InvalidClickTarget {
                time: display_time,
                track: clicked,
            });
        }
        let absolute = to_absolute(display_time, timing.voice_onset);
        self.on_seek_requested(absolute)?;
        Ok(absolute)
    }

    /// Start the selected track from `absolute_time`.
    pub fn on_seek_requested(&mut self, absolute_time: f64) -> Result<(), CursorError> {
        let track = self.selection;
        if !absolute_time.is_finite() {
            warn!(%track, absolute_time, "ignoring non-finite seek");
            return Err(CursorError::InvalidClickTarget {
                time: absolute_time,
                track,
            });
        }
        let Some(audio) = self.audio.get_mut(track).as_mut() else {
            warn!(%track, "seek requested but no audio is loaded");
            return Err(CursorError::NoAudioLoaded(track));
        };
        if let Err(err) = audio.seek(absolute_time).and_then(|_| audio.play()) {
            warn!(%track, error = %err, "seek-and-play failed");
            return Err(CursorError::Audio {
                track,
                reason: err.to_string(),
            });
        }
        info!(%track, seconds = absolute_time, "playing from seek position");
        if let Some(previous) = self.active.filter(|&previous| previous != track) {
            if let Some(audio) = self.audio.get_mut(previous).as_mut() {
                audio.stop();
            }
            debug!(%previous, "superseded track stopped");
        }
        self.on_playback_started(track);
        Ok(())
    }

    /// Playback began on `track`, either from a seek or from host controls.
    pub fn on_playback_started(&mut self, track: TrackSelection) {
        self.active = Some(track);
        self.phase = PlaybackPhase::Playing;
    }

    pub fn on_time_progress(
        &mut self,
        track: TrackSelection,
        absolute_time: f64,
    ) -> ProgressOutcome {
        let accepted = self.phase == PlaybackPhase::Playing
            && self.active == Some(track)
            && self.selection == track
            && absolute_time.is_finite();
        if !accepted {
            debug!(
                %track,
                active = ?self.active,
                selection = %self.selection,
                "dropping stale progress event"
            );
            return ProgressOutcome::Stale;
        }
        let position = to_display(absolute_time, self.timing.get(track).voice_onset);
        self.cursor.position = Some(position);
        ProgressOutcome::Applied(position)
    }

    pub fn on_ended(&mut self, track: TrackSelection) {
        if self.active == Some(track) {
            info!(%track, "playback reached the end of the track");
            self.active = None;
            self.phase = PlaybackPhase::Idle;
        } else {
            debug!(%track, "end reported by an inactive track");
        }
    }

    /// Silence every attached track, not only the one driving the cursor.
    pub fn stop(&mut self) {
        for track in TrackSelection::ALL {
            if let Some(audio) = self.audio.get_mut(track).as_mut() {
                audio.stop();
            }
        }
        if let Some(track) = self.active.take() {
            info!(%track, "playback stopped");
        }
        self.phase = PlaybackPhase::Idle;
    }

    /// Dispatch pending audio events. Returns true when the cursor moved.
    pub fn pump(&mut self) -> bool {
        let mut events = Vec::new();
        for track in TrackSelection::ALL {
            if let Some(event) = self.audio.get_mut(track).as_mut().and_then(A::poll) {
                events.push((track, event));
            }
        }
        let mut moved = false;
        for (track, event) in events {
            match event {
                TrackEvent::Progress(seconds) => {
                    moved |= matches!(
                        self.on_time_progress(track, seconds),
                        ProgressOutcome::Applied(_)
                    );
                }
                TrackEvent::Ended => self.on_ended(track),
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::trim;
    use crate::types::PitchFrame;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedTrack {
        events: VecDeque<TrackEvent>,
        fail_play: bool,
        stopped: bool,
    }

    impl AudioTrack for ScriptedTrack {
        fn seek(&mut self, _seconds: f64) -> anyhow::Result<()> {
            Ok(())
        }

        fn play(&mut self) -> anyhow::Result<()> {
            anyhow::ensure!(!self.fail_play, "device unavailable");
            Ok(())
        }

        fn stop(&mut self) {
            self.stopped = true;
        }

        fn poll(&mut self) -> Option<TrackEvent> {
            self.events.pop_front()
        }
    }

    fn voiced_trace(onset: f64, end: f64) -> PitchTrace {
        trim(&[PitchFrame::new(onset, 120.0), PitchFrame::new(end, 130.0)])
    }

    #[test]
    fn failed_play_leaves_state_untouched() {
        let mut controller = PlaybackCursorController::new();
        controller.set_trace(TrackSelection::User, &voiced_trace(0.0, 1.0));
        controller.attach_audio(
            TrackSelection::User,
            ScriptedTrack {
                fail_play: true,
                ..ScriptedTrack::default()
            },
        );
        let err = controller
            .on_chart_click(0.5, TrackSelection::User)
            .unwrap_err();
        assert!(matches!(err, CursorError::Audio { .. }));
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert_eq!(controller.active_track(), None);
    }

    #[test]
    fn pump_moves_cursor_and_handles_end() {
        let mut controller = PlaybackCursorController::new();
        controller.set_trace(TrackSelection::User, &voiced_trace(0.5, 2.0));
        controller.attach_audio(
            TrackSelection::User,
            ScriptedTrack {
                events: VecDeque::from([TrackEvent::Progress(1.25), TrackEvent::Ended]),
                ..ScriptedTrack::default()
            },
        );
        controller.on_seek_requested(0.5).unwrap();

        assert!(controller.pump());
        assert_eq!(controller.cursor().position, Some(0.75));

        assert!(!controller.pump());
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert_eq!(
            controller.on_time_progress(TrackSelection::User, 1.5),
            ProgressOutcome::Stale
        );
    }

    #[test]
    fn stop_halts_the_active_track() {
        let mut controller = PlaybackCursorController::new();
        controller.attach_audio(TrackSelection::User, ScriptedTrack::default());
        controller.on_seek_requested(0.0).unwrap();
        controller.stop();
        assert!(controller.audio(TrackSelection::User).unwrap().stopped);
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn detaching_the_active_track_stops_and_idles() {
        let mut controller = PlaybackCursorController::new();
        controller.attach_audio(TrackSelection::User, ScriptedTrack::default());
        controller.on_seek_requested(0.0).unwrap();

        let detached = controller.detach_audio(TrackSelection::User).unwrap();
        assert!(detached.stopped);
        assert!(controller.audio(TrackSelection::User).is_none());
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert_eq!(controller.active_track(), None);
        assert!(controller.detach_audio(TrackSelection::User).is_none());
    }
}
