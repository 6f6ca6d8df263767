use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use tonecoach::playback::{
    AudioTrack, CursorError, PlaybackCursorController, PlaybackPhase, ProgressOutcome, TrackEvent,
};
use tonecoach::trace::{trim, PitchTrace};
use tonecoach::types::{PitchFrame, TrackSelection};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Seek(TrackSelection, f64),
    Play(TrackSelection),
    Stop(TrackSelection),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

struct RecordingTrack {
    track: TrackSelection,
    calls: CallLog,
    events: VecDeque<TrackEvent>,
}

impl RecordingTrack {
    fn new(track: TrackSelection, calls: &CallLog) -> Self {
        Self {
            track,
            calls: Rc::clone(calls),
            events: VecDeque::new(),
        }
    }
}

impl AudioTrack for RecordingTrack {
    fn seek(&mut self, seconds: f64) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::Seek(self.track, seconds));
        Ok(())
    }

    fn play(&mut self) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::Play(self.track));
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.borrow_mut().push(Call::Stop(self.track));
    }

    fn poll(&mut self) -> Option<TrackEvent> {
        self.events.pop_front()
    }
}

/// Voiced from `onset` to `onset + span` in 10 ms frames.
fn trace(onset: f64, span: f64) -> PitchTrace {
    let steps = (span / 0.01).round() as usize;
    let mut raw = vec![PitchFrame::new(0.0, 0.0)];
    raw.extend((0..=steps).map(|i| PitchFrame::new(onset + i as f64 * 0.01, 140.0)));
    trim(&raw)
}

fn wired_controller() -> (PlaybackCursorController<RecordingTrack>, CallLog) {
    let calls: CallLog = Rc::default();
    let mut controller = PlaybackCursorController::new();
    controller.set_trace(TrackSelection::Reference, &trace(2.0, 3.0));
    controller.set_trace(TrackSelection::User, &trace(0.5, 3.0));
    controller.attach_audio(
        TrackSelection::Reference,
        RecordingTrack::new(TrackSelection::Reference, &calls),
    );
    controller.attach_audio(
        TrackSelection::User,
        RecordingTrack::new(TrackSelection::User, &calls),
    );
    (controller, calls)
}

fn seeks(calls: &CallLog) -> Vec<(TrackSelection, f64)> {
    calls
        .borrow()
        .iter()
        .filter_map(|call| match call {
            Call::Seek(track, seconds) => Some((*track, *seconds)),
            _ => None,
        })
        .collect()
}

#[test]
fn click_uses_offset_of_clicked_dataset() {
    let (mut controller, _calls) = wired_controller();
    assert_eq!(controller.voice_onset(TrackSelection::Reference), 2.0);
    assert_eq!(controller.voice_onset(TrackSelection::User), 0.5);

    let on_reference = controller
        .on_chart_click(1.0, TrackSelection::Reference)
        .unwrap();
    assert_abs_diff_eq!(on_reference, 3.0, epsilon = 1e-9);

    let on_user = controller.on_chart_click(1.0, TrackSelection::User).unwrap();
    assert_abs_diff_eq!(on_user, 1.5, epsilon = 1e-9);
}

#[test]
fn selected_track_receives_seek_and_play() {
    let (mut controller, calls) = wired_controller();
    controller.select_track(TrackSelection::Reference);
    controller
        .on_chart_click(1.0, TrackSelection::Reference)
        .unwrap();

    assert_eq!(
        *calls.borrow(),
        vec![
            Call::Seek(TrackSelection::Reference, 3.0),
            Call::Play(TrackSelection::Reference)
        ]
    );
    assert_eq!(controller.phase(), PlaybackPhase::Playing);
    assert_eq!(controller.active_track(), Some(TrackSelection::Reference));
}

#[test]
fn user_selection_never_seeks_reference_audio() {
    let (mut controller, calls) = wired_controller();
    controller.select_track(TrackSelection::User);
    for display_time in [0.0, 0.25, 1.0, 2.5, 3.0] {
        for dataset in TrackSelection::ALL {
            controller.on_chart_click(display_time, dataset).unwrap();
        }
    }
    let seeks = seeks(&calls);
    assert_eq!(seeks.len(), 10);
    assert!(seeks
        .iter()
        .all(|(track, _)| *track == TrackSelection::User));
}

#[test]
fn late_progress_from_deselected_track_is_stale() {
    let (mut controller, _calls) = wired_controller();
    controller.select_track(TrackSelection::Reference);
    controller
        .on_chart_click(0.5, TrackSelection::Reference)
        .unwrap();
    assert_eq!(
        controller.on_time_progress(TrackSelection::Reference, 2.75),
        ProgressOutcome::Applied(0.75)
    );

    controller.select_track(TrackSelection::User);
    assert_eq!(
        controller.on_time_progress(TrackSelection::Reference, 3.5),
        ProgressOutcome::Stale
    );
    assert_eq!(controller.cursor().position, Some(0.75));
}

#[test]
fn last_started_track_drives_cursor() {
    let (mut controller, _calls) = wired_controller();
    controller.select_track(TrackSelection::Reference);
    controller
        .on_chart_click(0.5, TrackSelection::Reference)
        .unwrap();
    controller.select_track(TrackSelection::User);
    controller.on_chart_click(0.5, TrackSelection::User).unwrap();

    assert_eq!(
        controller.on_time_progress(TrackSelection::Reference, 2.9),
        ProgressOutcome::Stale
    );
    match controller.on_time_progress(TrackSelection::User, 1.25) {
        ProgressOutcome::Applied(position) => assert_abs_diff_eq!(position, 0.75, epsilon = 1e-9),
        ProgressOutcome::Stale => panic!("user progress should move the cursor"),
    }
}

#[test]
fn out_of_range_clicks_change_nothing() {
    let (mut controller, calls) = wired_controller();
    for display_time in [-0.1, 3.5, f64::NAN, f64::INFINITY] {
        let err = controller
            .on_chart_click(display_time, TrackSelection::User)
            .unwrap_err();
        assert!(matches!(err, CursorError::InvalidClickTarget { .. }));
    }
    assert!(calls.borrow().is_empty());
    assert_eq!(controller.phase(), PlaybackPhase::Idle);
    assert_eq!(controller.cursor().position, None);
}

#[test]
fn click_on_voiceless_dataset_is_invalid() {
    let (mut controller, calls) = wired_controller();
    controller.set_trace(TrackSelection::Reference, &trim(&[]));
    let err = controller
        .on_chart_click(0.0, TrackSelection::Reference)
        .unwrap_err();
    assert!(matches!(
        err,
        CursorError::InvalidClickTarget {
            track: TrackSelection::Reference,
            ..
        }
    ));
    assert!(calls.borrow().is_empty());
}

#[test]
fn click_without_loaded_audio_is_reported() {
    let mut controller: PlaybackCursorController<RecordingTrack> = PlaybackCursorController::new();
    controller.set_trace(TrackSelection::User, &trace(0.5, 1.0));
    let err = controller
        .on_chart_click(0.5, TrackSelection::User)
        .unwrap_err();
    assert_eq!(err, CursorError::NoAudioLoaded(TrackSelection::User));
    assert_eq!(controller.phase(), PlaybackPhase::Idle);
}

#[test]
fn progress_after_end_is_ignored() {
    let (mut controller, _calls) = wired_controller();
    controller.on_chart_click(0.0, TrackSelection::User).unwrap();
    controller.on_ended(TrackSelection::User);
    assert_eq!(controller.phase(), PlaybackPhase::Idle);
    assert_eq!(
        controller.on_time_progress(TrackSelection::User, 1.0),
        ProgressOutcome::Stale
    );
}

#[test]
fn host_started_playback_is_tracked() {
    let (mut controller, _calls) = wired_controller();
    controller.on_playback_started(TrackSelection::User);
    assert_eq!(
        controller.on_time_progress(TrackSelection::User, 0.5),
        ProgressOutcome::Applied(0.0)
    );
}

#[test]
fn pump_routes_events_from_both_tracks() {
    let calls: CallLog = Rc::default();
    let mut reference = RecordingTrack::new(TrackSelection::Reference, &calls);
    reference.events.push_back(TrackEvent::Progress(4.0));
    let mut user = RecordingTrack::new(TrackSelection::User, &calls);
    user.events.push_back(TrackEvent::Progress(1.5));

    let mut controller = PlaybackCursorController::new();
    controller.set_trace(TrackSelection::Reference, &trace(2.0, 3.0));
    controller.set_trace(TrackSelection::User, &trace(0.5, 3.0));
    controller.attach_audio(TrackSelection::Reference, reference);
    controller.attach_audio(TrackSelection::User, user);
    controller.on_chart_click(0.0, TrackSelection::User).unwrap();

    assert!(controller.pump());
    assert_eq!(controller.cursor().position, Some(1.0));
}

#[test]
fn stop_returns_to_idle_and_halts_audio() {
    let (mut controller, calls) = wired_controller();
    controller.on_chart_click(0.2, TrackSelection::User).unwrap();
    controller.stop();
    assert_eq!(controller.phase(), PlaybackPhase::Idle);
    assert_eq!(controller.active_track(), None);
    assert_eq!(calls.borrow().last(), Some(&Call::Stop(TrackSelection::User)));
}

#[test]
fn stop_silences_track_started_before_a_switch() {
    let (mut controller, calls) = wired_controller();
    controller.select_track(TrackSelection::Reference);
    controller
        .on_chart_click(0.5, TrackSelection::Reference)
        .unwrap();
    controller.select_track(TrackSelection::User);
    controller.on_chart_click(0.5, TrackSelection::User).unwrap();
    calls.borrow_mut().clear();

    controller.stop();
    let stopped: Vec<_> = calls
        .borrow()
        .iter()
        .filter_map(|call| match call {
            Call::Stop(track) => Some(*track),
            _ => None,
        })
        .collect();
    assert!(stopped.contains(&TrackSelection::Reference));
    assert!(stopped.contains(&TrackSelection::User));
    assert_eq!(controller.phase(), PlaybackPhase::Idle);
}

#[test]
fn starting_another_track_stops_the_previous_one() {
    let (mut controller, calls) = wired_controller();
    controller.select_track(TrackSelection::Reference);
    controller
        .on_chart_click(0.5, TrackSelection::Reference)
        .unwrap();
    controller.select_track(TrackSelection::User);
    controller.on_chart_click(0.5, TrackSelection::User).unwrap();

    assert_eq!(
        *calls.borrow(),
        vec![
            Call::Seek(TrackSelection::Reference, 2.5),
            Call::Play(TrackSelection::Reference),
            Call::Seek(TrackSelection::User, 1.0),
            Call::Play(TrackSelection::User),
            Call::Stop(TrackSelection::Reference),
        ]
    );
    assert_eq!(controller.active_track(), Some(TrackSelection::User));
}

#[test]
fn reseeking_the_same_track_does_not_stop_it() {
    let (mut controller, calls) = wired_controller();
    controller.on_chart_click(0.5, TrackSelection::User).unwrap();
    controller.on_chart_click(1.5, TrackSelection::User).unwrap();
    assert!(!calls
        .borrow()
        .iter()
        .any(|call| matches!(call, Call::Stop(_))));
}
