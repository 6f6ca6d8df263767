use eframe::egui;
use rodio::{OutputStream, OutputStreamHandle};
use tracing::{info, warn};

use crate::playback::rodio_track::RodioTrack;
use crate::playback::{PlaybackCursorController, PlaybackPhase};
use crate::source::phrases::PhraseStep;
use crate::source::PitchSource;
use crate::trace::PitchTrace;
use crate::types::{TrackPair, TrackSelection};
use crate::ui::components::pitch::{ChartSeries, PitchChart};
use crate::ui::components::track_controls::TrackControls;

pub struct CompareApp {
    source: Box<dyn PitchSource>,
    handle: Option<OutputStreamHandle>,
    title: String,
    series: TrackPair<ChartSeries>,
    notices: TrackPair<Option<String>>,
    controller: PlaybackCursorController<RodioTrack>,
    status: Option<String>,
    _output: Option<OutputStream>,
}

impl CompareApp {
    /// Open the default output device and load both tracks from `source`.
    pub fn from_source(source: Box<dyn PitchSource>) -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(err) => {
                warn!(error = %err, "no audio output device; playback disabled");
                None
            }
        };
        Self::new(source, output)
    }

    /// Load both tracks. A track that fails to load is shown as unavailable
    /// instead of aborting the screen.
    pub fn new(
        source: Box<dyn PitchSource>,
        output: Option<(OutputStream, OutputStreamHandle)>,
    ) -> Self {
        let (stream, handle) = output.unzip();
        let mut app = Self {
            title: source.title(),
            source,
            handle,
            series: TrackPair::default(),
            notices: TrackPair::default(),
            controller: PlaybackCursorController::new(),
            status: None,
            _output: stream,
        };
        app.reload();
        app
    }

    /// Refetch both tracks for the source's current phrase.
    fn reload(&mut self) {
        self.controller.stop();
        self.title = self.source.title();
        for track in TrackSelection::ALL {
            self.load_track(track);
        }
    }

    /// Move to a neighbouring phrase and reload both tracks.
    pub fn navigate(&mut self, step: PhraseStep) {
        match self.source.step_phrase(step) {
            Ok(true) => {
                self.status = None;
                self.reload();
            }
            Ok(false) => {}
            Err(err) => {
                warn!(?step, error = %err, "phrase navigation failed");
                self.status = Some(format!("Could not load phrase: {}", err));
            }
        }
    }

    pub fn series(&self, track: TrackSelection) -> &ChartSeries {
        self.series.get(track)
    }

    pub fn notice(&self, track: TrackSelection) -> Option<&str> {
        self.notices.get(track).as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn load_track(&mut self, track: TrackSelection) {
        *self.notices.get_mut(track) = None;
        *self.series.get_mut(track) = ChartSeries::default();
        self.controller.set_trace(track, &PitchTrace::default());
        self.controller.detach_audio(track);

        let data = match self.source.load(track) {
            Ok(data) => data,
            Err(err) => {
                warn!(%track, error = %err, "pitch data unavailable");
                *self.notices.get_mut(track) = Some(format!("{}: data unavailable", track.label()));
                return;
            }
        };
        let trace = PitchTrace::from_analysis(&data.analysis);
        info!(
            %track,
            has_voice = trace.has_voice,
            voice_onset = trace.voice_onset,
            frames = trace.frames.len(),
            "track trace ready"
        );
        if !trace.has_voice {
            *self.notices.get_mut(track) = Some(format!("{}: no voice detected", track.label()));
        }
        self.controller.set_trace(track, &trace);
        *self.series.get_mut(track) = ChartSeries::from_trace(&trace);

        if let Some(handle) = &self.handle {
            match RodioTrack::from_file(&data.audio_path, handle.clone()) {
                Ok(audio) => {
                    self.controller.attach_audio(track, audio);
                }
                Err(err) => warn!(%track, error = %err, "audio unavailable for playback"),
            }
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        let mut step = None;
        egui::TopBottomPanel::top("phrase").show(ctx, |ui| {
            if let Some((index, count)) = self.source.phrase_position() {
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(count > 1, egui::Button::new("← Previous"))
                        .clicked()
                    {
                        step = Some(PhraseStep::Previous);
                    }
                    ui.label(format!("Phrase {} of {}", index + 1, count));
                    if ui
                        .add_enabled(count > 1, egui::Button::new("Next →"))
                        .clicked()
                    {
                        step = Some(PhraseStep::Next);
                    }
                });
            }
            ui.heading(self.title.as_str());
            let output = TrackControls {
                selection: self.controller.selection(),
                playing: self.controller.phase() == PlaybackPhase::Playing,
            }
            .show(ui);
            if let Some(selection) = output.select {
                self.controller.select_track(selection);
            }
            if output.stop {
                self.controller.stop();
            }
        });
        if let Some(step) = step {
            self.navigate(step);
        }
    }

    fn show_chart(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            for notice in [&self.notices.reference, &self.notices.user]
                .into_iter()
                .flatten()
            {
                ui.colored_label(egui::Color32::from_rgb(210, 160, 20), notice.as_str());
            }
            let click = PitchChart {
                series: &self.series,
                selection: self.controller.selection(),
                playhead: self.controller.cursor().position,
            }
            .show(ui);
            if let Some(click) = click {
                self.status = self
                    .controller
                    .on_chart_click(click.display_time, click.dataset)
                    .err()
                    .map(|err| err.to_string());
            }
            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::from_rgb(200, 60, 60), status.as_str());
            }
            ui.label("Click on the chart to replay the selected recording from that point.");
        });
    }
}

impl eframe::App for CompareApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.pump();
        self.show_header(ctx);
        self.show_chart(ctx);
        if self.controller.phase() == PlaybackPhase::Playing {
            ctx.request_repaint();
        }
    }
}
