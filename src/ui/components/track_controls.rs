use eframe::egui;

use crate::types::TrackSelection;

#[derive(Default, Debug)]
pub struct TrackControlsOutput {
    pub select: Option<TrackSelection>,
    pub stop: bool,
}

pub struct TrackControls {
    pub selection: TrackSelection,
    pub playing: bool,
}

impl TrackControls {
    pub fn show(&self, ui: &mut egui::Ui) -> TrackControlsOutput {
        let mut output = TrackControlsOutput::default();
        ui.horizontal(|ui| {
            if let Some(selection) = selection_toggle(ui, self.selection) {
                output.select = Some(selection);
            }
            ui.separator();
            if stop_button(ui, self.playing) {
                output.stop = true;
            }
        });
        output
    }
}

pub fn toggle_label(selection: TrackSelection) -> &'static str {
    match selection {
        TrackSelection::Reference => "Play Reference Audio",
        TrackSelection::User => "Play Your Recording",
    }
}

fn selection_toggle(ui: &mut egui::Ui, selection: TrackSelection) -> Option<TrackSelection> {
    let mut reference = selection == TrackSelection::Reference;
    let changed = ui
        .checkbox(&mut reference, toggle_label(selection))
        .on_hover_text("Chooses which recording plays when you click the chart.")
        .changed();
    changed.then_some(if reference {
        TrackSelection::Reference
    } else {
        TrackSelection::User
    })
}

fn stop_button(ui: &mut egui::Ui, playing: bool) -> bool {
    let mut clicked = false;
    ui.add_enabled_ui(playing, |ui| {
        if ui.button("Stop").clicked() {
            clicked = true;
        }
    });
    clicked
}
