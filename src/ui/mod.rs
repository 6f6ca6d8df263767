pub mod components;
pub mod screens;

use anyhow::{anyhow, Result};
use eframe::NativeOptions;

use crate::source::PitchSource;
use screens::compare::CompareApp;

pub fn launch_ui(source: Box<dyn PitchSource>) -> Result<()> {
    let app = CompareApp::from_source(source);
    let title = window_title(app.title());
    eframe::run_native(
        &title,
        NativeOptions::default(),
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow!("failed to run comparison window: {err}"))
}

fn window_title(phrase: &str) -> String {
    if phrase.trim().is_empty() {
        "Tone Coach".to_string()
    } else {
        format!("Tone Coach – {}", phrase)
    }
}
