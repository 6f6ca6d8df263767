use eframe::egui::{self, Color32, Pos2, Rect, Stroke};

pub const PLAYHEAD_COLOR: Color32 = Color32::RED;
pub const PLAYHEAD_WIDTH: f32 = 2.0;

/// Endpoints of the vertical playhead line, if it lands on the plot.
pub fn playhead_segment(
    plot: Rect,
    pixel_for_x: impl Fn(f64) -> f32,
    position: Option<f64>,
) -> Option<[Pos2; 2]> {
    let position = position.filter(|p| p.is_finite())?;
    let x = pixel_for_x(position);
    let on_plot = x.is_finite() && x >= plot.left() && x <= plot.right();
    on_plot.then(|| [egui::pos2(x, plot.top()), egui::pos2(x, plot.bottom())])
}

/// Paint the playhead over an already drawn chart. Keeps no state.
pub fn paint_playhead(
    painter: &egui::Painter,
    plot: Rect,
    pixel_for_x: impl Fn(f64) -> f32,
    position: Option<f64>,
) {
    if let Some(segment) = playhead_segment(plot, pixel_for_x, position) {
        painter.line_segment(segment, Stroke::new(PLAYHEAD_WIDTH, PLAYHEAD_COLOR));
    }
}
