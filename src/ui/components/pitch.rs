use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Stroke};

use crate::trace::axis::tooltip_label;
use crate::trace::PitchTrace;
use crate::types::{DisplayPoint, TrackPair, TrackSelection};

use super::playhead::paint_playhead;

pub const REFERENCE_COLOR: Color32 = Color32::from_rgb(0x4c, 0x8b, 0xf5);
pub const USER_COLOR: Color32 = Color32::from_rgb(0xff, 0x98, 0x00);

const CHART_HEIGHT: f32 = 260.0;
const PLOT_MARGIN: f32 = 24.0;
const MIN_X_SPAN: f64 = 0.1;
const HOVER_RADIUS_PX: f32 = 12.0;

/// One curve as the chart consumes it.
#[derive(Debug, Clone, Default)]
pub struct ChartSeries {
    pub points: Vec<DisplayPoint>,
    pub voice_onset: f64,
    pub duration: f64,
    pub pitch_range: Option<(f64, f64)>,
}

impl ChartSeries {
    pub fn from_trace(trace: &PitchTrace) -> Self {
        Self {
            points: trace.display_points(),
            voice_onset: trace.voice_onset,
            duration: trace.display_duration(),
            pitch_range: trace.voiced_pitch_range(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Linear mapping between chart values and screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotTransform {
    plot: Rect,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl PlotTransform {
    pub fn new(plot: Rect, x_max: f64, y_min: f64, y_max: f64) -> Self {
        let y_max = if y_max - y_min < 1e-6 { y_min + 1.0 } else { y_max };
        Self {
            plot,
            x_max: x_max.max(MIN_X_SPAN),
            y_min,
            y_max,
        }
    }

    pub fn plot_rect(&self) -> Rect {
        self.plot
    }

    pub fn pixel_for_x(&self, x: f64) -> f32 {
        self.plot.left() + (x / self.x_max) as f32 * self.plot.width()
    }

    /// Inverse of [`pixel_for_x`](Self::pixel_for_x); NaN for a degenerate plot.
    pub fn x_for_pixel(&self, px: f32) -> f64 {
        if self.plot.width() <= 0.0 {
            return f64::NAN;
        }
        ((px - self.plot.left()) / self.plot.width()) as f64 * self.x_max
    }

    pub fn pixel_for_y(&self, y: f64) -> f32 {
        let ratio = (y - self.y_min) / (self.y_max - self.y_min);
        self.plot.bottom() - ratio as f32 * self.plot.height()
    }

    fn pos(&self, x: f64, y: f64) -> Pos2 {
        egui::pos2(self.pixel_for_x(x), self.pixel_for_y(y))
    }
}

/// A click on the plot area, already converted to display time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartClick {
    pub display_time: f64,
    pub dataset: TrackSelection,
}

pub struct PitchChart<'a> {
    pub series: &'a TrackPair<ChartSeries>,
    pub selection: TrackSelection,
    pub playhead: Option<f64>,
}

impl<'a> PitchChart<'a> {
    pub fn show(self, ui: &mut egui::Ui) -> Option<ChartClick> {
        if self.series.reference.is_empty() && self.series.user.is_empty() {
            ui.label("Pitch contour unavailable");
            return None;
        }
        let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
        let (x_max, y_min, y_max) = chart_bounds(self.series);
        let transform = PlotTransform::new(response.rect.shrink(PLOT_MARGIN), x_max, y_min, y_max);

        draw_frame(&painter, &transform, x_max, y_min, y_max);
        for track in TrackSelection::ALL {
            draw_series(&painter, &transform, &self.series.get(track).points, series_color(track));
        }
        paint_playhead(
            &painter,
            transform.plot_rect(),
            |x| transform.pixel_for_x(x),
            self.playhead,
        );

        let click = if response.clicked() {
            response.interact_pointer_pos().map(|pos| ChartClick {
                display_time: transform.x_for_pixel(pos.x),
                dataset: nearest_dataset(self.series, &transform, pos, self.selection),
            })
        } else {
            None
        };

        if let Some(label) = response
            .hover_pos()
            .and_then(|pos| hovered_label(self.series, &transform, pos))
        {
            response.on_hover_text_at_pointer(label);
        }
        click
    }
}

pub fn series_color(track: TrackSelection) -> Color32 {
    match track {
        TrackSelection::Reference => REFERENCE_COLOR,
        TrackSelection::User => USER_COLOR,
    }
}

/// Axis extents covering both curves: `(x_max, y_min, y_max)`.
pub fn chart_bounds(series: &TrackPair<ChartSeries>) -> (f64, f64, f64) {
    let x_max = series.reference.duration.max(series.user.duration).max(MIN_X_SPAN);
    let range = [series.reference.pitch_range, series.user.pitch_range]
        .into_iter()
        .flatten()
        .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));
    match range {
        Some((min, max)) => {
            let pad = ((max - min) * 0.1).max(5.0);
            (x_max, min - pad, max + pad)
        }
        None => (x_max, 75.0, 300.0),
    }
}

/// Dataset owning the drawn point under the pointer.
///
/// Clicks on empty plot space belong to `fallback`, the selected track.
pub fn nearest_dataset(
    series: &TrackPair<ChartSeries>,
    transform: &PlotTransform,
    pointer: Pos2,
    fallback: TrackSelection,
) -> TrackSelection {
    nearest_drawn_point(series, transform, pointer)
        .map(|(track, _)| track)
        .unwrap_or(fallback)
}

/// Voiced point drawn closest to `pointer`, if one lies within the hover radius.
fn nearest_drawn_point<'a>(
    series: &'a TrackPair<ChartSeries>,
    transform: &PlotTransform,
    pointer: Pos2,
) -> Option<(TrackSelection, &'a DisplayPoint)> {
    TrackSelection::ALL
        .into_iter()
        .flat_map(move |track| {
            series.get(track).points.iter().filter_map(move |point| {
                let y = point.y?;
                let distance = transform.pos(point.x, y).distance(pointer);
                (distance <= HOVER_RADIUS_PX).then_some((distance, track, point))
            })
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, track, point)| (track, point))
}

fn hovered_label(
    series: &TrackPair<ChartSeries>,
    transform: &PlotTransform,
    pointer: Pos2,
) -> Option<String> {
    nearest_drawn_point(series, transform, pointer).map(|(track, point)| {
        tooltip_label(track.label(), point, series.get(track).voice_onset)
    })
}

fn draw_frame(
    painter: &egui::Painter,
    transform: &PlotTransform,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let plot = transform.plot_rect();
    let text_color = Color32::GRAY;
    let font = FontId::proportional(11.0);
    painter.rect_stroke(plot, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));
    painter.text(
        plot.left_bottom() + egui::vec2(0.0, 4.0),
        Align2::LEFT_TOP,
        "0 s",
        font.clone(),
        text_color,
    );
    painter.text(
        plot.right_bottom() + egui::vec2(0.0, 4.0),
        Align2::RIGHT_TOP,
        format!("{:.2} s since voice start", x_max),
        font.clone(),
        text_color,
    );
    painter.text(
        plot.left_top() - egui::vec2(0.0, 4.0),
        Align2::LEFT_BOTTOM,
        format!("{:.0} Hz", y_max),
        font.clone(),
        text_color,
    );
    painter.text(
        plot.left_bottom() - egui::vec2(4.0, 0.0),
        Align2::RIGHT_BOTTOM,
        format!("{:.0}", y_min),
        font,
        text_color,
    );
    let mut legend = plot.right_top() + egui::vec2(-8.0, 6.0);
    for track in TrackSelection::ALL {
        painter.text(
            legend,
            Align2::RIGHT_TOP,
            track.label(),
            FontId::proportional(12.0),
            series_color(track),
        );
        legend.y += 16.0;
    }
}

/// Draw one curve, breaking the line at every missing value.
fn draw_series(
    painter: &egui::Painter,
    transform: &PlotTransform,
    points: &[DisplayPoint],
    color: Color32,
) {
    for run in voiced_runs(points) {
        let positions: Vec<Pos2> = run
            .iter()
            .filter_map(|point| point.y.map(|y| transform.pos(point.x, y)))
            .collect();
        match positions.len() {
            0 => {}
            1 => painter.circle_filled(positions[0], 2.5, color),
            _ => {
                painter.add(egui::epaint::PathShape::line(positions, Stroke::new(2.0, color)));
            }
        }
    }
}

/// Maximal runs of consecutive points that carry a value.
pub fn voiced_runs(points: &[DisplayPoint]) -> impl Iterator<Item = &[DisplayPoint]> {
    points
        .split(|point| point.y.is_none())
        .filter(|run| !run.is_empty())
}
