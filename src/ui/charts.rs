use std::f64::consts::TAU;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Polygon};

use crate::color::{blues, generate_palette};
use crate::render::stats::CategoryCount;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Summary charts (central panel, below the map)
// ---------------------------------------------------------------------------

/// Label the integer ticks of a categorical axis.
fn category_axis(labels: Vec<String>) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn bar_plot(ui: &mut Ui, id: &str, counts: &[CategoryCount], bars: Vec<Bar>, x_label: &str, height: f32) {
    let labels = counts.iter().map(|c| c.label.clone()).collect();
    Plot::new(id)
        .height(height)
        .x_axis_label(x_label)
        .y_axis_label("Count")
        .x_axis_formatter(category_axis(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Count by company, one bar per company in its pin colour.
pub fn company_chart(ui: &mut Ui, state: &AppState, height: f32) {
    ui.strong("Points by company");
    let counts = &state.output.charts.by_company;
    let colors = &state.context.company_colors;

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.label)
                .fill(colors.color_for(Some(c.label.as_str())).color32())
                .width(0.7)
        })
        .collect();

    bar_plot(ui, "company_chart", counts, bars, "Company", height);
}

/// Count by category as a pie chart.
pub fn category_chart(ui: &mut Ui, state: &AppState, height: f32) {
    ui.strong("Points by category");
    let counts = &state.output.charts.by_category;
    let total: usize = counts.iter().map(|c| c.count).sum();
    let palette = generate_palette(counts.len());

    Plot::new("category_chart")
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for (c, color) in counts.iter().zip(palette) {
                let sweep = TAU * c.count as f64 / total as f64;
                let name = format!("{} ({}, {:.1}%)", c.label, c.count, 100.0 * sweep / TAU);
                for wedge in pie_slice(start, sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge))
                            .name(&name)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }
                start += sweep;
            }
        });
}

/// Polygons covering one pie slice, split so each piece stays convex.
fn pie_slice(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    const MAX_PIECE: f64 = TAU / 4.0;
    const STEPS_PER_PIECE: usize = 24;

    let pieces = (sweep / MAX_PIECE).ceil().max(1.0) as usize;
    let piece = sweep / pieces as f64;
    (0..pieces)
        .map(|k| {
            let from = start + k as f64 * piece;
            let mut points = vec![[0.0, 0.0]];
            points.extend((0..=STEPS_PER_PIECE).map(|s| {
                // Clockwise from twelve o'clock.
                let angle = TAU / 4.0 - (from + piece * s as f64 / STEPS_PER_PIECE as f64);
                [angle.cos(), angle.sin()]
            }));
            points
        })
        .collect()
}

/// Busiest neighborhoods, shaded light to dark blue by count.
pub fn neighborhood_chart(ui: &mut Ui, state: &AppState, height: f32) {
    ui.strong(format!(
        "Top {} neighborhoods by number of points",
        state.context.charts.top_neighborhoods
    ));
    let counts = &state.output.charts.top_neighborhoods;
    let max = counts.iter().map(|c| c.count).max().unwrap_or(1) as f32;

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.label)
                .fill(blues(c.count as f32 / max))
                .width(0.7)
        })
        .collect();

    bar_plot(ui, "neighborhood_chart", counts, bars, "Neighborhood", height);
}
