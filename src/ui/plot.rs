use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot,
    PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::charts::{BoxChart, ChartSpec, GroupedBar, Histogram, PieChart, Scatter};
use crate::color;
use crate::data::model::Churn;
use crate::state::AppState;
use crate::ui::table;

const CHART_HEIGHT: f32 = 300.0;
/// Width of one bar (or box) within a category group.
const GROUP_BAR_WIDTH: f64 = 0.4;
/// Angular resolution of donut slices.
const PIE_STEP_DEGREES: f64 = 2.0;

// ---------------------------------------------------------------------------
// Tab content (central panel)
// ---------------------------------------------------------------------------

/// Render the active tab's charts, two per row.
pub fn tab_content(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore churn  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for row in state.charts.chunks(2) {
                ui.columns(2, |columns: &mut [Ui]| {
                    for (ui, chart) in columns.iter_mut().zip(row) {
                        chart_card(ui, chart);
                    }
                });
                ui.add_space(12.0);
            }
        });
}

fn chart_card(ui: &mut Ui, chart: &ChartSpec) {
    egui::Frame::group(ui.style())
        .fill(Color32::WHITE)
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(chart.title()).size(16.0).strong().color(color::text()));
            match chart {
                ChartSpec::Pie(pie) => pie_chart(ui, pie),
                ChartSpec::Histogram(hist) => histogram_chart(ui, hist),
                ChartSpec::GroupedBar(bars) => {
                    grouped_bar_chart(ui, bars);
                    table::group_table(ui, bars);
                }
                ChartSpec::Scatter(scatter) => scatter_chart(ui, scatter),
                ChartSpec::Box(boxes) => box_chart(ui, boxes),
            }
        });
}

fn empty_notice(ui: &mut Ui) {
    ui.add_sized(
        [ui.available_width(), CHART_HEIGHT],
        egui::Label::new(
            RichText::new("No customers match the current filter.")
                .italics()
                .color(color::muted()),
        ),
    );
}

/// Tick label for integer positions on a categorical axis.
fn category_tick(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Donut
// ---------------------------------------------------------------------------

/// Point at `fraction` of a full turn, clockwise from 12 o'clock.
fn ring_point(fraction: f64, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - fraction * TAU;
    [radius * angle.cos(), radius * angle.sin()]
}

/// Split the ring sector `[start, end)` into small convex quads.
fn ring_segments(start: f64, end: f64, hole: f64) -> Vec<Vec<[f64; 2]>> {
    let steps = (((end - start) * 360.0 / PIE_STEP_DEGREES).ceil() as usize).max(1);
    let step = (end - start) / steps as f64;
    (0..steps)
        .map(|i| {
            let a0 = start + i as f64 * step;
            let a1 = a0 + step;
            vec![
                ring_point(a0, 1.0),
                ring_point(a1, 1.0),
                ring_point(a1, hole),
                ring_point(a0, hole),
            ]
        })
        .collect()
}

fn pie_chart(ui: &mut Ui, pie: &PieChart) {
    if pie.slices.is_empty() {
        empty_notice(ui);
        return;
    }
    let total: usize = pie.slices.iter().map(|s| s.count).sum();

    Plot::new(pie.title.as_str())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .include_x(-1.2)
        .include_x(1.2)
        .include_y(-1.2)
        .include_y(1.2)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in &pie.slices {
                let sweep = slice.count as f64 / total as f64;
                let fill = color::churn_color(slice.churn);
                for quad in ring_segments(start, start + sweep, pie.hole) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad))
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, fill))
                            .name(slice.churn.as_str()),
                    );
                }
                let [x, y] = ring_point(start + sweep / 2.0, (1.0 + pie.hole) / 2.0);
                plot_ui.text(Text::new(
                    PlotPoint::new(x, y),
                    RichText::new(format!("{:.1}%", slice.share))
                        .strong()
                        .color(Color32::WHITE),
                ));
                start += sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

fn histogram_chart(ui: &mut Ui, hist: &Histogram) {
    if hist.bins.is_empty() {
        empty_notice(ui);
        return;
    }
    let bars = |churn: Churn| -> Vec<Bar> {
        hist.bins
            .iter()
            .map(|bin| {
                Bar::new((bin.start + bin.end) / 2.0, bin.count(churn) as f64)
                    .width(hist.bin_width)
                    .name(format!("{}–{}", bin.start, bin.end))
            })
            .collect()
    };
    let no = BarChart::new(bars(Churn::No))
        .name(Churn::No.as_str())
        .color(color::churn_color(Churn::No));
    let yes = BarChart::new(bars(Churn::Yes))
        .name(Churn::Yes.as_str())
        .color(color::churn_color(Churn::Yes))
        .stack_on(&[&no]);

    Plot::new(hist.title.as_str())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(hist.x_label.as_str())
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(no);
            plot_ui.bar_chart(yes);
        });
}

fn grouped_bar_chart(ui: &mut Ui, chart: &GroupedBar) {
    if chart.groups.is_empty() {
        empty_notice(ui);
        return;
    }
    let labels: Vec<String> = chart.groups.iter().map(|g| g.category.clone()).collect();
    let series: Vec<BarChart> = Churn::ALL
        .into_iter()
        .enumerate()
        .map(|(i, churn)| {
            let offset = (i as f64 - 0.5) * GROUP_BAR_WIDTH;
            let bars = chart
                .groups
                .iter()
                .enumerate()
                .map(|(x, g)| {
                    Bar::new(x as f64 + offset, g.count(churn) as f64)
                        .width(GROUP_BAR_WIDTH)
                        .name(&g.category)
                })
                .collect();
            BarChart::new(bars)
                .name(churn.as_str())
                .color(color::churn_color(churn))
        })
        .collect();

    Plot::new(chart.title.as_str())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label("count")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_tick(&labels, mark.value)
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for bars in series {
                plot_ui.bar_chart(bars);
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter and box
// ---------------------------------------------------------------------------

fn scatter_chart(ui: &mut Ui, chart: &Scatter) {
    if chart.series.iter().all(|s| s.points.is_empty()) {
        empty_notice(ui);
        return;
    }
    Plot::new(chart.title.as_str())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let c = color::churn_color(series.churn).gamma_multiply(chart.opacity);
                plot_ui.points(
                    Points::new(PlotPoints::from(series.points.clone()))
                        .name(series.churn.as_str())
                        .color(c)
                        .radius(2.5),
                );
            }
        });
}

fn box_chart(ui: &mut Ui, chart: &BoxChart) {
    if chart.boxes.is_empty() {
        empty_notice(ui);
        return;
    }
    let x_of = |category: &str, churn: Churn| -> Option<f64> {
        let i = Churn::ALL.iter().position(|c| *c == churn)?;
        let x = chart.categories.iter().position(|c| c == category)?;
        Some(x as f64 + (i as f64 - 0.5) * GROUP_BAR_WIDTH)
    };

    let series: Vec<BoxPlot> = Churn::ALL
        .into_iter()
        .map(|churn| {
            let elems = chart
                .boxes
                .iter()
                .filter(|b| b.churn == churn)
                .filter_map(|b| {
                    let s = &b.stats;
                    let spread =
                        BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker);
                    Some(
                        BoxElem::new(x_of(&b.category, churn)?, spread)
                            .name(&b.category)
                            .box_width(GROUP_BAR_WIDTH * 0.8)
                            .whisker_width(GROUP_BAR_WIDTH * 0.4)
                            .fill(color::churn_fill(churn, 0.45))
                            .stroke(Stroke::new(1.5, color::churn_color(churn))),
                    )
                })
                .collect();
            BoxPlot::new(elems)
                .name(churn.as_str())
                .color(color::churn_color(churn))
        })
        .collect();

    let outliers: Vec<(Churn, Vec<[f64; 2]>)> = Churn::ALL
        .into_iter()
        .map(|churn| {
            let points = chart
                .boxes
                .iter()
                .filter(|b| b.churn == churn)
                .filter_map(|b| Some((x_of(&b.category, churn)?, &b.stats.outliers)))
                .flat_map(|(x, ys)| ys.iter().map(move |&y| [x, y]))
                .collect();
            (churn, points)
        })
        .collect();

    let labels = chart.categories.clone();
    Plot::new(chart.title.as_str())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_tick(&labels, mark.value)
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for boxes in series {
                plot_ui.box_plot(boxes);
            }
            for (churn, points) in outliers {
                if points.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(churn.as_str())
                        .color(color::churn_color(churn))
                        .radius(2.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ticks_only_on_integers() {
        let labels = vec!["DSL".to_string(), "Fiber optic".to_string()];
        assert_eq!(category_tick(&labels, 0.0), "DSL");
        assert_eq!(category_tick(&labels, 1.0), "Fiber optic");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, 2.0), "");
        assert_eq!(category_tick(&labels, -1.0), "");
    }

    #[test]
    fn ring_starts_at_twelve_o_clock_and_turns_clockwise() {
        let [x, y] = ring_point(0.0, 1.0);
        assert!(x.abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
        let [x, y] = ring_point(0.25, 1.0);
        assert!((x - 1.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn ring_segments_cover_the_sector() {
        let quads = ring_segments(0.0, 0.5, 0.5);
        assert_eq!(quads.len(), 90);
        assert!(quads.iter().all(|q| q.len() == 4));
        let last = quads.last().unwrap();
        assert!((last[1][1] + 1.0).abs() < 1e-9);
    }
}
