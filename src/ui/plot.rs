use eframe::egui::{RichText, ScrollArea, Stroke, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use meshstat::charts::{Chart, PhaseChart};
use meshstat::sweep::SweepPanel;

use crate::color::MEAN_COLOR;
use crate::state::AppState;

const MIN_CHART_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Lay the visible charts out on a grid of `layout.columns_count` columns.
/// A sweep contributes one cell per frequency panel.
pub fn chart_grid(ui: &mut Ui, state: &AppState) {
    let cells: Vec<Cell<'_>> = state
        .visible_indices()
        .into_iter()
        .flat_map(|idx| match &state.charts[idx] {
            Chart::Phase(chart) => vec![Cell::Phase(idx, chart)],
            Chart::Sweep(panels) => panels.iter().map(|p| Cell::Sweep(idx, p)).collect(),
        })
        .collect();

    if cells.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing to show");
        });
        return;
    }

    let columns = match state.layout.columns_count {
        0 => cells.len(),
        n => n,
    };
    let rows = cells.len().div_ceil(columns);
    let height = (ui.available_height() / rows as f32 - 30.0).max(MIN_CHART_HEIGHT);
    let y_range = if state.layout.share_y {
        shared_y_range(&cells)
    } else {
        None
    };

    if state.layout.w_space > 0.0 {
        ui.spacing_mut().item_spacing.x = state.layout.w_space;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (row_no, row) in cells.chunks(columns).enumerate() {
                if row_no > 0 && state.layout.h_space > 0.0 {
                    ui.add_space(state.layout.h_space);
                }
                ui.columns(columns, |cols: &mut [Ui]| {
                    for (col_ui, cell) in cols.iter_mut().zip(row) {
                        match cell {
                            Cell::Phase(idx, chart) => {
                                phase_plot(col_ui, state, *idx, chart, height, y_range)
                            }
                            Cell::Sweep(idx, panel) => sweep_plot(col_ui, state, *idx, panel, height),
                        }
                    }
                });
            }
        });
}

enum Cell<'a> {
    Phase(usize, &'a PhaseChart),
    Sweep(usize, &'a SweepPanel),
}

/// Common y extent of every phase chart on screen, error bars included.
fn shared_y_range(cells: &[Cell<'_>]) -> Option<(f64, f64)> {
    cells
        .iter()
        .filter_map(|cell| match cell {
            Cell::Phase(_, chart) => Some(*chart),
            Cell::Sweep(..) => None,
        })
        .flat_map(|chart| &chart.curves)
        .flat_map(|curve| &curve.stats)
        .filter(|s| s.mean.is_finite() && s.std_dev.is_finite())
        .fold(None, |range, s| {
            let (lo, hi) = (s.mean - s.std_dev, s.mean + s.std_dev);
            Some(match range {
                None => (lo, hi),
                Some((min, max)) => (f64::min(min, lo), f64::max(max, hi)),
            })
        })
}

// ---------------------------------------------------------------------------
// Phase chart: mean line with ± std. deviation bars
// ---------------------------------------------------------------------------

fn phase_plot(
    ui: &mut Ui,
    state: &AppState,
    idx: usize,
    chart: &PhaseChart,
    height: f32,
    y_range: Option<(f64, f64)>,
) {
    ui.label(RichText::new(&chart.title).strong());

    let mut plot = Plot::new(("phase_plot", idx, &chart.title))
        .height(height)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);
    if chart.show_legend {
        plot = plot.legend(Legend::default());
    }
    if let Some((min, max)) = y_range {
        plot = plot.include_y(min).include_y(max);
    }

    plot.show(ui, |plot_ui| {
        for curve in &chart.curves {
            let color = state.colors.color_for(&curve.label);

            let means: PlotPoints = curve
                .stats
                .iter()
                .map(|s| [s.phase as f64, s.mean])
                .collect();
            plot_ui.line(Line::new(means).name(&curve.label).color(color).width(1.5));

            if state.show_error_bars {
                for s in &curve.stats {
                    let x = s.phase as f64;
                    let bar = Line::new(vec![[x, s.mean - s.std_dev], [x, s.mean + s.std_dev]])
                        .color(color.gamma_multiply(0.6))
                        .width(1.0);
                    plot_ui.line(bar);
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Sweep panel: grouped box plots per configuration
// ---------------------------------------------------------------------------

fn sweep_plot(ui: &mut Ui, state: &AppState, idx: usize, panel: &SweepPanel, height: f32) {
    ui.label(RichText::new(format!("Benchmark for data frequency {}", panel.frequency)).strong());

    // Group boxes by series so each series is one legend entry.
    let mut labels: Vec<&str> = Vec::new();
    for b in panel.points.iter().flat_map(|p| &p.boxes) {
        if !labels.contains(&b.label.as_str()) {
            labels.push(&b.label);
        }
    }

    let ticks: Vec<(f64, u64)> = panel
        .points
        .iter()
        .map(|p| (p.position, p.chunk_count))
        .collect();

    Plot::new(("sweep_plot", idx, panel.frequency))
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Chunks count")
        .y_axis_label("Time [ms]")
        .x_axis_formatter(move |mark, _range| {
            ticks
                .iter()
                .find(|(pos, _)| (pos - mark.value).abs() < 1e-6)
                .map(|(_, chunks)| chunks.to_string())
                .unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for label in &labels {
                let color = state.colors.color_for(label);
                let boxes: Vec<BoxElem> = panel
                    .points
                    .iter()
                    .flat_map(|p| &p.boxes)
                    .filter(|b| b.label == *label)
                    .filter_map(|b| {
                        let stat = b.stat?;
                        let spread = BoxSpread::new(
                            stat.lower_whisker,
                            stat.q1,
                            stat.median,
                            stat.q3,
                            stat.upper_whisker,
                        );
                        Some(
                            BoxElem::new(b.position, spread)
                                .box_width(panel.box_width)
                                .whisker_width(panel.box_width * 0.5)
                                .fill(color.gamma_multiply(0.5))
                                .stroke(Stroke::new(1.0, color)),
                        )
                    })
                    .collect();
                plot_ui.box_plot(BoxPlot::new(boxes).name(*label).color(color));
            }

            if state.show_means {
                let means: PlotPoints = panel
                    .points
                    .iter()
                    .flat_map(|p| &p.boxes)
                    .filter_map(|b| b.stat.map(|s| [b.position, s.mean]))
                    .collect();
                plot_ui.points(Points::new(means).name("Mean").color(MEAN_COLOR).radius(2.5));
            }
        });
}
