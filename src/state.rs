use meshstat::charts::{Chart, PlotLayout};

use crate::color::SeriesColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Computed charts, in request order.
    pub charts: Vec<Chart>,

    /// Per-chart visibility, parallel to `charts`.
    pub visible: Vec<bool>,

    /// How the charts are arranged.
    pub layout: PlotLayout,

    /// One colour per curve / box series label.
    pub colors: SeriesColors,

    /// Draw ± one standard deviation around phase means.
    pub show_error_bars: bool,

    /// Draw the mean marker on box plots.
    pub show_means: bool,
}

impl AppState {
    pub fn new(charts: Vec<Chart>, layout: PlotLayout) -> Self {
        let colors = SeriesColors::new(charts.iter().flat_map(series_labels));
        Self {
            visible: vec![true; charts.len()],
            charts,
            layout,
            colors,
            show_error_bars: true,
            show_means: true,
        }
    }

    /// Indices of the charts currently shown.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.visible
            .iter()
            .enumerate()
            .filter(|(_, shown)| **shown)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn show_all(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = true);
    }

    pub fn show_none(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = false);
    }
}

/// Short name of a chart for the side panel.
pub fn chart_title(chart: &Chart) -> String {
    match chart {
        Chart::Phase(phase) => phase.title.replace('\n', " "),
        Chart::Sweep(panels) => format!("Sweep ({} frequencies)", panels.len()),
    }
}

fn series_labels(chart: &Chart) -> Vec<&str> {
    match chart {
        Chart::Phase(phase) => phase.curves.iter().map(|c| c.label.as_str()).collect(),
        Chart::Sweep(panels) => panels
            .iter()
            .flat_map(|p| &p.points)
            .flat_map(|pt| &pt.boxes)
            .map(|b| b.label.as_str())
            .collect(),
    }
}
