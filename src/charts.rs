//! Chart requests
//!
//! Every chart the viewer can draw is one [`ChartKind`] variant carrying its
//! own settings. A [`ChartSet`] bundles the requested kinds with the sample
//! tables they read and the grid they are drawn on; [`ChartSet::build`] turns
//! it into computed [`Chart`]s.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::{load_file, load_samples};
use crate::data::model::Dataset;
use crate::data::schema::Metric;
use crate::error::{Error, Result};
use crate::stats::phase::{aggregate_all, PhaseCurve, DEFAULT_CYCLE_LENGTH};
use crate::sweep::{
    build_sweep, DirectorySource, SweepPanel, SweepRequest, DEFAULT_STEADY_STATE_FRAMES,
};

/// Nanoseconds per millisecond.
pub const NS_PER_MS: f64 = 1_000_000.0;
/// Bytes per megabyte, as the harness reports pool sizes.
pub const BYTES_PER_MB: f64 = 1_000_000.0;

fn default_time_divisor() -> f64 {
    NS_PER_MS
}

fn default_cycle_length() -> usize {
    DEFAULT_CYCLE_LENGTH
}

fn default_steady_state() -> usize {
    DEFAULT_STEADY_STATE_FRAMES
}

fn default_columns_count() -> usize {
    2
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Grid the charts are arranged on. Passed to the renderer as is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotLayout {
    /// Charts per row. `0` puts every chart on a single row.
    pub columns_count: usize,
    /// Vertical gap between rows, in screen points (not a fraction of the
    /// window). `0` keeps the default.
    pub h_space: f32,
    /// Horizontal gap between columns, in screen points. `0` keeps the
    /// default.
    pub w_space: f32,
    /// Link the y axes of all phase charts.
    pub share_y: bool,
}

impl Default for PlotLayout {
    fn default() -> Self {
        PlotLayout {
            columns_count: default_columns_count(),
            h_space: 0.0,
            w_space: 0.0,
            share_y: false,
        }
    }
}

/// One column per chart, read from a merged CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomChart {
    pub csv_file: PathBuf,
    /// Titles in column order. Columns past the end are titled by name.
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,
    #[serde(default = "default_time_divisor")]
    pub divisor: f64,
}

/// Box plots over the harness configuration grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepChart {
    pub cpu_dir: PathBuf,
    pub gpu_dir: PathBuf,
    #[serde(default = "default_time_divisor")]
    pub time_divisor: f64,
    /// Compare meshing times instead of frame times.
    #[serde(default)]
    pub meshing: bool,
    /// Frames at the end of each run treated as steady state.
    #[serde(default = "default_steady_state")]
    pub steady_state: usize,
}

impl SweepChart {
    pub fn request(&self) -> SweepRequest {
        if self.meshing {
            SweepRequest::meshing_times(self.time_divisor)
        } else {
            SweepRequest::frame_times(self.time_divisor, self.steady_state)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    /// Server and client frame times.
    FrameTimings {
        #[serde(default = "default_time_divisor")]
        time_divisor: f64,
    },
    /// Chunk meshing times, execution only and until completion.
    MeshingTimings {
        #[serde(default = "default_time_divisor")]
        time_divisor: f64,
    },
    /// Generated primitives per passed sample.
    PrimsSamplesRatio,
    /// GPU pool usage.
    MemoryServer,
    /// CPU pool usage.
    MemoryClient,
    ChunksCount,
    Custom(CustomChart),
    Sweep(SweepChart),
}

impl ChartKind {
    fn needs_frame_samples(&self) -> bool {
        matches!(
            self,
            ChartKind::FrameTimings { .. }
                | ChartKind::PrimsSamplesRatio
                | ChartKind::MemoryServer
                | ChartKind::MemoryClient
                | ChartKind::ChunksCount
        )
    }

    fn needs_meshing_samples(&self) -> bool {
        matches!(self, ChartKind::MeshingTimings { .. })
    }
}

/// Everything the viewer needs to know to draw one window of charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    #[serde(default)]
    pub layout: PlotLayout,
    #[serde(default = "default_cycle_length")]
    pub cycle_length: usize,
    #[serde(default = "default_frame_samples")]
    pub frame_samples: PathBuf,
    #[serde(default = "default_meshing_samples")]
    pub meshing_samples: PathBuf,
    pub charts: Vec<ChartKind>,
}

impl Default for ChartSet {
    fn default() -> Self {
        ChartSet {
            layout: PlotLayout::default(),
            cycle_length: default_cycle_length(),
            frame_samples: default_frame_samples(),
            meshing_samples: default_meshing_samples(),
            charts: Vec::new(),
        }
    }
}

fn default_frame_samples() -> PathBuf {
    PathBuf::from("ve001_frame_samples.csv")
}

fn default_meshing_samples() -> PathBuf {
    PathBuf::from("ve001_meshing_samples.csv")
}

// ---------------------------------------------------------------------------
// Computed charts
// ---------------------------------------------------------------------------

/// Mean ± deviation curves over one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub curves: Vec<PhaseCurve>,
    pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Phase(PhaseChart),
    /// One panel per data frequency.
    Sweep(Vec<SweepPanel>),
}

impl ChartSet {
    pub fn from_json_file(path: &Path) -> anyhow::Result<ChartSet> {
        use anyhow::Context;

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading chart list {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing chart list {}", path.display()))
    }

    /// Load the tables the requested charts need and compute them, in
    /// request order.
    pub fn build(&self) -> Result<Vec<Chart>> {
        let frame = if self.charts.iter().any(ChartKind::needs_frame_samples) {
            Some(load_samples(&self.frame_samples)?)
        } else {
            None
        };
        let meshing = if self.charts.iter().any(ChartKind::needs_meshing_samples) {
            Some(load_samples(&self.meshing_samples)?)
        } else {
            None
        };

        let mut charts = Vec::new();
        for kind in &self.charts {
            match kind {
                ChartKind::Custom(custom) => {
                    let table = load_file(&custom.csv_file)?;
                    let built = custom_charts(custom, &table, self.cycle_length)?;
                    charts.extend(built.into_iter().map(Chart::Phase));
                }
                ChartKind::Sweep(sweep) => {
                    let source = DirectorySource::new(&sweep.cpu_dir, &sweep.gpu_dir);
                    charts.push(Chart::Sweep(build_sweep(&source, &sweep.request())?));
                }
                ChartKind::MeshingTimings { .. } => {
                    if let Some(meshing) = &meshing {
                        let built = phase_charts(kind, meshing, self.cycle_length)?;
                        charts.extend(built.into_iter().map(Chart::Phase));
                    }
                }
                _ => {
                    if let Some(frame) = &frame {
                        let built = phase_charts(kind, frame, self.cycle_length)?;
                        charts.extend(built.into_iter().map(Chart::Phase));
                    }
                }
            }
        }
        Ok(charts)
    }
}

fn scaled(table: &Dataset, metric: Metric, divisor: f64) -> Result<Vec<f64>> {
    if !divisor.is_finite() || divisor <= 0.0 {
        return Err(Error::InvalidDivisor(divisor));
    }
    Ok(table.metric(metric)?.values.iter().map(|v| v / divisor).collect())
}

fn single(
    title: impl Into<String>,
    x_label: &str,
    y_label: &str,
    series: Vec<f64>,
    cycle_length: usize,
) -> Result<PhaseChart> {
    let title = title.into();
    Ok(PhaseChart {
        curves: aggregate_all(&[(title.clone(), series)], cycle_length)?,
        title,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        show_legend: false,
    })
}

/// Compute the phase charts of a harness table. `table` is the frame table
/// for every kind except [`ChartKind::MeshingTimings`], which reads the
/// meshing table. Custom and sweep kinds yield nothing here.
pub fn phase_charts(
    kind: &ChartKind,
    table: &Dataset,
    cycle_length: usize,
) -> Result<Vec<PhaseChart>> {
    let charts = match kind {
        ChartKind::FrameTimings { time_divisor } => vec![
            single(
                "Frame time (server)",
                "frame",
                "time [ms]",
                scaled(table, Metric::GpuFrameTimeElapsedNs, *time_divisor)?,
                cycle_length,
            )?,
            single(
                "Frame time (client)",
                "frame",
                "time [ms]",
                scaled(table, Metric::CpuFrameTimeElapsedNs, *time_divisor)?,
                cycle_length,
            )?,
        ],
        ChartKind::MeshingTimings { time_divisor } => vec![
            single(
                "Chunk meshing times (execution only)",
                "chunk",
                "time [ms]",
                scaled(table, Metric::GpuMeshingTimeElapsedNs, *time_divisor)?,
                cycle_length,
            )?,
            single(
                "Chunk meshing times (confirmed completion)",
                "chunk",
                "time [ms]",
                scaled(table, Metric::RealMeshingTimeElapsedNs, *time_divisor)?,
                cycle_length,
            )?,
        ],
        ChartKind::PrimsSamplesRatio => {
            let prims = &table.metric(Metric::PrimsGenerated)?.values;
            let samples = &table.metric(Metric::SamplesPassed)?.values;
            let ratio = prims.iter().zip(samples).map(|(p, s)| p / s).collect();
            vec![single(
                "Ratio of generated primitives to generated fragments",
                "frame",
                "primitives/fragments",
                ratio,
                cycle_length,
            )?]
        }
        ChartKind::MemoryServer => {
            let pool = table.first_value(Metric::GpuPassiveMemoryUsage)?;
            let series = vec![
                (
                    "Active usage".to_string(),
                    scaled(table, Metric::GpuActiveMemoryUsageInUse, BYTES_PER_MB)?,
                ),
                (
                    "Real usage".to_string(),
                    scaled(table, Metric::GpuActiveMemoryUsageReal, BYTES_PER_MB)?,
                ),
            ];
            vec![PhaseChart {
                title: format!(
                    "Memory usage (server)\nPool size = {}[MB]",
                    (pool / BYTES_PER_MB) as u64
                ),
                x_label: "frame".into(),
                y_label: "memory in use [MB]".into(),
                curves: aggregate_all(&series, cycle_length)?,
                show_legend: true,
            }]
        }
        ChartKind::MemoryClient => {
            let pool = table.first_value(Metric::CpuPassiveMemoryUsage)?;
            let series = vec![(
                "Active usage".to_string(),
                scaled(table, Metric::CpuActiveMemoryUsage, BYTES_PER_MB)?,
            )];
            vec![PhaseChart {
                title: format!(
                    "Memory usage (client)\nPool size = {}[MB]",
                    (pool / BYTES_PER_MB) as u64
                ),
                x_label: "frame".into(),
                y_label: "memory in use [MB]".into(),
                curves: aggregate_all(&series, cycle_length)?,
                show_legend: true,
            }]
        }
        ChartKind::ChunksCount => vec![single(
            "Chunks in use",
            "frame",
            "chunk count",
            scaled(table, Metric::ChunksInUse, 1.0)?,
            cycle_length,
        )?],
        ChartKind::Custom(_) | ChartKind::Sweep(_) => Vec::new(),
    };
    Ok(charts)
}

/// One chart per column of a merged table, in column order.
pub fn custom_charts(
    custom: &CustomChart,
    table: &Dataset,
    cycle_length: usize,
) -> Result<Vec<PhaseChart>> {
    if !custom.divisor.is_finite() || custom.divisor <= 0.0 {
        return Err(Error::InvalidDivisor(custom.divisor));
    }
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let title = custom
                .titles
                .get(idx)
                .cloned()
                .unwrap_or_else(|| column.name.clone());
            let series = column.values.iter().map(|v| v / custom.divisor).collect();
            single(title, &custom.x_label, &custom.y_label, series, cycle_length)
        })
        .collect()
}
