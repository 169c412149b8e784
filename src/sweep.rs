//! Parameter sweep comparison
//!
//! The harness is run once per configuration `(frequency, xz depth, y depth)`
//! with the CPU mesher and once with the GPU mesher. Each run leaves a frame
//! table and a meshing table. This module loads those four tables per
//! configuration and reduces the requested columns to box statistics laid
//! out side by side:
//!
//! ```text
//!  frequency ──► panel
//!     (xz, y) ──► x position 1, 2, 3 …
//!        series × {CPU, GPU} ──► boxes offset around the position
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::data::loader::load_samples;
use crate::data::model::Dataset;
use crate::data::schema::Metric;
use crate::error::{Error, Result};
use crate::stats::boxplot::{BoxStat, DEFAULT_WHISKER_IQR};

/// Meshing runs at or above this many nanoseconds (180 s) are stalled runs,
/// not slow ones.
pub const HANG_THRESHOLD_NS: f64 = 180_000_000_000.0;

/// Frames kept when isolating the steady state at the end of a run.
pub const DEFAULT_STEADY_STATE_FRAMES: usize = 180;

/// Data frequencies the harness was run with.
pub const HARNESS_FREQUENCIES: [u32; 4] = [2, 50, 100, 200];
/// Horizontal world depths, parallel to [`HARNESS_Y_DEPTHS`].
pub const HARNESS_XZ_DEPTHS: [u32; 8] = [100, 150, 200, 250, 300, 350, 400, 400];
/// Vertical world depths, parallel to [`HARNESS_XZ_DEPTHS`].
pub const HARNESS_Y_DEPTHS: [u32; 8] = [50, 100, 100, 200, 200, 300, 300, 350];

// ---------------------------------------------------------------------------
// Configuration keys and sample sources
// ---------------------------------------------------------------------------

/// Which mesher produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Context {
    Cpu,
    Gpu,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Cpu => write!(f, "CPU"),
            Context::Gpu => write!(f, "GPU"),
        }
    }
}

/// The two tables the harness writes per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Meshing,
    Frame,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Meshing => "meshing",
            TableKind::Frame => "frame",
        }
    }
}

/// One point of the sweep grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey {
    pub frequency: u32,
    pub xz_depth: u32,
    pub y_depth: u32,
}

impl ConfigKey {
    /// `ve001_{meshing|frame}_samples_w{frequency}_xz{xz}_y{y}.csv`
    pub fn file_name(&self, kind: TableKind) -> String {
        format!(
            "ve001_{}_samples_w{}_xz{}_y{}.csv",
            kind.as_str(),
            self.frequency,
            self.xz_depth,
            self.y_depth
        )
    }
}

/// Where the sweep gets its tables from.
pub trait SampleSource {
    fn load(&self, context: Context, kind: TableKind, key: &ConfigKey) -> Result<Dataset>;
}

impl<F> SampleSource for F
where
    F: Fn(Context, TableKind, &ConfigKey) -> Result<Dataset>,
{
    fn load(&self, context: Context, kind: TableKind, key: &ConfigKey) -> Result<Dataset> {
        self(context, kind, key)
    }
}

/// Tables laid out by the harness: one directory per mesher.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub cpu_dir: PathBuf,
    pub gpu_dir: PathBuf,
}

impl DirectorySource {
    pub fn new(cpu_dir: impl Into<PathBuf>, gpu_dir: impl Into<PathBuf>) -> Self {
        DirectorySource {
            cpu_dir: cpu_dir.into(),
            gpu_dir: gpu_dir.into(),
        }
    }

    pub fn path_for(&self, context: Context, kind: TableKind, key: &ConfigKey) -> PathBuf {
        let dir: &Path = match context {
            Context::Cpu => &self.cpu_dir,
            Context::Gpu => &self.gpu_dir,
        };
        dir.join(key.file_name(kind))
    }
}

impl SampleSource for DirectorySource {
    fn load(&self, context: Context, kind: TableKind, key: &ConfigKey) -> Result<Dataset> {
        load_samples(&self.path_for(context, kind, key))
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Part of a column kept after missing values are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subrange {
    /// The last `n` samples, e.g. frames after world generation settled.
    Last(usize),
    /// The first `n` samples.
    First(usize),
}

impl Subrange {
    pub fn apply<'a>(&self, samples: &'a [f64]) -> &'a [f64] {
        match *self {
            Subrange::Last(n) => &samples[samples.len().saturating_sub(n)..],
            Subrange::First(n) => &samples[..n.min(samples.len())],
        }
    }
}

/// One column to compare, drawn once for the CPU and once for the GPU run.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSeries {
    pub metric: Metric,
    pub subrange: Option<Subrange>,
    pub cpu_label: String,
    pub gpu_label: String,
}

impl BoxSeries {
    pub fn label(&self, context: Context) -> &str {
        match context {
            Context::Cpu => &self.cpu_label,
            Context::Gpu => &self.gpu_label,
        }
    }
}

/// Which tables make up the sample pool of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// Frame table stacked on top of the meshing table.
    #[default]
    Frame,
    /// Meshing table only.
    Meshing,
}

/// Thresholds applied before any statistic is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPolicy {
    /// GPU rows whose meshing times reach this value are dropped.
    pub hang_threshold_ns: f64,
    /// Whisker reach in multiples of the IQR.
    pub whisker_iqr: f64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy {
            hang_threshold_ns: HANG_THRESHOLD_NS,
            whisker_iqr: DEFAULT_WHISKER_IQR,
        }
    }
}

/// Horizontal placement of the boxes sharing one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxLayout {
    /// Distance between neighbouring box centres.
    pub step: f64,
    pub box_width: f64,
}

impl Default for BoxLayout {
    fn default() -> Self {
        BoxLayout {
            step: 0.1,
            box_width: 0.1,
        }
    }
}

impl BoxLayout {
    /// Offsets of `n` boxes, ascending and symmetric around zero.
    pub fn offsets(&self, n: usize) -> Vec<f64> {
        let centre = (n as f64 - 1.0) / 2.0;
        (0..n).map(|i| (i as f64 - centre) * self.step).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRequest {
    /// One panel per frequency.
    pub frequencies: Vec<u32>,
    /// Parallel to `y_depths`; one x position per pair.
    pub xz_depths: Vec<u32>,
    pub y_depths: Vec<u32>,
    pub series: Vec<BoxSeries>,
    /// Every sample is divided by this, e.g. `1e6` for ns → ms.
    pub divisor: f64,
    pub mode: SweepMode,
    pub layout: BoxLayout,
    pub filter: FilterPolicy,
}

impl SweepRequest {
    fn harness_grid(series: Vec<BoxSeries>, divisor: f64, mode: SweepMode) -> Self {
        SweepRequest {
            frequencies: HARNESS_FREQUENCIES.to_vec(),
            xz_depths: HARNESS_XZ_DEPTHS.to_vec(),
            y_depths: HARNESS_Y_DEPTHS.to_vec(),
            series,
            divisor,
            mode,
            layout: BoxLayout::default(),
            filter: FilterPolicy::default(),
        }
    }

    /// Frame times: the steady-state tail next to the whole run.
    pub fn frame_times(divisor: f64, steady_state_frames: usize) -> Self {
        let series = vec![
            BoxSeries {
                metric: Metric::GpuFrameTimeElapsedNs,
                subrange: Some(Subrange::Last(steady_state_frames)),
                cpu_label: "frame times (CPU)".into(),
                gpu_label: "frame times (GPU)".into(),
            },
            BoxSeries {
                metric: Metric::GpuFrameTimeElapsedNs,
                subrange: None,
                cpu_label: "frame times during gen. (CPU)".into(),
                gpu_label: "frame times during gen. (GPU)".into(),
            },
        ];
        Self::harness_grid(series, divisor, SweepMode::Frame)
    }

    /// Meshing times as measured by the timer query and end to end.
    pub fn meshing_times(divisor: f64) -> Self {
        let series = vec![
            BoxSeries {
                metric: Metric::GpuMeshingTimeElapsedNs,
                subrange: None,
                cpu_label: "meshing times (CPU)".into(),
                gpu_label: "meshing times (GPU)".into(),
            },
            BoxSeries {
                metric: Metric::RealMeshingTimeElapsedNs,
                subrange: None,
                cpu_label: "real meshing times (CPU)".into(),
                gpu_label: "real meshing times (GPU)".into(),
            },
        ];
        Self::harness_grid(series, divisor, SweepMode::Meshing)
    }

    /// Check the grid and parameters. Runs before any table is loaded.
    pub fn validate(&self) -> Result<()> {
        if self.xz_depths.len() != self.y_depths.len() {
            return Err(Error::GridMismatch {
                xz: self.xz_depths.len(),
                y: self.y_depths.len(),
            });
        }
        if self.frequencies.is_empty() || self.xz_depths.is_empty() {
            return Err(Error::EmptyGrid);
        }
        if self.series.is_empty() {
            return Err(Error::NoSeries);
        }
        if !self.divisor.is_finite() || self.divisor <= 0.0 {
            return Err(Error::InvalidDivisor(self.divisor));
        }
        Ok(())
    }

    /// Grid points of one panel, in x order.
    pub fn keys(&self, frequency: u32) -> impl Iterator<Item = ConfigKey> + '_ {
        self.xz_depths
            .iter()
            .zip(&self.y_depths)
            .map(move |(&xz_depth, &y_depth)| ConfigKey {
                frequency,
                xz_depth,
                y_depth,
            })
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SweepBox {
    pub label: String,
    pub metric: Metric,
    pub context: Context,
    /// Absolute x position of the box centre.
    pub position: f64,
    pub sample_count: usize,
    /// `None` when no sample survived filtering.
    pub stat: Option<BoxStat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub key: ConfigKey,
    /// Chunks in use as measured by the CPU run; the x tick label.
    pub chunk_count: u64,
    /// Integer x position, starting at 1.
    pub position: f64,
    pub boxes: Vec<SweepBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPanel {
    pub frequency: u32,
    /// Width each box is drawn with.
    pub box_width: f64,
    pub points: Vec<SweepPoint>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Drop rows where either meshing time column reaches `threshold`. Tables
/// without those columns pass through unchanged; missing cells are kept.
pub fn drop_hung_rows(table: &Dataset, threshold: f64) -> Dataset {
    let watched: Vec<&[f64]> = [Metric::GpuMeshingTimeElapsedNs, Metric::RealMeshingTimeElapsedNs]
        .into_iter()
        .filter_map(|m| table.column(m.as_str()))
        .map(|c| c.values.as_slice())
        .collect();

    let filtered = table.retain_rows(|_, row| {
        watched
            .iter()
            .all(|col| col[row].is_nan() || col[row] < threshold)
    });
    let dropped = table.len() - filtered.len();
    if dropped > 0 {
        log::info!("{}: dropped {dropped} hung rows", table.name);
    }
    filtered
}

/// Load every grid point and compute the box statistics.
///
/// Any table that fails to load aborts the whole sweep.
pub fn build_sweep<S>(source: &S, request: &SweepRequest) -> Result<Vec<SweepPanel>>
where
    S: SampleSource + ?Sized,
{
    request.validate()?;

    let box_count = request.series.len() * 2;
    let offsets = request.layout.offsets(box_count);

    let mut panels = Vec::with_capacity(request.frequencies.len());
    for &frequency in &request.frequencies {
        let mut points = Vec::with_capacity(request.xz_depths.len());
        for (idx, key) in request.keys(frequency).enumerate() {
            let position = (idx + 1) as f64;
            points.push(build_point(source, request, key, position, &offsets)?);
        }
        panels.push(SweepPanel {
            frequency,
            box_width: request.layout.box_width,
            points,
        });
    }

    log::info!(
        "Built sweep over {} frequencies x {} configurations",
        panels.len(),
        request.xz_depths.len()
    );
    Ok(panels)
}

fn build_point<S>(
    source: &S,
    request: &SweepRequest,
    key: ConfigKey,
    position: f64,
    offsets: &[f64],
) -> Result<SweepPoint>
where
    S: SampleSource + ?Sized,
{
    log::debug!(
        "Loading w{} xz{} y{}",
        key.frequency,
        key.xz_depth,
        key.y_depth
    );

    let cpu_meshing = source.load(Context::Cpu, TableKind::Meshing, &key)?;
    let cpu_frame = source.load(Context::Cpu, TableKind::Frame, &key)?;
    let threshold = request.filter.hang_threshold_ns;
    let gpu_meshing = drop_hung_rows(
        &source.load(Context::Gpu, TableKind::Meshing, &key)?,
        threshold,
    );
    let gpu_frame = drop_hung_rows(&source.load(Context::Gpu, TableKind::Frame, &key)?, threshold);

    let chunk_count = cpu_frame.first_value(Metric::ChunksInUse)?.round() as u64;

    let (cpu_pool, gpu_pool) = match request.mode {
        SweepMode::Frame => (
            cpu_frame.concat_rows(&cpu_meshing),
            gpu_frame.concat_rows(&gpu_meshing),
        ),
        SweepMode::Meshing => (cpu_meshing, gpu_meshing),
    };

    let slots = request.series.iter().flat_map(|series| {
        [
            (series, Context::Cpu, &cpu_pool),
            (series, Context::Gpu, &gpu_pool),
        ]
    });

    let mut boxes = Vec::with_capacity(offsets.len());
    for ((series, context, pool), offset) in slots.zip(offsets) {
        let samples = series_samples(pool, series, request.divisor)?;
        boxes.push(SweepBox {
            label: series.label(context).to_string(),
            metric: series.metric,
            context,
            position: position + offset,
            sample_count: samples.len(),
            stat: BoxStat::compute(&samples, request.filter.whisker_iqr),
        });
    }

    Ok(SweepPoint {
        key,
        chunk_count,
        position,
        boxes,
    })
}

/// Missing values dropped, scaled by `divisor`, cut to the series subrange.
fn series_samples(pool: &Dataset, series: &BoxSeries, divisor: f64) -> Result<Vec<f64>> {
    let scaled: Vec<f64> = pool
        .metric(series.metric)?
        .present()
        .map(|v| v / divisor)
        .collect();
    Ok(match series.subrange {
        Some(range) => range.apply(&scaled).to_vec(),
        None => scaled,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Write;

    use super::*;

    fn table(name: &str, cols: &[(Metric, Vec<f64>)]) -> Dataset {
        let mut ds = Dataset::new(name);
        for (metric, values) in cols {
            ds.push_column(metric.as_str(), values.clone()).unwrap();
        }
        ds
    }

    /// Four tables for every key: meshing times `meshing` (GPU side can be
    /// overridden), frame times `frames`, and 100 chunks in use.
    fn fixture_source(
        gpu_meshing: Vec<f64>,
    ) -> impl Fn(Context, TableKind, &ConfigKey) -> Result<Dataset> {
        move |context: Context, kind: TableKind, key: &ConfigKey| {
            let name = format!("{context}-{}", key.file_name(kind));
            Ok(match (context, kind) {
                (_, TableKind::Frame) => table(
                    &name,
                    &[
                        (Metric::GpuFrameTimeElapsedNs, vec![1e6, 2e6, 3e6, 4e6]),
                        (Metric::ChunksInUse, vec![100.0 + key.xz_depth as f64, 0.0, 0.0, 0.0]),
                    ],
                ),
                (Context::Cpu, TableKind::Meshing) => table(
                    &name,
                    &[
                        (Metric::GpuMeshingTimeElapsedNs, vec![5e6, 6e6]),
                        (Metric::RealMeshingTimeElapsedNs, vec![7e6, 8e6]),
                    ],
                ),
                (Context::Gpu, TableKind::Meshing) => table(
                    &name,
                    &[
                        (Metric::GpuMeshingTimeElapsedNs, gpu_meshing.clone()),
                        (Metric::RealMeshingTimeElapsedNs, vec![1.0; gpu_meshing.len()]),
                    ],
                ),
            })
        }
    }

    fn small_request(mode: SweepMode, series: Vec<BoxSeries>) -> SweepRequest {
        SweepRequest {
            frequencies: vec![2, 50],
            xz_depths: vec![100, 150, 200],
            y_depths: vec![50, 100, 100],
            series,
            divisor: 1.0,
            mode,
            layout: BoxLayout::default(),
            filter: FilterPolicy::default(),
        }
    }

    fn meshing_series() -> Vec<BoxSeries> {
        vec![BoxSeries {
            metric: Metric::GpuMeshingTimeElapsedNs,
            subrange: None,
            cpu_label: "cpu".into(),
            gpu_label: "gpu".into(),
        }]
    }

    #[test]
    fn test_file_name_convention() {
        let key = ConfigKey {
            frequency: 50,
            xz_depth: 250,
            y_depth: 200,
        };
        assert_eq!(
            key.file_name(TableKind::Meshing),
            "ve001_meshing_samples_w50_xz250_y200.csv"
        );
        assert_eq!(
            key.file_name(TableKind::Frame),
            "ve001_frame_samples_w50_xz250_y200.csv"
        );
    }

    #[test]
    fn test_offsets_are_symmetric() {
        let layout = BoxLayout::default();
        let offsets = layout.offsets(4);
        let expected = [-0.15, -0.05, 0.05, 0.15];
        for (o, e) in offsets.iter().zip(expected) {
            assert!((o - e).abs() < 1e-12);
        }
        let six = layout.offsets(6);
        assert!((six[0] + six[5]).abs() < 1e-12);
        assert!((six[0] + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_subrange() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(Subrange::Last(2).apply(&v), &[3.0, 4.0]);
        assert_eq!(Subrange::Last(10).apply(&v), &v);
        assert_eq!(Subrange::First(1).apply(&v), &[1.0]);
    }

    #[test]
    fn test_hang_threshold_is_inclusive() {
        let gpu = table(
            "gpu",
            &[
                (Metric::GpuMeshingTimeElapsedNs, vec![200_000_000_000.0, 179_999_999_999.0, 5.0]),
                (Metric::RealMeshingTimeElapsedNs, vec![1.0, 2.0, 180_000_000_000.0]),
            ],
        );
        let kept = drop_hung_rows(&gpu, HANG_THRESHOLD_NS);
        assert_eq!(
            kept.metric(Metric::GpuMeshingTimeElapsedNs).unwrap().values,
            vec![179_999_999_999.0]
        );
    }

    #[test]
    fn test_hung_gpu_sample_excluded_from_statistics() {
        let source = fixture_source(vec![200_000_000_000.0, 179_999_999_999.0, 10.0]);
        let panels = build_sweep(&source, &small_request(SweepMode::Meshing, meshing_series())).unwrap();

        let gpu_box = &panels[0].points[0].boxes[1];
        assert_eq!(gpu_box.context, Context::Gpu);
        assert_eq!(gpu_box.sample_count, 2);
        let stat = gpu_box.stat.unwrap();
        assert_eq!(stat.upper_whisker, 179_999_999_999.0);
        assert!(stat.mean < 100_000_000_000.0);
    }

    #[test]
    fn test_mismatched_grid_fails_before_loading() {
        let loads = Cell::new(0);
        let source = |_: Context, _: TableKind, _: &ConfigKey| -> Result<Dataset> {
            loads.set(loads.get() + 1);
            Ok(Dataset::new("unused"))
        };
        let mut request = small_request(SweepMode::Frame, meshing_series());
        request.y_depths.pop();

        assert!(matches!(
            build_sweep(&source, &request),
            Err(Error::GridMismatch { xz: 3, y: 2 })
        ));
        assert_eq!(loads.get(), 0);

        let missing_dirs = DirectorySource::new("/nonexistent/cpu", "/nonexistent/gpu");
        assert!(matches!(
            build_sweep(&missing_dirs, &request),
            Err(Error::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let source = fixture_source(vec![1.0]);
        let mut request = small_request(SweepMode::Frame, meshing_series());
        request.divisor = 0.0;
        assert!(matches!(build_sweep(&source, &request), Err(Error::InvalidDivisor(_))));

        let request = small_request(SweepMode::Frame, Vec::new());
        assert!(matches!(build_sweep(&source, &request), Err(Error::NoSeries)));

        let mut request = small_request(SweepMode::Frame, meshing_series());
        request.frequencies.clear();
        assert!(matches!(build_sweep(&source, &request), Err(Error::EmptyGrid)));
    }

    #[test]
    fn test_grid_order_and_layout() {
        let source = fixture_source(vec![1.0, 2.0]);
        let request = small_request(SweepMode::Meshing, meshing_series());
        let panels = build_sweep(&source, &request).unwrap();

        assert_eq!(panels.iter().map(|p| p.frequency).collect::<Vec<_>>(), vec![2, 50]);
        let points = &panels[1].points;
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].key.xz_depth, 200);
        assert_eq!(points[2].key.y_depth, 100);
        assert_eq!(points[2].position, 3.0);
        // tick label comes from the data, not the grid
        assert_eq!(points[0].chunk_count, 200);

        let boxes = &points[1].boxes;
        assert_eq!(boxes[0].context, Context::Cpu);
        assert_eq!(boxes[0].label, "cpu");
        assert!((boxes[0].position - 1.95).abs() < 1e-12);
        assert!((boxes[1].position - 2.05).abs() < 1e-12);
    }

    #[test]
    fn test_boxes_follow_series_then_context() {
        let source = fixture_source(vec![1.0, 2.0]);
        let mut series = meshing_series();
        series.push(BoxSeries {
            metric: Metric::RealMeshingTimeElapsedNs,
            subrange: None,
            cpu_label: "real cpu".into(),
            gpu_label: "real gpu".into(),
        });
        let panels = build_sweep(&source, &small_request(SweepMode::Meshing, series)).unwrap();

        let boxes = &panels[0].points[0].boxes;
        let labels: Vec<&str> = boxes.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["cpu", "gpu", "real cpu", "real gpu"]);
        let expected = [0.85, 0.95, 1.05, 1.15];
        for (b, e) in boxes.iter().zip(expected) {
            assert!((b.position - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_frame_mode_pools_and_subrange() {
        let source = fixture_source(vec![1.0]);
        let series = vec![BoxSeries {
            metric: Metric::GpuFrameTimeElapsedNs,
            subrange: Some(Subrange::Last(2)),
            cpu_label: "steady (CPU)".into(),
            gpu_label: "steady (GPU)".into(),
        }];
        let mut request = small_request(SweepMode::Frame, series);
        request.divisor = 1e6;

        let panels = build_sweep(&source, &request).unwrap();
        let cpu = &panels[0].points[0].boxes[0];
        // meshing rows carry no frame time, so only the frame rows remain
        assert_eq!(cpu.sample_count, 2);
        let stat = cpu.stat.unwrap();
        assert_eq!(stat.lower_whisker, 3.0);
        assert_eq!(stat.upper_whisker, 4.0);
    }

    #[test]
    fn test_meshing_metric_in_frame_mode_uses_meshing_rows() {
        let source = fixture_source(vec![1.0, 2.0, 3.0]);
        let request = small_request(SweepMode::Frame, meshing_series());
        let panels = build_sweep(&source, &request).unwrap();
        let boxes = &panels[0].points[0].boxes;
        assert_eq!(boxes[0].sample_count, 2);
        assert_eq!(boxes[1].sample_count, 3);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let source = fixture_source(vec![1.0]);
        let series = vec![BoxSeries {
            metric: Metric::SamplesPassed,
            subrange: None,
            cpu_label: "a".into(),
            gpu_label: "b".into(),
        }];
        let request = small_request(SweepMode::Meshing, series);
        assert!(matches!(
            build_sweep(&source, &request),
            Err(Error::MissingColumn { .. })
        ));
    }

    fn write_table(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_directory_source_end_to_end() {
        let cpu = tempfile::tempdir().unwrap();
        let gpu = tempfile::tempdir().unwrap();
        let key = ConfigKey {
            frequency: 2,
            xz_depth: 100,
            y_depth: 50,
        };
        for dir in [cpu.path(), gpu.path()] {
            write_table(
                dir,
                &key.file_name(TableKind::Frame),
                "gpu_frame_time_elapsed_ns,chunks_in_use\n1000000,64\n2000000,64\n",
            );
            write_table(
                dir,
                &key.file_name(TableKind::Meshing),
                "gpu_meshing_time_elapsed_ns,real_meshing_time_elapsed_ns\n3000000,4000000\n200000000000,1\n",
            );
        }

        let mut request = SweepRequest::meshing_times(1e6);
        request.frequencies = vec![2];
        request.xz_depths = vec![100];
        request.y_depths = vec![50];

        let source = DirectorySource::new(cpu.path(), gpu.path());
        let panels = build_sweep(&source, &request).unwrap();
        let point = &panels[0].points[0];
        assert_eq!(point.chunk_count, 64);
        assert_eq!(point.boxes.len(), 4);
        // the hung row only disappears from the GPU run
        assert_eq!(point.boxes[0].sample_count, 2);
        assert_eq!(point.boxes[1].sample_count, 1);
        assert_eq!(point.boxes[1].stat.unwrap().median, 3.0);
        assert_eq!(point.boxes[3].label, "real meshing times (GPU)");
    }

    #[test]
    fn test_extra_harness_columns_do_not_abort_sweep() {
        let cpu = tempfile::tempdir().unwrap();
        let gpu = tempfile::tempdir().unwrap();
        let key = ConfigKey {
            frequency: 2,
            xz_depth: 100,
            y_depth: 50,
        };
        for dir in [cpu.path(), gpu.path()] {
            write_table(
                dir,
                &key.file_name(TableKind::Frame),
                "gpu_frame_time_elapsed_ns,chunks_in_use\n1000000,64\n",
            );
            write_table(
                dir,
                &key.file_name(TableKind::Meshing),
                "gpu_meshing_time_elapsed_ns,real_meshing_time_elapsed_ns,gpu_meshing_setup_time_ns\n\
                 3000000,4000000,10\n5000000,6000000,20\n",
            );
        }

        let mut request = SweepRequest::meshing_times(1e6);
        request.frequencies = vec![2];
        request.xz_depths = vec![100];
        request.y_depths = vec![50];

        let source = DirectorySource::new(cpu.path(), gpu.path());
        let panels = build_sweep(&source, &request).unwrap();
        let boxes = &panels[0].points[0].boxes;
        assert!(boxes.iter().all(|b| b.sample_count == 2));
        assert_eq!(boxes[2].stat.unwrap().median, 5.0);
    }

    #[test]
    fn test_missing_file_aborts_sweep() {
        let cpu = tempfile::tempdir().unwrap();
        let gpu = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(cpu.path(), gpu.path());
        let request = SweepRequest::frame_times(1e6, DEFAULT_STEADY_STATE_FRAMES);

        match build_sweep(&source, &request) {
            Err(Error::Io { path, .. }) => {
                assert_eq!(path, cpu.path().join("ve001_meshing_samples_w2_xz100_y50.csv"))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
