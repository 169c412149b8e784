mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use eframe::egui;

use meshstat::charts::{ChartKind, ChartSet, CustomChart, PlotLayout, SweepChart, NS_PER_MS};
use meshstat::stats::DEFAULT_CYCLE_LENGTH;
use meshstat::sweep::DEFAULT_STEADY_STATE_FRAMES;

use app::MeshstatApp;
use state::AppState;

/// Plot benchmark sample tables.
#[derive(Parser, Debug)]
#[command(name = "meshstat", version, about = "Voxel meshing benchmark statistics viewer")]
struct Cli {
    /// JSON chart list. Takes precedence over a subcommand.
    #[arg(long)]
    charts: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-phase mean and deviation of the benchmark tables
    Phase(PhaseArgs),
    /// One chart per column of a merged CSV
    Custom(CustomArgs),
    /// CPU vs GPU box plots over the configuration sweep
    Sweep(SweepArgs),
}

#[derive(Args, Debug)]
struct PhaseArgs {
    /// Plot server and client frame times
    #[arg(short = 't', long)]
    frame_timings: bool,

    /// Plot meshing times
    #[arg(short = 'm', long)]
    meshing_timings: bool,

    /// Plot generated primitives per passed sample
    #[arg(short = 'r', long)]
    prims_samples_ratio: bool,

    /// Plot GPU memory usage
    #[arg(short = 's', long)]
    memory_server: bool,

    /// Plot CPU memory usage
    #[arg(short = 'c', long)]
    memory_client: bool,

    /// Plot chunks in use
    #[arg(short = 'u', long)]
    chunks_count: bool,

    /// Charts per row
    #[arg(short = 'k', long, default_value_t = 2)]
    columns_count: usize,

    /// Vertical gap between rows, in screen points (e.g. 40), not a figure fraction
    #[arg(short = 'p', long, default_value_t = 0.0)]
    h_space: f32,

    /// Horizontal gap between columns, in screen points (e.g. 20), not a figure fraction
    #[arg(short = 'w', long, default_value_t = 0.0)]
    w_space: f32,

    #[arg(long, default_value = "ve001_frame_samples.csv")]
    frame_samples: PathBuf,

    #[arg(long, default_value = "ve001_meshing_samples.csv")]
    meshing_samples: PathBuf,

    /// Frames per repeated measurement cycle
    #[arg(long, default_value_t = DEFAULT_CYCLE_LENGTH)]
    cycle_length: usize,

    /// Divides nanosecond timings
    #[arg(long, default_value_t = NS_PER_MS)]
    time_divisor: f64,
}

#[derive(Args, Debug)]
struct CustomArgs {
    #[arg(long)]
    csv_file: PathBuf,

    /// Chart titles, in column order
    #[arg(long, num_args = 1..)]
    titles: Vec<String>,

    #[arg(long, default_value = "")]
    x_label: String,

    #[arg(long, default_value = "")]
    y_label: String,

    #[arg(long, default_value_t = NS_PER_MS)]
    divisor: f64,

    /// Link the y axes of all charts
    #[arg(short = 'y', long)]
    share_y: bool,

    /// Horizontal gap between columns, in screen points (e.g. 20), not a figure fraction
    #[arg(short = 'w', long, default_value_t = 0.0)]
    w_space: f32,

    /// Charts per row (default: all on one row)
    #[arg(short = 'k', long, default_value_t = 0)]
    columns_count: usize,

    #[arg(long, default_value_t = DEFAULT_CYCLE_LENGTH)]
    cycle_length: usize,
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Directory with the CPU run tables
    #[arg(short = 'c', long)]
    cpu_dir: PathBuf,

    /// Directory with the GPU run tables
    #[arg(short = 'g', long)]
    gpu_dir: PathBuf,

    #[arg(short = 't', long, default_value_t = NS_PER_MS)]
    time_divisor: f64,

    /// Compare meshing times instead of frame times
    #[arg(short = 'm', long)]
    meshing: bool,

    /// Trailing frames treated as steady state
    #[arg(long, default_value_t = DEFAULT_STEADY_STATE_FRAMES)]
    steady_state: usize,
}

impl PhaseArgs {
    fn into_chart_set(self) -> ChartSet {
        let divisor = self.time_divisor;
        let selected = [
            (self.frame_timings, ChartKind::FrameTimings { time_divisor: divisor }),
            (self.meshing_timings, ChartKind::MeshingTimings { time_divisor: divisor }),
            (self.prims_samples_ratio, ChartKind::PrimsSamplesRatio),
            (self.memory_server, ChartKind::MemoryServer),
            (self.memory_client, ChartKind::MemoryClient),
            (self.chunks_count, ChartKind::ChunksCount),
        ];

        ChartSet {
            layout: PlotLayout {
                columns_count: self.columns_count,
                h_space: self.h_space,
                w_space: self.w_space,
                share_y: false,
            },
            cycle_length: self.cycle_length,
            frame_samples: self.frame_samples,
            meshing_samples: self.meshing_samples,
            charts: selected
                .into_iter()
                .filter_map(|(on, kind)| on.then_some(kind))
                .collect(),
        }
    }
}

impl CustomArgs {
    fn into_chart_set(self) -> ChartSet {
        ChartSet {
            layout: PlotLayout {
                columns_count: self.columns_count,
                h_space: 0.0,
                w_space: self.w_space,
                share_y: self.share_y,
            },
            cycle_length: self.cycle_length,
            charts: vec![ChartKind::Custom(CustomChart {
                csv_file: self.csv_file,
                titles: self.titles,
                x_label: self.x_label,
                y_label: self.y_label,
                divisor: self.divisor,
            })],
            ..ChartSet::default()
        }
    }
}

impl SweepArgs {
    fn into_chart_set(self) -> ChartSet {
        ChartSet {
            charts: vec![ChartKind::Sweep(SweepChart {
                cpu_dir: self.cpu_dir,
                gpu_dir: self.gpu_dir,
                time_divisor: self.time_divisor,
                meshing: self.meshing,
                steady_state: self.steady_state,
            })],
            ..ChartSet::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let set = match (cli.charts, cli.command) {
        (Some(path), command) => {
            if command.is_some() {
                log::warn!("--charts given, ignoring the subcommand");
            }
            ChartSet::from_json_file(&path)?
        }
        (None, Some(Command::Phase(args))) => args.into_chart_set(),
        (None, Some(Command::Custom(args))) => args.into_chart_set(),
        (None, Some(Command::Sweep(args))) => args.into_chart_set(),
        (None, None) => bail!("nothing to plot: pass a subcommand or --charts FILE"),
    };

    if set.charts.is_empty() {
        bail!("no chart selected");
    }

    let charts = set.build().context("computing charts")?;
    log::info!("{} charts ready", charts.len());
    let state = AppState::new(charts, set.layout);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "meshstat – benchmark statistics",
        options,
        Box::new(|_cc| Ok(Box::new(MeshstatApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_set(argv: &[&str]) -> ChartSet {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Command::Phase(args)) => args.into_chart_set(),
            Some(Command::Custom(args)) => args.into_chart_set(),
            Some(Command::Sweep(args)) => args.into_chart_set(),
            None => panic!("no subcommand"),
        }
    }

    #[test]
    fn test_phase_flags_select_charts_and_spacing() {
        let set = chart_set(&["meshstat", "phase", "-t", "-u", "-k", "3", "-p", "40", "-w", "20"]);
        assert_eq!(set.charts.len(), 2);
        assert!(matches!(set.charts[0], ChartKind::FrameTimings { .. }));
        assert_eq!(set.charts[1], ChartKind::ChunksCount);
        assert_eq!(set.layout.columns_count, 3);
        assert_eq!(set.layout.h_space, 40.0);
        assert_eq!(set.layout.w_space, 20.0);
    }

    #[test]
    fn test_custom_defaults_to_one_row() {
        let set = chart_set(&["meshstat", "custom", "--csv-file", "m.csv", "-y", "-w", "12"]);
        assert_eq!(set.layout.columns_count, 0);
        assert!(set.layout.share_y);
        assert_eq!(set.layout.w_space, 12.0);
    }
}
