use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use meshstat::data::model::Dataset;
use meshstat::data::schema::Metric;
use meshstat::data::writer::write_csv;
use meshstat::stats::DEFAULT_CYCLE_LENGTH;
use meshstat::sweep::{
    ConfigKey, Context as RunContext, TableKind, HARNESS_FREQUENCIES, HARNESS_XZ_DEPTHS,
    HARNESS_Y_DEPTHS,
};

/// Write synthetic benchmark tables for trying the tools.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", version)]
struct Cli {
    /// Output directory; gets `cpu/`, `gpu/` and the two top-level tables
    #[arg(short, long, default_value = "sample_data")]
    output: PathBuf,

    /// Measurement cycles per run
    #[arg(long, default_value_t = 10)]
    cycles: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const CHUNK_EDGE: f64 = 32.0;
const FRAME_BUDGET_NS: f64 = 16_600_000.0;
const HUNG_SAMPLE_NS: f64 = 200_000_000_000.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// How one simulated run behaves.
struct RunProfile {
    context: RunContext,
    frequency: u32,
    chunks: f64,
    rows: usize,
}

impl RunProfile {
    fn new(context: RunContext, key: &ConfigKey, cycles: usize) -> Self {
        let xz_chunks = (2.0 * key.xz_depth as f64 / CHUNK_EDGE).ceil();
        let y_chunks = (key.y_depth as f64 / CHUNK_EDGE).ceil();
        RunProfile {
            context,
            frequency: key.frequency,
            chunks: xz_chunks * xz_chunks * y_chunks,
            rows: cycles * DEFAULT_CYCLE_LENGTH,
        }
    }

    /// Meshing cost of one chunk in nanoseconds.
    fn chunk_cost_ns(&self) -> f64 {
        let per_chunk = match self.context {
            RunContext::Cpu => 90_000.0,
            RunContext::Gpu => 12_000.0,
        };
        per_chunk * (1.0 + self.frequency as f64 / 100.0)
    }

    /// Chunks remeshed at a given phase; the load peaks at the start of a cycle.
    fn remeshed(&self, phase: usize) -> f64 {
        let fraction = (-(phase as f64) / 6.0).exp() * 0.05;
        (self.chunks * fraction).max(1.0)
    }

    fn frame_table(&self, rng: &mut SimpleRng) -> anyhow::Result<Dataset> {
        let mut columns: Vec<(Metric, Vec<f64>)> = Metric::ALL
            .iter()
            .filter(|m| {
                !matches!(
                    m,
                    Metric::GpuMeshingTimeElapsedNs | Metric::RealMeshingTimeElapsedNs
                )
            })
            .map(|&m| (m, Vec::with_capacity(self.rows)))
            .collect();

        let pool_bytes = self.chunks * 48_000.0;
        for row in 0..self.rows {
            let phase = row % DEFAULT_CYCLE_LENGTH;
            let meshing = self.remeshed(phase) * self.chunk_cost_ns();
            let gpu_frame =
                (FRAME_BUDGET_NS * 0.4 + meshing * 0.6 + rng.gauss(0.0, 300_000.0)).max(0.0);
            let cpu_frame = (FRAME_BUDGET_NS + meshing + rng.gauss(0.0, 500_000.0)).max(0.0);
            let prims = self.chunks * 2_400.0 + rng.gauss(0.0, 1_000.0);
            let samples = prims * (0.45 + rng.next_f64() * 0.1);
            let in_use = pool_bytes * (0.6 + 0.3 * (phase as f64 / DEFAULT_CYCLE_LENGTH as f64));

            for (metric, values) in &mut columns {
                values.push(match metric {
                    Metric::GpuFrameTimeElapsedNs => gpu_frame.round(),
                    Metric::CpuFrameTimeElapsedNs => cpu_frame.round(),
                    Metric::PrimsGenerated => prims.round(),
                    Metric::SamplesPassed => samples.round(),
                    Metric::GpuActiveMemoryUsageInUse => in_use.round(),
                    Metric::GpuActiveMemoryUsageReal => pool_bytes,
                    Metric::GpuPassiveMemoryUsage => (pool_bytes * 0.25).round(),
                    Metric::CpuActiveMemoryUsage => (in_use * 0.5).round(),
                    Metric::CpuPassiveMemoryUsage => (pool_bytes * 0.1).round(),
                    Metric::ChunksInUse => self.chunks,
                    Metric::GpuMeshingTimeElapsedNs | Metric::RealMeshingTimeElapsedNs => f64::NAN,
                });
            }
        }

        let mut table = Dataset::new(TableKind::Frame.as_str());
        for (metric, values) in columns {
            table.push_column(metric.as_str(), values)?;
        }
        Ok(table)
    }

    fn meshing_table(&self, rng: &mut SimpleRng) -> anyhow::Result<Dataset> {
        let mut gpu = Vec::with_capacity(self.rows);
        let mut real = Vec::with_capacity(self.rows);
        for row in 0..self.rows {
            let phase = row % DEFAULT_CYCLE_LENGTH;
            let busy = self.remeshed(phase) * self.chunk_cost_ns();
            let exec = (busy + rng.gauss(0.0, busy * 0.05)).max(0.0);
            gpu.push(exec.round());
            real.push((exec * (1.2 + rng.next_f64() * 0.3)).round());
        }

        // A stalled run: the GPU timer query never came back.
        if self.context == RunContext::Gpu && self.frequency == HARNESS_FREQUENCIES[0] {
            if let Some(slot) = gpu.get_mut(self.rows / 2) {
                *slot = HUNG_SAMPLE_NS;
            }
        }

        let mut table = Dataset::new(TableKind::Meshing.as_str());
        table.push_column(Metric::GpuMeshingTimeElapsedNs.as_str(), gpu)?;
        table.push_column(Metric::RealMeshingTimeElapsedNs.as_str(), real)?;
        Ok(table)
    }
}

fn write_run(dir: &Path, name: &str, table: &Dataset) -> anyhow::Result<()> {
    let path = dir.join(name);
    write_csv(table, &path).with_context(|| format!("writing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(cli.seed);

    for context in [RunContext::Cpu, RunContext::Gpu] {
        let dir = cli.output.join(context.to_string().to_lowercase());
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        for &frequency in &HARNESS_FREQUENCIES {
            for (&xz_depth, &y_depth) in HARNESS_XZ_DEPTHS.iter().zip(&HARNESS_Y_DEPTHS) {
                let key = ConfigKey {
                    frequency,
                    xz_depth,
                    y_depth,
                };
                let run = RunProfile::new(context, &key, cli.cycles);
                write_run(&dir, &key.file_name(TableKind::Frame), &run.frame_table(&mut rng)?)?;
                write_run(&dir, &key.file_name(TableKind::Meshing), &run.meshing_table(&mut rng)?)?;
            }
        }
        log::info!(
            "wrote {} runs to {}",
            HARNESS_FREQUENCIES.len() * HARNESS_XZ_DEPTHS.len(),
            dir.display()
        );
    }

    // Stand-alone tables for the phase charts.
    let key = ConfigKey {
        frequency: HARNESS_FREQUENCIES[1],
        xz_depth: HARNESS_XZ_DEPTHS[2],
        y_depth: HARNESS_Y_DEPTHS[2],
    };
    let run = RunProfile::new(RunContext::Gpu, &key, cli.cycles);
    write_run(&cli.output, "ve001_frame_samples.csv", &run.frame_table(&mut rng)?)?;
    write_run(&cli.output, "ve001_meshing_samples.csv", &run.meshing_table(&mut rng)?)?;

    println!("Wrote sample benchmark data to {}", cli.output.display());
    Ok(())
}
