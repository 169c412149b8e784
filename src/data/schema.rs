use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metric – the closed set of columns the benchmark harness writes
// ---------------------------------------------------------------------------

/// One column of the benchmark sample CSVs.
///
/// The harness writes two kinds of tables per run, frame samples and meshing
/// samples. Both draw their headers from this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    GpuFrameTimeElapsedNs,
    CpuFrameTimeElapsedNs,
    GpuMeshingTimeElapsedNs,
    RealMeshingTimeElapsedNs,
    PrimsGenerated,
    SamplesPassed,
    GpuActiveMemoryUsageInUse,
    GpuActiveMemoryUsageReal,
    GpuPassiveMemoryUsage,
    CpuActiveMemoryUsage,
    CpuPassiveMemoryUsage,
    ChunksInUse,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::GpuFrameTimeElapsedNs,
        Metric::CpuFrameTimeElapsedNs,
        Metric::GpuMeshingTimeElapsedNs,
        Metric::RealMeshingTimeElapsedNs,
        Metric::PrimsGenerated,
        Metric::SamplesPassed,
        Metric::GpuActiveMemoryUsageInUse,
        Metric::GpuActiveMemoryUsageReal,
        Metric::GpuPassiveMemoryUsage,
        Metric::CpuActiveMemoryUsage,
        Metric::CpuPassiveMemoryUsage,
        Metric::ChunksInUse,
    ];

    /// Header text as it appears in the CSV files.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::GpuFrameTimeElapsedNs => "gpu_frame_time_elapsed_ns",
            Metric::CpuFrameTimeElapsedNs => "cpu_frame_time_elapsed_ns",
            Metric::GpuMeshingTimeElapsedNs => "gpu_meshing_time_elapsed_ns",
            Metric::RealMeshingTimeElapsedNs => "real_meshing_time_elapsed_ns",
            Metric::PrimsGenerated => "prims_generated",
            Metric::SamplesPassed => "samples_passed",
            Metric::GpuActiveMemoryUsageInUse => "gpu_active_memory_usage_in_use",
            Metric::GpuActiveMemoryUsageReal => "gpu_active_memory_usage_real",
            Metric::GpuPassiveMemoryUsage => "gpu_passive_memory_usage",
            Metric::CpuActiveMemoryUsage => "cpu_active_memory_usage",
            Metric::CpuPassiveMemoryUsage => "cpu_passive_memory_usage",
            Metric::ChunksInUse => "chunks_in_use",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a header is not part of the benchmark schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetric(pub String);

impl fmt::Display for UnknownMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown benchmark column '{}'", self.0)
    }
}

impl std::error::Error for UnknownMetric {}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}
