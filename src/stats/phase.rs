//! Periodic Phase Aggregation
//!
//! The harness repeats the same camera path over and over, so frame `i` and
//! frame `i + L` see the same scene. Folding the run on the cycle length `L`
//! gives one mean/deviation pair per position in the cycle.

use crate::error::{Error, Result};

/// Frames per cycle in the benchmark harness.
pub const DEFAULT_CYCLE_LENGTH: usize = 60;

/// Statistics of one phase of the cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStatistic {
    /// Position in the cycle, `0..cycle_length`.
    pub phase: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Number of samples that fell into this phase.
    pub count: usize,
}

/// One aggregated series, ready to be drawn as a line with error bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseCurve {
    pub label: String,
    pub stats: Vec<CycleStatistic>,
}

/// Fold `series` on `cycle_length` and compute per-phase mean and
/// population standard deviation.
///
/// A trailing partial cycle is allowed: the phases it does not reach simply
/// have one sample fewer. Every phase must receive at least one sample.
pub fn aggregate(series: &[f64], cycle_length: usize) -> Result<Vec<CycleStatistic>> {
    if cycle_length == 0 {
        return Err(Error::ZeroCycleLength);
    }
    if series.len() < cycle_length {
        return Err(Error::EmptySeries {
            phase: series.len(),
        });
    }

    let stats = (0..cycle_length)
        .map(|phase| {
            let samples = || series.iter().skip(phase).step_by(cycle_length);
            let count = samples().count();
            let mean = samples().sum::<f64>() / count as f64;
            let variance = samples().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

            CycleStatistic {
                phase,
                mean,
                std_dev: variance.sqrt(),
                count,
            }
        })
        .collect();

    Ok(stats)
}

/// Aggregate several series on the same axis. Each one is folded on its own,
/// starting at phase 0.
pub fn aggregate_all<S: AsRef<[f64]>>(
    series: &[(String, S)],
    cycle_length: usize,
) -> Result<Vec<PhaseCurve>> {
    series
        .iter()
        .map(|(label, values)| {
            Ok(PhaseCurve {
                label: label.clone(),
                stats: aggregate(values.as_ref(), cycle_length)?,
            })
        })
        .collect()
}
