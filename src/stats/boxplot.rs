//! Box-and-whisker statistics
//!
//! Quartiles use linear interpolation between nearest ranks. Whiskers reach
//! the most extreme samples that still lie within `k * IQR` of the box;
//! anything further out is an outlier and is neither part of the whisker nor
//! drawn on its own.

/// Whisker reach in multiples of the interquartile range.
pub const DEFAULT_WHISKER_IQR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStat {
    pub median: f64,
    /// Mean over every sample, outliers included.
    pub mean: f64,
    pub q1: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
}

impl BoxStat {
    /// Compute the box for `samples`. `NaN`s must already be removed.
    /// Returns `None` for an empty set.
    pub fn compute(samples: &[f64], whisker_iqr: f64) -> Option<BoxStat> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = percentile_of_sorted(&sorted, 25.0);
        let median = percentile_of_sorted(&sorted, 50.0);
        let q3 = percentile_of_sorted(&sorted, 75.0);
        let iqr = q3 - q1;

        let low_fence = q1 - whisker_iqr * iqr;
        let high_fence = q3 + whisker_iqr * iqr;

        // The fences always enclose q1..q3, so both searches find a sample.
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1)
            .min(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3)
            .max(q3);

        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Some(BoxStat {
            median,
            mean,
            q1,
            q3,
            lower_whisker,
            upper_whisker,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Percentile of an already sorted, non-empty slice.
fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = percentile / 100.0 * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}
