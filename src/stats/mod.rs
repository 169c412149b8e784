//! Statistics over sample columns: per-phase curves and box summaries.

pub mod boxplot;
pub mod phase;

pub use boxplot::{BoxStat, DEFAULT_WHISKER_IQR};
pub use phase::{aggregate, aggregate_all, CycleStatistic, PhaseCurve, DEFAULT_CYCLE_LENGTH};
