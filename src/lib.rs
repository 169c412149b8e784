//! Statistics for voxel meshing benchmark logs.
//!
//! The benchmark harness writes frame and meshing sample tables per run.
//! This crate loads them ([`data`]), folds repeated cycles into per-phase
//! curves ([`stats::phase`]), compares CPU and GPU runs across the
//! configuration sweep ([`sweep`]) and merges columns of several runs into
//! one table ([`merge`]). [`charts`] describes what the viewer draws.

pub mod charts;
pub mod data;
pub mod error;
pub mod merge;
pub mod stats;
pub mod sweep;

pub use error::{Error, Result};
