//! Factor scoring: maps an indicator set and a sentiment reading onto a
//! weighted 0-100 composite score, a discrete signal and a per-factor breakdown.

pub mod engine;
pub mod thresholds;

pub use engine::*;
pub use thresholds::{Bound, ThresholdTable, TrendRegime};
