//! Domain services

pub mod calibration;
pub mod metric;
pub mod statistics;
pub mod trial;

pub use calibration::{Calibration, CalibrationSequencer, CalibrationState, DEFAULT_MIN_SEPARATION};
pub use statistics::{generate_statistics_report, ColumnStats};
pub use trial::{measure_trial, Advance, TrialSequencer, TrialState, TrialStep};
