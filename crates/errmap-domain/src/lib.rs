//! Domain layer: measurement engine, axis resolution, calibration and trial sequencing

pub mod model;
pub mod repository;
pub mod service;
