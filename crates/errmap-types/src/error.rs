//! Error types for errmap

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid axis combination: horizontal={horizontal}, vertical={vertical} (both from the same coordinate family)")]
    InvalidAxisCombination { horizontal: u8, vertical: u8 },

    #[error("Unsupported axis combination: horizontal={horizontal}, vertical={vertical}")]
    UnsupportedAxisCombination { horizontal: u8, vertical: u8 },

    #[error("Invalid distance: {0}")]
    InvalidDistance(String),

    #[error("Pixel distance cannot be zero")]
    DivisionByZero,

    #[error("Out of bounds: {0}")]
    Boundary(String),

    #[error("Operation not allowed now: {0}")]
    InvalidState(String),

    #[error("A page transition is pending; wait for it to finish")]
    TransitionPending,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Excel export error: {0}")]
    Excel(String),

    #[error("CSV export error: {0}")]
    Csv(String),

    #[error("Unsupported export format: {0} (expected .xlsx or .csv)")]
    UnsupportedExport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
