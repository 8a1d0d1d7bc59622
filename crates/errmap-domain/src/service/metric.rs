//! Pixel-distance, scaling-factor and real-world conversion formulas

use errmap_types::{Error, Point, Result};

/// Euclidean distance between two image-space points
pub fn pixel_distance(p1: Point, p2: Point) -> f64 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}

/// Centimeters per pixel for a known real-world distance
pub fn scaling_factor(real_distance: f64, pixel_distance: f64) -> Result<f64> {
    if pixel_distance == 0.0 {
        return Err(Error::DivisionByZero);
    }
    Ok(real_distance / pixel_distance)
}

/// Real-world length of the segment `p1 -> p2`
pub fn error_magnitude(p1: Point, p2: Point, scale: f64) -> f64 {
    pixel_distance(p1, p2) * scale
}

/// Real-world `(dx, dy)` of the segment `p1 -> p2`
pub fn real_world_delta(p1: Point, p2: Point, scale: f64) -> (f64, f64) {
    ((p2.x - p1.x) * scale, (p2.y - p1.y) * scale)
}
