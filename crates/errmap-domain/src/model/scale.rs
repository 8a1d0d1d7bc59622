use serde::{Deserialize, Serialize};

use errmap_types::{Error, Result};

/// Real-world centimeters represented by one pixel
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ScalingFactor(f64);

impl ScalingFactor {
    pub fn new(cm_per_pixel: f64) -> Result<Self> {
        if !cm_per_pixel.is_finite() || cm_per_pixel <= 0.0 {
            return Err(Error::InvalidDistance(format!(
                "scaling factor must be a positive number, got {}",
                cm_per_pixel
            )));
        }
        Ok(Self(cm_per_pixel))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for ScalingFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
