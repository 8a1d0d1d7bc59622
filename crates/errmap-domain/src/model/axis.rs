//! Axis orientation choices and the sign/swap table
//!
//! The user picks how the image axes map onto the two logical measurement
//! axes: one choice for the horizontal role and one for the vertical role.
//! Both roles draw from the same four orientations but must come from
//! opposite coordinate families.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use errmap_types::{Error, Result};

/// Coordinate family an orientation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFamily {
    X,
    Y,
}

/// One of the four image-axis orientations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisChoice {
    /// -x 0 +x
    #[value(name = "x-incr", alias = "0")]
    XIncreasing,
    /// x+ 0 -x
    #[value(name = "x-decr", alias = "1")]
    XDecreasing,
    /// -y 0 +y
    #[value(name = "y-incr", alias = "2")]
    YIncreasing,
    /// y+ 0 -y
    #[value(name = "y-decr", alias = "3")]
    YDecreasing,
}

impl AxisChoice {
    pub const ALL: [AxisChoice; 4] = [
        AxisChoice::XIncreasing,
        AxisChoice::XDecreasing,
        AxisChoice::YIncreasing,
        AxisChoice::YDecreasing,
    ];

    /// Numeric code used in messages: 0/1 for the x family, 2/3 for the y family
    pub fn code(self) -> u8 {
        match self {
            AxisChoice::XIncreasing => 0,
            AxisChoice::XDecreasing => 1,
            AxisChoice::YIncreasing => 2,
            AxisChoice::YDecreasing => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn family(self) -> AxisFamily {
        match self {
            AxisChoice::XIncreasing | AxisChoice::XDecreasing => AxisFamily::X,
            AxisChoice::YIncreasing | AxisChoice::YDecreasing => AxisFamily::Y,
        }
    }

    /// Button-style label
    pub fn label(self) -> &'static str {
        match self {
            AxisChoice::XIncreasing => "-x 0 +x",
            AxisChoice::XDecreasing => "x+ 0 -x",
            AxisChoice::YIncreasing => "-y 0 +y",
            AxisChoice::YDecreasing => "y+ 0 -y",
        }
    }
}

impl std::fmt::Display for AxisChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Orientation chosen for the horizontal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizontalOrientation(pub AxisChoice);

/// Orientation chosen for the vertical role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalOrientation(pub AxisChoice);

/// Validated (horizontal, vertical) pair drawn from opposite families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPair {
    horizontal: HorizontalOrientation,
    vertical: VerticalOrientation,
}

impl AxisPair {
    pub fn new(horizontal: HorizontalOrientation, vertical: VerticalOrientation) -> Result<Self> {
        if horizontal.0.family() == vertical.0.family() {
            return Err(Error::InvalidAxisCombination {
                horizontal: horizontal.0.code(),
                vertical: vertical.0.code(),
            });
        }
        Ok(Self {
            horizontal,
            vertical,
        })
    }

    pub fn from_choices(horizontal: AxisChoice, vertical: AxisChoice) -> Result<Self> {
        Self::new(HorizontalOrientation(horizontal), VerticalOrientation(vertical))
    }

    pub fn horizontal(&self) -> HorizontalOrientation {
        self.horizontal
    }

    pub fn vertical(&self) -> VerticalOrientation {
        self.vertical
    }

    /// Whether [`AxisPair::resolve`] has a sign convention for this pair
    pub fn is_supported(&self) -> bool {
        self.resolve(0.0, 0.0).is_ok()
    }

    /// Map a raw displacement `target - reference` to `(vertical_value, horizontal_value)`.
    pub fn resolve(&self, relative_x: f64, relative_y: f64) -> Result<(f64, f64)> {
        use AxisChoice::*;

        let unsupported = || Error::UnsupportedAxisCombination {
            horizontal: self.horizontal.0.code(),
            vertical: self.vertical.0.code(),
        };

        match (self.horizontal.0, self.vertical.0) {
            (XIncreasing, YDecreasing) => Ok((relative_x, -relative_y)),
            (XDecreasing, YDecreasing) => Ok((-relative_x, -relative_y)),
            (YIncreasing, XDecreasing) => Ok((-relative_y, relative_x)),
            (YDecreasing, XDecreasing) => Ok((-relative_y, -relative_x)),
            // Family-valid pairs without an agreed sign convention
            (XIncreasing, YIncreasing)
            | (XDecreasing, YIncreasing)
            | (YIncreasing, XIncreasing)
            | (YDecreasing, XIncreasing) => Err(unsupported()),
            // Unreachable through `new`, kept so the table stays total
            (XIncreasing | XDecreasing, XIncreasing | XDecreasing)
            | (YIncreasing | YDecreasing, YIncreasing | YDecreasing) => {
                Err(Error::InvalidAxisCombination {
                    horizontal: self.horizontal.0.code(),
                    vertical: self.vertical.0.code(),
                })
            }
        }
    }
}

impl std::fmt::Display for AxisPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "horizontal {} / vertical {}",
            self.horizontal.0, self.vertical.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(h: u8, v: u8) -> Result<AxisPair> {
        AxisPair::from_choices(
            AxisChoice::from_code(h).unwrap(),
            AxisChoice::from_code(v).unwrap(),
        )
    }

    #[test]
    fn test_same_family_pairs_rejected() {
        for (h, v) in [(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)] {
            match pair(h, v) {
                Err(Error::InvalidAxisCombination { horizontal, vertical }) => {
                    assert_eq!((horizontal, vertical), (h, v));
                }
                other => panic!("({}, {}) should be rejected, got {:?}", h, v, other),
            }
        }
    }

    #[test]
    fn test_opposite_family_pairs_accepted() {
        for (h, v) in [(0, 2), (0, 3), (1, 2), (1, 3), (2, 0), (2, 1), (3, 0), (3, 1)] {
            assert!(pair(h, v).is_ok(), "({}, {}) should be accepted", h, v);
        }
    }

    #[test]
    fn test_x_incr_y_decr() {
        let axes = pair(0, 3).unwrap();
        assert_eq!(axes.resolve(3.0, 4.0).unwrap(), (3.0, -4.0));
    }

    #[test]
    fn test_sign_table() {
        assert_eq!(pair(1, 3).unwrap().resolve(3.0, 4.0).unwrap(), (-3.0, -4.0));
        assert_eq!(pair(2, 1).unwrap().resolve(3.0, 4.0).unwrap(), (-4.0, 3.0));
        assert_eq!(pair(3, 1).unwrap().resolve(3.0, 4.0).unwrap(), (-4.0, -3.0));
    }

    #[test]
    fn test_unmapped_pairs_fail_explicitly() {
        for (h, v) in [(0, 2), (1, 2), (2, 0), (3, 0)] {
            let axes = pair(h, v).unwrap();
            assert!(!axes.is_supported());
            assert!(matches!(
                axes.resolve(1.0, 1.0),
                Err(Error::UnsupportedAxisCombination { .. })
            ));
        }
        for (h, v) in [(0, 3), (1, 3), (2, 1), (3, 1)] {
            assert!(pair(h, v).unwrap().is_supported());
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for choice in AxisChoice::ALL {
            assert_eq!(AxisChoice::from_code(choice.code()), Some(choice));
        }
        assert_eq!(AxisChoice::from_code(4), None);
    }
}
