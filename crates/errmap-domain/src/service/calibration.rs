//! Two-point calibration workflow
//!
//! Points on the calibration image → axis orientation → real distance →
//! scaling factor.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use errmap_types::{Error, Point, Result};

use crate::model::{AxisChoice, AxisPair, ScalingFactor};
use crate::service::metric;

/// Minimum per-axis distance between the two calibration points
pub const DEFAULT_MIN_SEPARATION: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalibrationState {
    AwaitingTwoPoints,
    AwaitingAxisChoice,
    AwaitingDistance,
    Complete,
}

/// Outcome of a completed calibration, immutable for the rest of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    pub image: PathBuf,
    pub points: [Point; 2],
    pub axes: AxisPair,
    pub distance_cm: f64,
    pub pixel_distance: f64,
    pub scale: ScalingFactor,
}

impl Calibration {
    /// Confirmation text shown before moving on to the trial images
    pub fn summary(&self) -> String {
        format!(
            "Distance entered: {} cm\nPixel Distance: {:.2}\nScaling Factor: {:.6}",
            self.distance_cm,
            self.pixel_distance,
            self.scale.value()
        )
    }
}

impl std::fmt::Display for Calibration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationSequencer {
    state: CalibrationState,
    image: Option<PathBuf>,
    points: Vec<Point>,
    axes: Option<AxisPair>,
    result: Option<Calibration>,
    min_separation: f64,
}

impl Default for CalibrationSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationSequencer {
    pub fn new() -> Self {
        Self::with_min_separation(DEFAULT_MIN_SEPARATION)
    }

    pub fn with_min_separation(min_separation: f64) -> Self {
        Self {
            state: CalibrationState::AwaitingTwoPoints,
            image: None,
            points: Vec::with_capacity(2),
            axes: None,
            result: None,
            min_separation,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn axes(&self) -> Option<AxisPair> {
        self.axes
    }

    /// The finished calibration, once in [`CalibrationState::Complete`]
    pub fn calibration(&self) -> Option<&Calibration> {
        self.result.as_ref()
    }

    pub fn into_calibration(self) -> Option<Calibration> {
        self.result
    }

    /// Choose the calibration image and start collecting points on it
    pub fn select_image(&mut self, image: impl Into<PathBuf>) {
        let image = image.into();
        info!(image = %image.display(), "calibration image selected");
        self.image = Some(image);
        self.reselect_points();
    }

    /// Accept one clicked point; returns the state after the click
    pub fn select_point(&mut self, point: Point) -> Result<CalibrationState> {
        if self.image.is_none() {
            return Err(Error::InvalidState(
                "select a calibration image before picking points".to_string(),
            ));
        }
        if self.state != CalibrationState::AwaitingTwoPoints {
            return Err(Error::InvalidState(
                "two points are already selected; reselect points to start over".to_string(),
            ));
        }

        let too_close = self.points.iter().any(|p| {
            (p.x - point.x).abs() < self.min_separation && (p.y - point.y).abs() < self.min_separation
        });
        if too_close {
            warn!(%point, "calibration point too close to a previous point");
            self.reselect_points();
            return Err(Error::InvalidSelection(
                "You cannot select the same spot or too close to it.".to_string(),
            ));
        }

        debug!(%point, "calibration point selected");
        self.points.push(point);
        if self.points.len() == 2 {
            self.state = CalibrationState::AwaitingAxisChoice;
        }
        Ok(self.state)
    }

    /// Pick the horizontal and vertical orientation
    pub fn choose_axes(&mut self, horizontal: AxisChoice, vertical: AxisChoice) -> Result<CalibrationState> {
        match self.state {
            CalibrationState::AwaitingAxisChoice | CalibrationState::AwaitingDistance => {}
            CalibrationState::AwaitingTwoPoints => {
                return Err(Error::InvalidState(
                    "select two points before choosing axes".to_string(),
                ))
            }
            CalibrationState::Complete => {
                return Err(Error::InvalidState(
                    "calibration is complete; reselect points to change axes".to_string(),
                ))
            }
        }

        let axes = AxisPair::from_choices(horizontal, vertical)?;
        if !axes.is_supported() {
            warn!(%axes, "axis pair has no sign convention; trials will be rejected");
        }
        self.axes = Some(axes);
        self.state = CalibrationState::AwaitingDistance;
        Ok(self.state)
    }

    /// Parse user input and continue with [`CalibrationSequencer::enter_distance`]
    pub fn enter_distance_text(&mut self, text: &str) -> Result<&Calibration> {
        let distance: f64 = text.trim().parse().map_err(|_| {
            Error::InvalidDistance(format!("'{}' is not a number", text.trim()))
        })?;
        self.enter_distance(distance)
    }

    /// Real-world distance between the two points, in centimeters
    pub fn enter_distance(&mut self, distance_cm: f64) -> Result<&Calibration> {
        if self.state != CalibrationState::AwaitingDistance {
            return Err(Error::InvalidState(
                "select two points and the axes before entering a distance".to_string(),
            ));
        }
        if !distance_cm.is_finite() || distance_cm <= 0.0 {
            return Err(Error::InvalidDistance(
                "Distance must be a positive number.".to_string(),
            ));
        }

        let (image, axes) = match (&self.image, self.axes) {
            (Some(image), Some(axes)) => (image.clone(), axes),
            _ => return Err(Error::InvalidState("missing axis selection".to_string())),
        };
        let points = [self.points[0], self.points[1]];
        let pixel_distance = metric::pixel_distance(points[0], points[1]);
        let scale = ScalingFactor::new(metric::scaling_factor(distance_cm, pixel_distance)?)?;

        info!(
            distance_cm,
            pixel_distance,
            scale = scale.value(),
            "calibration complete"
        );
        self.state = CalibrationState::Complete;
        Ok(self.result.insert(Calibration {
            image,
            points,
            axes,
            distance_cm,
            pixel_distance,
            scale,
        }))
    }

    /// Drop the points, axes and any result; the image stays selected
    pub fn reselect_points(&mut self) {
        self.points.clear();
        self.axes = None;
        self.result = None;
        self.state = CalibrationState::AwaitingTwoPoints;
    }

    /// Like [`CalibrationSequencer::reselect_points`], also discarding the image
    pub fn reselect_image(&mut self) {
        self.reselect_points();
        self.image = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer_with_points(a: Point, b: Point) -> CalibrationSequencer {
        let mut seq = CalibrationSequencer::new();
        seq.select_image("cal.png");
        seq.select_point(a).unwrap();
        seq.select_point(b).unwrap();
        seq
    }

    #[test]
    fn test_full_calibration() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(60.0, 80.0));
        assert_eq!(seq.state(), CalibrationState::AwaitingAxisChoice);

        seq.choose_axes(AxisChoice::XIncreasing, AxisChoice::YDecreasing)
            .unwrap();
        assert_eq!(seq.state(), CalibrationState::AwaitingDistance);

        let cal = seq.enter_distance(10.0).unwrap();
        assert!((cal.pixel_distance - 100.0).abs() < 1e-12);
        assert!((cal.scale.value() - 0.1).abs() < 1e-12);
        assert_eq!(
            cal.summary(),
            "Distance entered: 10 cm\nPixel Distance: 100.00\nScaling Factor: 0.100000"
        );
        assert_eq!(seq.state(), CalibrationState::Complete);
        assert!(seq.calibration().is_some());
    }

    #[test]
    fn test_points_need_an_image() {
        let mut seq = CalibrationSequencer::new();
        assert!(matches!(
            seq.select_point(Point::new(1.0, 1.0)),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_too_close_point_restarts_accumulation() {
        let mut seq = CalibrationSequencer::new();
        seq.select_image("cal.png");
        seq.select_point(Point::new(10.0, 10.0)).unwrap();
        let err = seq.select_point(Point::new(10.5, 9.6)).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection(_)));
        assert!(seq.points().is_empty());
        assert_eq!(seq.state(), CalibrationState::AwaitingTwoPoints);

        // Close on one axis only is fine
        seq.select_point(Point::new(10.0, 10.0)).unwrap();
        seq.select_point(Point::new(10.5, 50.0)).unwrap();
        assert_eq!(seq.state(), CalibrationState::AwaitingAxisChoice);
    }

    #[test]
    fn test_third_point_rejected() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        assert!(matches!(
            seq.select_point(Point::new(9.0, 9.0)),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(seq.points().len(), 2);
    }

    #[test]
    fn test_same_family_axes_keep_state() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        let err = seq
            .choose_axes(AxisChoice::XIncreasing, AxisChoice::XDecreasing)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAxisCombination { .. }));
        assert_eq!(seq.state(), CalibrationState::AwaitingAxisChoice);
        assert!(seq.axes().is_none());
    }

    #[test]
    fn test_axes_can_be_changed_before_distance() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        seq.choose_axes(AxisChoice::XIncreasing, AxisChoice::YIncreasing)
            .unwrap();
        seq.choose_axes(AxisChoice::YDecreasing, AxisChoice::XDecreasing)
            .unwrap();
        assert_eq!(
            seq.axes(),
            Some(AxisPair::from_choices(AxisChoice::YDecreasing, AxisChoice::XDecreasing).unwrap())
        );
    }

    #[test]
    fn test_invalid_distance() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        seq.choose_axes(AxisChoice::XIncreasing, AxisChoice::YDecreasing)
            .unwrap();

        for bad in [0.0, -2.0, f64::NAN] {
            assert!(matches!(
                seq.enter_distance(bad),
                Err(Error::InvalidDistance(_))
            ));
        }
        assert!(matches!(
            seq.enter_distance_text("ten"),
            Err(Error::InvalidDistance(_))
        ));
        assert_eq!(seq.state(), CalibrationState::AwaitingDistance);

        let cal = seq.enter_distance_text(" 2.5 ").unwrap();
        assert!((cal.scale.value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_distance_before_axes() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        assert!(matches!(
            seq.enter_distance(3.0),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_reselect_points_from_complete() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        seq.choose_axes(AxisChoice::XIncreasing, AxisChoice::YDecreasing)
            .unwrap();
        seq.enter_distance(1.0).unwrap();

        seq.reselect_points();
        assert_eq!(seq.state(), CalibrationState::AwaitingTwoPoints);
        assert!(seq.points().is_empty());
        assert!(seq.axes().is_none());
        assert!(seq.calibration().is_none());
        assert_eq!(seq.image(), Some(Path::new("cal.png")));
    }

    #[test]
    fn test_reselect_image_discards_image() {
        let mut seq = sequencer_with_points(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        seq.reselect_image();
        assert!(seq.image().is_none());
        assert!(seq.points().is_empty());
        assert!(seq.select_point(Point::new(1.0, 1.0)).is_err());
    }
}
