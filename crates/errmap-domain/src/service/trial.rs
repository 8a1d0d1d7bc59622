//! Per-image reference/target workflow over the session worklist

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use errmap_types::{Error, Point, Result, TrialRecord};

use crate::model::{AxisPair, ScalingFactor, Worklist};
use crate::repository::ResultLedger;
use crate::service::calibration::Calibration;
use crate::service::metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrialState {
    /// Next click fixes the reference (center) point
    AwaitingReference,
    /// Next click is the target point
    AwaitingTarget,
    /// Current image measured; waiting for `advance`
    Recorded,
    /// Every image of the worklist has been measured
    Finished,
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialStep {
    ReferenceSet(Point),
    Recorded(TrialRecord),
}

/// Result of moving past a recorded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Now on the given trial index
    Next(u32),
    /// Worklist exhausted
    Completed,
}

/// Convert one reference/target pair into a trial record.
///
/// The resolved `(vertical_value, horizontal_value)` is measured from the
/// origin; a zero-length error forces both components to zero.
pub fn measure_trial(
    trial: u32,
    reference: Point,
    target: Point,
    axes: &AxisPair,
    scale: ScalingFactor,
) -> Result<TrialRecord> {
    let relative_x = target.x - reference.x;
    let relative_y = target.y - reference.y;
    let (vertical_value, horizontal_value) = axes.resolve(relative_x, relative_y)?;
    let resolved = Point::new(vertical_value, horizontal_value);

    let z_axis = metric::error_magnitude(Point::ORIGIN, resolved, scale.value());
    let (x_axis, y_axis) = if z_axis == 0.0 {
        (0.0, 0.0)
    } else {
        metric::real_world_delta(Point::ORIGIN, resolved, scale.value())
    };

    Ok(TrialRecord::new(trial, z_axis, y_axis, x_axis))
}

/// Drives trials 1..N of a calibrated session and keeps the ledger in step.
///
/// Ledger records always equal the trial index minus the in-progress step:
/// `trial - 1` records while awaiting clicks, `trial` once recorded or finished.
#[derive(Debug)]
pub struct TrialSequencer<L: ResultLedger> {
    calibration: Calibration,
    worklist: Worklist,
    ledger: L,
    trial: usize,
    state: TrialState,
    reference: Option<Point>,
    pending_reference: Option<Point>,
    current: Option<TrialRecord>,
}

impl<L: ResultLedger> TrialSequencer<L> {
    pub fn new(calibration: Calibration, worklist: Worklist, ledger: L) -> Result<Self> {
        if worklist.trial_count() == 0 {
            return Err(Error::Boundary(
                "the folder has no images besides the calibration image".to_string(),
            ));
        }
        info!(
            trials = worklist.trial_count(),
            scale = calibration.scale.value(),
            axes = %calibration.axes,
            "trial session started"
        );
        Ok(Self {
            calibration,
            worklist,
            ledger,
            trial: 1,
            state: TrialState::AwaitingReference,
            reference: None,
            pending_reference: None,
            current: None,
        })
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    /// 1-based index of the image being measured
    pub fn trial_index(&self) -> u32 {
        self.trial as u32
    }

    pub fn trial_count(&self) -> u32 {
        self.worklist.trial_count() as u32
    }

    pub fn current_image(&self) -> &Path {
        // `trial` stays within 1..len by construction
        self.worklist
            .get(self.trial)
            .unwrap_or_else(|| self.worklist.calibration_image())
    }

    /// Reference in effect for the next target click
    pub fn reference(&self) -> Option<Point> {
        self.pending_reference.or(self.reference)
    }

    /// Record produced on the current image, until the next image is loaded
    pub fn current_record(&self) -> Option<TrialRecord> {
        self.current
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn worklist(&self) -> &Worklist {
        &self.worklist
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    pub fn is_finished(&self) -> bool {
        self.state == TrialState::Finished
    }

    /// Handle one click on the current image
    pub fn select_point(&mut self, point: Point) -> Result<TrialStep> {
        match self.state {
            TrialState::AwaitingReference => {
                debug!(trial = self.trial, %point, "reference point selected");
                self.pending_reference = Some(point);
                self.state = TrialState::AwaitingTarget;
                Ok(TrialStep::ReferenceSet(point))
            }
            TrialState::AwaitingTarget => {
                let reference = self.reference().ok_or_else(|| {
                    Error::InvalidState("no reference point has been selected".to_string())
                })?;
                debug!(trial = self.trial, %point, "target point selected");

                let record = measure_trial(
                    self.trial_index(),
                    reference,
                    point,
                    &self.calibration.axes,
                    self.calibration.scale,
                )?;
                self.ledger.append(&record)?;

                if let Some(new_reference) = self.pending_reference.take() {
                    self.reference = Some(new_reference);
                }
                self.current = Some(record);
                self.state = TrialState::Recorded;
                info!(
                    trial = record.trial,
                    z = record.z_axis,
                    y = record.y_axis,
                    x = record.x_axis,
                    "trial recorded"
                );
                Ok(TrialStep::Recorded(record))
            }
            TrialState::Recorded => Err(Error::InvalidState(
                "this image is already measured; the next image is on its way".to_string(),
            )),
            TrialState::Finished => Err(Error::InvalidState(
                "all images have been processed".to_string(),
            )),
        }
    }

    /// Move from a recorded image to the next one
    pub fn advance(&mut self) -> Result<Advance> {
        match self.state {
            TrialState::Recorded => {}
            TrialState::Finished => {
                return Err(Error::Boundary("no images left after the last one".to_string()))
            }
            TrialState::AwaitingReference | TrialState::AwaitingTarget => {
                return Err(Error::InvalidState(
                    "measure the current image before moving on".to_string(),
                ))
            }
        }

        if self.trial + 1 < self.worklist.len() {
            self.trial += 1;
            self.current = None;
            self.state = TrialState::AwaitingTarget;
            info!(trial = self.trial, "advanced to next image");
            Ok(Advance::Next(self.trial_index()))
        } else {
            self.state = TrialState::Finished;
            info!(trials = self.trial, "all images processed");
            Ok(Advance::Completed)
        }
    }

    /// Step back one image, removing the record it will re-derive.
    ///
    /// From [`TrialState::Finished`] the last image is reopened instead.
    pub fn retreat(&mut self) -> Result<u32> {
        match self.state {
            TrialState::Recorded => {
                return Err(Error::InvalidState(
                    "wait for the next image before going back".to_string(),
                ))
            }
            TrialState::Finished => {}
            TrialState::AwaitingReference | TrialState::AwaitingTarget => {
                if self.trial <= 1 {
                    return Err(Error::Boundary("This is the first image.".to_string()));
                }
            }
        }

        let removed = self.ledger.remove_last()?;
        if removed.is_none() {
            warn!(trial = self.trial, "stepped back but the ledger had no record to remove");
        }

        if self.state != TrialState::Finished {
            self.trial -= 1;
        }
        self.pending_reference = None;
        self.current = None;
        self.state = if self.reference.is_some() {
            TrialState::AwaitingTarget
        } else {
            TrialState::AwaitingReference
        };
        info!(trial = self.trial, "returned to previous image");
        Ok(self.trial_index())
    }

    /// Pick a new reference point on the current image
    pub fn reselect_center(&mut self) -> Result<()> {
        match self.state {
            TrialState::AwaitingReference | TrialState::AwaitingTarget => {
                self.pending_reference = None;
                self.state = TrialState::AwaitingReference;
                info!(trial = self.trial, "reselecting center");
                Ok(())
            }
            TrialState::Recorded => Err(Error::InvalidState(
                "wait for the next image before reselecting the center".to_string(),
            )),
            TrialState::Finished => Err(Error::InvalidState(
                "all images have been processed".to_string(),
            )),
        }
    }
}
