//! Measuring session: calibration, then one trial per worklist image.
//!
//! Finishing a calibration or a trial does not move on immediately. A
//! transition is scheduled `delay` after the triggering input and fired by
//! [`Workflow::poll`] once the [`Clock`] reaches it; until then every other
//! input is refused with [`Error::TransitionPending`].
//!
//! The result ledger is opened only when measuring starts, so a session that
//! ends during calibration leaves the result file untouched.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use errmap_domain::model::{AxisChoice, AxisPair};
use errmap_domain::repository::{ResultLedger, WorklistProvider};
use errmap_domain::service::{
    Advance, CalibrationSequencer, CalibrationState, TrialSequencer, TrialState, TrialStep,
};
use errmap_types::{Error, Point, Result, TrialRecord};

use crate::clock::Clock;

#[derive(Debug)]
enum Stage<L: ResultLedger> {
    Calibrating(CalibrationSequencer),
    Measuring(TrialSequencer<L>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    StartMeasuring,
    NextImage,
}

#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    due: Instant,
    kind: TransitionKind,
}

/// What an input or a fired transition did
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    CalibrationImageSelected(PathBuf),
    CalibrationPoint { point: Point, collected: usize },
    AxesChosen { axes: AxisPair, supported: bool },
    /// Calibration done; measuring starts after the delay
    CalibrationComplete { summary: String },
    PointsCleared,
    MeasuringStarted { trial: u32, image: PathBuf },
    ReferenceSet(Point),
    /// Trial written to the ledger; the next image follows after the delay
    TrialRecorded(TrialRecord),
    NextImage { trial: u32, image: PathBuf },
    CenterCleared,
    Returned { trial: u32, image: PathBuf },
    Completed { trials: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Calibrating,
    Measuring,
    Finished,
}

/// Snapshot for display
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatus {
    pub session: Uuid,
    pub phase: Phase,
    pub image: Option<PathBuf>,
    pub trial: Option<u32>,
    pub trial_count: Option<u32>,
    pub reference: Option<Point>,
    pub last_record: Option<TrialRecord>,
    pub pending_ms: Option<u64>,
    pub prompt: String,
}

/// Opens the result ledger when the first trial image is loaded
pub type LedgerFactory<L> = Box<dyn FnMut() -> Result<L>>;

pub struct Workflow<L: ResultLedger, P: WorklistProvider, C: Clock> {
    id: Uuid,
    folder: PathBuf,
    provider: P,
    clock: C,
    delay: Duration,
    open_ledger: LedgerFactory<L>,
    stage: Stage<L>,
    pending: Option<PendingTransition>,
}

impl<L: ResultLedger, P: WorklistProvider, C: Clock> Workflow<L, P, C> {
    pub fn new(
        folder: impl Into<PathBuf>,
        provider: P,
        open_ledger: impl FnMut() -> Result<L> + 'static,
        clock: C,
        delay: Duration,
        min_separation: f64,
    ) -> Self {
        let id = Uuid::new_v4();
        let folder = folder.into();
        info!(session = %id, folder = %folder.display(), "measuring session opened");
        Self {
            id,
            folder,
            provider,
            clock,
            delay,
            open_ledger: Box::new(open_ledger),
            stage: Stage::Calibrating(CalibrationSequencer::with_min_separation(min_separation)),
            pending: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending transition is due
    pub fn pending_remaining(&self) -> Option<Duration> {
        self.pending
            .map(|p| p.due.saturating_duration_since(self.clock.now()))
    }

    pub fn is_finished(&self) -> bool {
        matches!(&self.stage, Stage::Measuring(seq) if seq.is_finished())
    }

    pub fn calibration_state(&self) -> Option<CalibrationState> {
        match &self.stage {
            Stage::Calibrating(seq) => Some(seq.state()),
            Stage::Measuring(_) => None,
        }
    }

    pub fn trial_state(&self) -> Option<TrialState> {
        match &self.stage {
            Stage::Calibrating(_) => None,
            Stage::Measuring(seq) => Some(seq.state()),
        }
    }

    /// Records in the ledger; empty until measuring has started
    pub fn trials(&self) -> Result<Vec<TrialRecord>> {
        match &self.stage {
            Stage::Measuring(seq) => seq.ledger().records(),
            Stage::Calibrating(_) => Ok(Vec::new()),
        }
    }

    /// The ledger, if measuring ever started
    pub fn into_ledger(self) -> Option<L> {
        match self.stage {
            Stage::Measuring(seq) => Some(seq.into_ledger()),
            Stage::Calibrating(_) => None,
        }
    }

    pub fn select_calibration_image(&mut self, image: impl Into<PathBuf>) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        let seq = self.calibrating_mut()?;
        let image = image.into();
        seq.select_image(image.clone());
        Ok(WorkflowEvent::CalibrationImageSelected(image))
    }

    /// Discard the calibration image and points, then start over on `image`
    pub fn reselect_image(&mut self, image: impl Into<PathBuf>) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        self.calibrating_mut()?.reselect_image();
        self.select_calibration_image(image)
    }

    pub fn reselect_points(&mut self) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        self.calibrating_mut()?.reselect_points();
        Ok(WorkflowEvent::PointsCleared)
    }

    pub fn select_point(&mut self, point: Point) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        match &mut self.stage {
            Stage::Calibrating(seq) => {
                seq.select_point(point)?;
                Ok(WorkflowEvent::CalibrationPoint {
                    point,
                    collected: seq.points().len(),
                })
            }
            Stage::Measuring(seq) => match seq.select_point(point)? {
                TrialStep::ReferenceSet(reference) => Ok(WorkflowEvent::ReferenceSet(reference)),
                TrialStep::Recorded(record) => {
                    self.schedule(TransitionKind::NextImage);
                    Ok(WorkflowEvent::TrialRecorded(record))
                }
            },
        }
    }

    pub fn choose_axes(&mut self, horizontal: AxisChoice, vertical: AxisChoice) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        let seq = self.calibrating_mut()?;
        seq.choose_axes(horizontal, vertical)?;
        let axes = seq
            .axes()
            .ok_or_else(|| Error::InvalidState("missing axis selection".to_string()))?;
        Ok(WorkflowEvent::AxesChosen {
            axes,
            supported: axes.is_supported(),
        })
    }

    pub fn enter_distance(&mut self, text: &str) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        let summary = self.calibrating_mut()?.enter_distance_text(text)?.summary();
        self.schedule(TransitionKind::StartMeasuring);
        Ok(WorkflowEvent::CalibrationComplete { summary })
    }

    /// Schedule the start of measuring again after it failed, keeping the
    /// finished calibration
    pub fn retry_start(&mut self) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        let summary = match &self.stage {
            Stage::Calibrating(seq) => seq
                .calibration()
                .map(|calibration| calibration.summary())
                .ok_or_else(|| Error::InvalidState("calibration is not complete".to_string()))?,
            Stage::Measuring(_) => {
                return Err(Error::InvalidState("already measuring".to_string()))
            }
        };
        info!(session = %self.id, "retrying the start of measuring");
        self.schedule(TransitionKind::StartMeasuring);
        Ok(WorkflowEvent::CalibrationComplete { summary })
    }

    pub fn reselect_center(&mut self) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        self.measuring_mut()?.reselect_center()?;
        Ok(WorkflowEvent::CenterCleared)
    }

    pub fn previous_image(&mut self) -> Result<WorkflowEvent> {
        self.ensure_idle()?;
        let seq = self.measuring_mut()?;
        let trial = seq.retreat()?;
        Ok(WorkflowEvent::Returned {
            trial,
            image: seq.current_image().to_path_buf(),
        })
    }

    /// Fire the pending transition if it is due
    pub fn poll(&mut self) -> Result<Option<WorkflowEvent>> {
        let Some(pending) = self.pending else {
            return Ok(None);
        };
        if self.clock.now() < pending.due {
            return Ok(None);
        }
        self.pending = None;
        debug!(session = %self.id, kind = ?pending.kind, "transition due");

        let event = match pending.kind {
            TransitionKind::StartMeasuring => self.start_measuring()?,
            TransitionKind::NextImage => {
                let seq = self.measuring_mut()?;
                match seq.advance()? {
                    Advance::Next(trial) => WorkflowEvent::NextImage {
                        trial,
                        image: seq.current_image().to_path_buf(),
                    },
                    Advance::Completed => WorkflowEvent::Completed {
                        trials: seq.trial_count(),
                    },
                }
            }
        };
        Ok(Some(event))
    }

    pub fn status(&self) -> WorkflowStatus {
        let pending_ms = self
            .pending_remaining()
            .map(|d| d.as_millis().min(u64::MAX as u128) as u64);

        match &self.stage {
            Stage::Calibrating(seq) => WorkflowStatus {
                session: self.id,
                phase: Phase::Calibrating,
                image: seq.image().map(Path::to_path_buf),
                trial: None,
                trial_count: None,
                reference: None,
                last_record: None,
                pending_ms,
                prompt: calibration_prompt(seq, self.pending.is_some()),
            },
            Stage::Measuring(seq) => WorkflowStatus {
                session: self.id,
                phase: if seq.is_finished() {
                    Phase::Finished
                } else {
                    Phase::Measuring
                },
                image: Some(seq.current_image().to_path_buf()),
                trial: Some(seq.trial_index()),
                trial_count: Some(seq.trial_count()),
                reference: seq.reference(),
                last_record: seq.current_record(),
                pending_ms,
                prompt: trial_prompt(seq.state()).to_string(),
            },
        }
    }

    fn start_measuring(&mut self) -> Result<WorkflowEvent> {
        let calibration = match &self.stage {
            Stage::Calibrating(seq) => seq.calibration().cloned().ok_or_else(|| {
                Error::InvalidState("calibration is not complete".to_string())
            })?,
            Stage::Measuring(_) => {
                return Err(Error::InvalidState("already measuring".to_string()))
            }
        };

        let worklist = self.provider.worklist(&self.folder, &calibration.image)?;
        if worklist.trial_count() == 0 {
            return Err(Error::Boundary(
                "the folder has no images besides the calibration image".to_string(),
            ));
        }
        let ledger = (self.open_ledger)()?;

        let seq = TrialSequencer::new(calibration, worklist, ledger)?;
        let event = WorkflowEvent::MeasuringStarted {
            trial: seq.trial_index(),
            image: seq.current_image().to_path_buf(),
        };
        self.stage = Stage::Measuring(seq);
        Ok(event)
    }

    fn schedule(&mut self, kind: TransitionKind) {
        let due = self.clock.now() + self.delay;
        debug!(session = %self.id, ?kind, delay_ms = self.delay.as_millis() as u64, "transition scheduled");
        self.pending = Some(PendingTransition { due, kind });
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.pending.is_some() {
            return Err(Error::TransitionPending);
        }
        Ok(())
    }

    fn calibrating_mut(&mut self) -> Result<&mut CalibrationSequencer> {
        match &mut self.stage {
            Stage::Calibrating(seq) => Ok(seq),
            Stage::Measuring(_) => Err(Error::InvalidState(
                "calibration is already complete".to_string(),
            )),
        }
    }

    fn measuring_mut(&mut self) -> Result<&mut TrialSequencer<L>> {
        match &mut self.stage {
            Stage::Measuring(seq) => Ok(seq),
            Stage::Calibrating(_) => Err(Error::InvalidState(
                "finish the calibration first".to_string(),
            )),
        }
    }
}

fn calibration_prompt(seq: &CalibrationSequencer, pending: bool) -> String {
    if pending {
        return "Calibration complete, loading the first image".to_string();
    }
    match seq.state() {
        _ if seq.image().is_none() => {
            "Please select a folder with image set, then select a calibration image.".to_string()
        }
        CalibrationState::AwaitingTwoPoints if seq.points().is_empty() => {
            "Please select two points to set the distance".to_string()
        }
        CalibrationState::AwaitingTwoPoints => "Please select the second point".to_string(),
        CalibrationState::AwaitingAxisChoice => {
            "Select the horizontal and vertical axis orientation".to_string()
        }
        CalibrationState::AwaitingDistance => match seq.axes() {
            Some(axes) => format!(
                "Selected horizontal: {}, vertical: {}; please enter the distance in cm",
                axes.horizontal().0,
                axes.vertical().0
            ),
            None => "Enter distance between points in cm (e.g., 10)".to_string(),
        },
        CalibrationState::Complete => {
            "Calibration complete; type 'start' to load the first image".to_string()
        }
    }
}

fn trial_prompt(state: TrialState) -> &'static str {
    match state {
        TrialState::AwaitingReference => "Please click on the center",
        TrialState::AwaitingTarget => "Please click on the puck",
        TrialState::Recorded => "Recorded, loading the next image",
        TrialState::Finished => "All images have been processed",
    }
}
