//! Interactive measuring session over a line-based input

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;

use errmap_app::clock::Clock;
use errmap_app::scanner::validate_image;
use errmap_app::workflow::{Workflow, WorkflowEvent, WorkflowStatus};
use errmap_domain::model::AxisChoice;
use errmap_domain::repository::{ResultLedger, WorklistProvider};
use errmap_types::{Error, OutputFormat, Point, Result};

const HELP: &str = "\
Commands:
  click X Y | X Y          select a point on the current image
  axes H V                 horizontal and vertical orientation
                           (x-incr|x-decr|y-incr|y-decr, or 0-3)
  distance CM              real distance between the calibration points
  reselect-points          clear the calibration points
  reselect-image PATH      start the calibration over on another image
  start | retry            load the first image again after it failed
  reselect-center          pick a new center on the current image
  prev                     go back one image
  status                   show where the session is
  help                     this text
  quit                     end the session";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Click(Point),
    Axes(AxisChoice, AxisChoice),
    Distance(String),
    ReselectPoints,
    ReselectImage(PathBuf),
    Start,
    ReselectCenter,
    Previous,
    Status,
    Help,
    Quit,
}

/// Parse one input line; `Ok(None)` for blank lines and comments
pub fn parse_command(line: &str) -> std::result::Result<Option<SessionCommand>, String> {
    let words = shell_words::split(line).map_err(|e| e.to_string())?;
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };
    if head.starts_with('#') {
        return Ok(None);
    }

    let command = match (head.to_lowercase().as_str(), args) {
        ("click", [x, y]) => SessionCommand::Click(parse_point(x, y)?),
        ("axes", [h, v]) => SessionCommand::Axes(parse_axis(h)?, parse_axis(v)?),
        ("distance", [cm]) => SessionCommand::Distance(cm.clone()),
        ("reselect-points", []) => SessionCommand::ReselectPoints,
        ("reselect-image", [path]) => SessionCommand::ReselectImage(PathBuf::from(path)),
        ("start", []) | ("retry", []) => SessionCommand::Start,
        ("reselect-center", []) => SessionCommand::ReselectCenter,
        ("prev", []) | ("previous", []) => SessionCommand::Previous,
        ("status", []) => SessionCommand::Status,
        ("help", []) | ("?", []) => SessionCommand::Help,
        ("quit", []) | ("exit", []) => SessionCommand::Quit,
        (_, [y]) if head.parse::<f64>().is_ok() => SessionCommand::Click(parse_point(head, y)?),
        _ => return Err(format!("unrecognized command '{}', type 'help'", line.trim())),
    };
    Ok(Some(command))
}

fn parse_point(x: &str, y: &str) -> std::result::Result<Point, String> {
    let x: f64 = x.parse().map_err(|_| format!("'{}' is not a coordinate", x))?;
    let y: f64 = y.parse().map_err(|_| format!("'{}' is not a coordinate", y))?;
    if !x.is_finite() || !y.is_finite() {
        return Err("coordinates must be finite".to_string());
    }
    Ok(Point::new(x, y))
}

fn parse_axis(value: &str) -> std::result::Result<AxisChoice, String> {
    AxisChoice::from_str(value, true)
}

/// Read commands until `quit` or end of input.
///
/// Pending transitions are waited out with `sleep` and fired before the next
/// line is read. Command failures are printed and the session continues.
pub fn run<L, P, C, R, W, S>(
    flow: &mut Workflow<L, P, C>,
    input: R,
    out: &mut W,
    format: OutputFormat,
    mut sleep: S,
) -> Result<()>
where
    L: ResultLedger,
    P: WorklistProvider,
    C: Clock,
    R: BufRead,
    W: Write,
    S: FnMut(Duration),
{
    writeln!(out, "{}", flow.status().prompt)?;

    for line in input.lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "Error: {}", message)?;
                continue;
            }
        };

        let result = match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            SessionCommand::Status => {
                write_status(out, &flow.status(), format)?;
                continue;
            }
            SessionCommand::Click(point) => flow.select_point(point),
            SessionCommand::Axes(horizontal, vertical) => flow.choose_axes(horizontal, vertical),
            SessionCommand::Distance(text) => flow.enter_distance(&text),
            SessionCommand::ReselectPoints => flow.reselect_points(),
            SessionCommand::ReselectImage(path) => {
                validate_image(&path).and_then(|_| flow.reselect_image(path))
            }
            SessionCommand::Start => flow.retry_start(),
            SessionCommand::ReselectCenter => flow.reselect_center(),
            SessionCommand::Previous => flow.previous_image(),
        };

        match result {
            Ok(event) => writeln!(out, "{}", describe(&event))?,
            Err(e) => {
                report(out, &e)?;
                continue;
            }
        }

        settle(flow, out, &mut sleep)?;
        writeln!(out, "{}", flow.status().prompt)?;
    }

    Ok(())
}

/// Wait for and fire the pending transition, if any
fn settle<L, P, C, W, S>(flow: &mut Workflow<L, P, C>, out: &mut W, sleep: &mut S) -> Result<()>
where
    L: ResultLedger,
    P: WorklistProvider,
    C: Clock,
    W: Write,
    S: FnMut(Duration),
{
    while let Some(remaining) = flow.pending_remaining() {
        if !remaining.is_zero() {
            sleep(remaining);
        }
        match flow.poll() {
            Ok(Some(event)) => writeln!(out, "{}", describe(&event))?,
            Ok(None) => {}
            Err(e) => {
                report(out, &e)?;
                break;
            }
        }
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, error: &Error) -> Result<()> {
    warn!(%error, "session command failed");
    writeln!(out, "Error: {}", error)?;
    Ok(())
}

/// Human-readable line for an event
pub fn describe(event: &WorkflowEvent) -> String {
    match event {
        WorkflowEvent::CalibrationImageSelected(path) => {
            format!("Calibration image: {}", path.display())
        }
        WorkflowEvent::CalibrationPoint { point, collected } => {
            format!("Point {} selected at {}", collected, point)
        }
        WorkflowEvent::AxesChosen { axes, supported } => {
            if *supported {
                format!("Axes: {}", axes)
            } else {
                format!(
                    "Axes: {} (this combination cannot be measured; choose another before recording trials)",
                    axes
                )
            }
        }
        WorkflowEvent::CalibrationComplete { summary } => summary.clone(),
        WorkflowEvent::PointsCleared => "Please select new two points to set the distance".to_string(),
        WorkflowEvent::MeasuringStarted { trial, image } => {
            format!("Image {}: {}", trial, image.display())
        }
        WorkflowEvent::ReferenceSet(point) => format!("Center set at {}", point),
        WorkflowEvent::TrialRecorded(record) => format!(
            "Image Trial {}: Z-Axis {:.2} cm, Y-Axis {:.2} cm, X-Axis {:.2} cm",
            record.trial, record.z_axis, record.y_axis, record.x_axis
        ),
        WorkflowEvent::NextImage { trial, image } => {
            format!("Image {}: {}", trial, image.display())
        }
        WorkflowEvent::CenterCleared => "Please click on the center again to reselect".to_string(),
        WorkflowEvent::Returned { trial, image } => {
            format!("Loaded previous image {}: {}", trial, image.display())
        }
        WorkflowEvent::Completed { trials } => format!(
            "All {} images have been processed. Type 'prev' to revisit the last one or 'quit' to finish.",
            trials
        ),
    }
}

fn write_status<W: Write>(out: &mut W, status: &WorkflowStatus, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(status)?)?;
        return Ok(());
    }
    writeln!(out, "Session:   {}", status.session)?;
    writeln!(out, "Phase:     {:?}", status.phase)?;
    if let Some(image) = &status.image {
        writeln!(out, "Image:     {}", image.display())?;
    }
    if let (Some(trial), Some(count)) = (status.trial, status.trial_count) {
        writeln!(out, "Trial:     {} of {}", trial, count)?;
    }
    if let Some(reference) = status.reference {
        writeln!(out, "Center:    {}", reference)?;
    }
    if let Some(record) = status.last_record {
        writeln!(
            out,
            "Last:      Z {:.2}  Y {:.2}  X {:.2}",
            record.z_axis, record.y_axis, record.x_axis
        )?;
    }
    if let Some(ms) = status.pending_ms {
        writeln!(out, "Pending:   {} ms", ms)?;
    }
    writeln!(out, "{}", status.prompt)?;
    Ok(())
}
