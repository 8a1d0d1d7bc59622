//! End-to-end measuring session against a temporary image folder

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use errmap_app::clock::ManualClock;
use errmap_app::config::Config;
use errmap_app::repository::{open_result_ledger, result_ledger_factory};
use errmap_app::scanner::FolderScanner;
use errmap_app::workflow::Workflow;
use errmap_cli::session;
use errmap_domain::repository::ResultLedger;
use errmap_infra::persistence::{read_ledger, TextLedger};
use errmap_types::{OutputFormat, TrialRecord};
use tempfile::tempdir;

fn write_png(path: &Path) {
    image::RgbImage::new(8, 6).save(path).unwrap();
}

fn seed_ledger(path: &Path, records: &[TrialRecord]) {
    let mut ledger = TextLedger::open(path).unwrap();
    for record in records {
        ledger.append(record).unwrap();
    }
}

fn run_script(folder: &Path, fresh: bool, script: &str) -> String {
    let clock = ManualClock::new();
    let mut flow = Workflow::new(
        folder,
        FolderScanner,
        result_ledger_factory(&Config::default(), folder, fresh),
        &clock,
        Duration::from_millis(2000),
        1.0,
    );
    flow.select_calibration_image(folder.join("cal.png")).unwrap();

    let mut out = Vec::new();
    session::run(
        &mut flow,
        Cursor::new(script),
        &mut out,
        OutputFormat::Table,
        |d| clock.advance(d),
    )
    .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_calibrate_measure_and_correct() {
    let dir = tempdir().unwrap();
    for name in ["cal.png", "a.png", "b.png"] {
        write_png(&dir.path().join(name));
    }
    let ledger_path = Config::default().results_path(dir.path());

    let script = "\
click 0 0
click 100 0
axes 0 1
axes x-incr y-decr
distance 10
click 100 100
click 130 60
100 90
prev
status
click 100 110
quit
click 1 1
";
    let output = run_script(dir.path(), false, script);

    assert!(output.contains("Error: Invalid axis combination"), "{}", output);
    assert!(output.contains("Scaling Factor: 0.100000"), "{}", output);
    assert!(output.contains("Please click on the center"), "{}", output);
    assert!(output.contains("Loaded previous image 2"), "{}", output);
    assert!(output.contains("All 2 images have been processed"), "{}", output);

    let records = read_ledger(&ledger_path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].trial, 1);
    assert!((records[0].z_axis - 5.0).abs() < 1e-9);
    assert!((records[0].y_axis - 4.0).abs() < 1e-9);
    assert!((records[0].x_axis - 3.0).abs() < 1e-9);
    assert_eq!(records[1].trial, 2);
    assert!((records[1].z_axis - 1.0).abs() < 1e-9);
    assert!((records[1].y_axis + 1.0).abs() < 1e-9);
    assert_eq!(records[1].x_axis, 0.0);

    assert_eq!(
        ledger_path,
        dir.path().join("Results").join("Results_File.txt")
    );
}

#[test]
fn test_sessions_append_unless_fresh() {
    let dir = tempdir().unwrap();
    for name in ["cal.png", "only.png"] {
        write_png(&dir.path().join(name));
    }
    let config = Config::default();
    let script = "click 0 0\nclick 0 10\naxes y-decr x-decr\ndistance 1\nclick 5 5\nclick 5 5\n";

    run_script(dir.path(), false, script);
    run_script(dir.path(), false, script);
    assert_eq!(
        read_ledger(&config.results_path(dir.path())).unwrap().len(),
        2
    );

    run_script(dir.path(), true, script);
    assert_eq!(
        read_ledger(&config.results_path(dir.path())).unwrap().len(),
        1
    );

    let fresh = open_result_ledger(&config, dir.path(), true).unwrap();
    assert_eq!(fresh.record_count().unwrap(), 0);
}

#[test]
fn test_fresh_session_quit_during_calibration_keeps_results() {
    let dir = tempdir().unwrap();
    for name in ["cal.png", "a.png"] {
        write_png(&dir.path().join(name));
    }
    let ledger_path = Config::default().results_path(dir.path());
    let earlier = [
        TrialRecord::new(1, 2.0, 2.0, 0.0),
        TrialRecord::new(2, 1.0, 0.0, -1.0),
    ];
    seed_ledger(&ledger_path, &earlier);

    run_script(dir.path(), true, "click 0 0\nquit\n");
    assert_eq!(read_ledger(&ledger_path).unwrap(), earlier.to_vec());

    run_script(dir.path(), true, "click 0 0\nclick 10 0\naxes x-incr y-decr\n");
    assert_eq!(read_ledger(&ledger_path).unwrap(), earlier.to_vec());
}

#[test]
fn test_folder_without_trial_images_reports_error() {
    let dir = tempdir().unwrap();
    write_png(&dir.path().join("cal.png"));
    let ledger_path = Config::default().results_path(dir.path());

    let output = run_script(
        dir.path(),
        true,
        "click 0 0\nclick 10 0\naxes x-incr y-decr\ndistance 2\nstatus\n",
    );
    assert!(output.contains("Error: Out of bounds"), "{}", output);
    assert!(output.contains("type 'start'"), "{}", output);
    assert!(!ledger_path.exists());
}

#[test]
fn test_start_retries_after_images_are_added() {
    let dir = tempdir().unwrap();
    write_png(&dir.path().join("cal.png"));
    let ledger_path = Config::default().results_path(dir.path());
    let late = dir.path().join("late.png");

    let clock = ManualClock::new();
    let mut flow = Workflow::new(
        dir.path(),
        FolderScanner,
        result_ledger_factory(&Config::default(), dir.path(), false),
        &clock,
        Duration::from_millis(2000),
        1.0,
    );
    flow.select_calibration_image(dir.path().join("cal.png")).unwrap();

    let mut out = Vec::new();
    session::run(
        &mut flow,
        Cursor::new("click 0 0\nclick 10 0\naxes x-incr y-decr\ndistance 2\n"),
        &mut out,
        OutputFormat::Table,
        |d| clock.advance(d),
    )
    .unwrap();
    assert!(String::from_utf8_lossy(&out).contains("Error: Out of bounds"));

    write_png(&late);
    let mut out = Vec::new();
    session::run(
        &mut flow,
        Cursor::new("start\nclick 5 5\nclick 5 5\n"),
        &mut out,
        OutputFormat::Table,
        |d| clock.advance(d),
    )
    .unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Scaling Factor"), "{}", output);
    assert!(output.contains(&format!("Image 1: {}", late.display())), "{}", output);
    assert!(output.contains("All 1 images have been processed"), "{}", output);
    assert_eq!(read_ledger(&ledger_path).unwrap().len(), 1);
}

#[test]
fn test_reselect_image_requires_readable_image() {
    let dir = tempdir().unwrap();
    for name in ["cal.png", "a.png"] {
        write_png(&dir.path().join(name));
    }
    let missing = dir.path().join("missing.png");
    let script = format!(
        "reselect-image '{}'\nreselect-image '{}'\n",
        missing.display(),
        dir.path().join("a.png").display()
    );
    let output = run_script(dir.path(), false, &script);
    assert!(output.contains("Error: File not found"), "{}", output);
    assert!(output.contains("Calibration image:"), "{}", output);
}
