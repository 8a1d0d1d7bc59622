//! Output formatting module

use errmap_domain::service::{generate_statistics_report, ColumnStats};
use errmap_types::{OutputFormat, Result, TrialRecord};
use serde::Serialize;

pub fn output_records(output_format: OutputFormat, records: &[TrialRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!(
        "{:<12} {:>10} {:>10} {:>10}",
        "Image Trial", "Z-Axis", "Y-Axis", "X-Axis"
    );
    println!("{}", "-".repeat(45));
    for record in records {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2}",
            record.trial, record.z_axis, record.y_axis, record.x_axis
        );
    }
    println!("\n{} trials", records.len());
    Ok(())
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    trials: usize,
    columns: &'a [ColumnStats],
}

pub fn output_stats(output_format: OutputFormat, records: &[TrialRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let columns = ColumnStats::for_records(records);
        let content = serde_json::to_string_pretty(&StatsOutput {
            trials: records.len(),
            columns: &columns,
        })?;
        println!("{}", content);
    } else {
        print!("{}", generate_statistics_report(records));
    }
    Ok(())
}
