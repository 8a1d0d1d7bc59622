//! Spreadsheet and delimited-text export of the result ledger

use chrono::Local;
use errmap_domain::service::ColumnStats;
use errmap_types::{Error, Result, TrialRecord};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

const COLUMNS: [&str; 4] = ["Image Trial", "Z-Axis", "Y-Axis", "X-Axis"];

/// Export by file extension: `.xlsx` or `.csv`
pub fn export_records(records: &[TrialRecord], output_path: &Path) -> Result<()> {
    let extension = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("xlsx") => export_to_excel(records, output_path)?,
        Some("csv") => export_to_csv(records, output_path)?,
        _ => return Err(Error::UnsupportedExport(output_path.display().to_string())),
    }

    info!(rows = records.len(), path = %output_path.display(), "exported results");
    Ok(())
}

/// Export results to Excel file
pub fn export_to_excel(records: &[TrialRecord], output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let results_sheet = workbook.add_worksheet();
    write_results_sheet(results_sheet, records)?;

    let stats_sheet = workbook.add_worksheet();
    write_statistics_sheet(stats_sheet, records)?;

    workbook
        .save(output_path)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

fn write_results_sheet(sheet: &mut Worksheet, records: &[TrialRecord]) -> Result<()> {
    sheet
        .set_name("Results")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();
    for (col, header) in COLUMNS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let values = [
            record.trial as f64,
            record.z_axis,
            record.y_axis,
            record.x_axis,
        ];
        for (col, value) in values.iter().enumerate() {
            sheet
                .write_number(row, col as u16, *value)
                .map_err(|e| Error::Excel(e.to_string()))?;
        }
    }

    sheet
        .set_column_width(0, 14)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

fn write_statistics_sheet(sheet: &mut Worksheet, records: &[TrialRecord]) -> Result<()> {
    sheet
        .set_name("Statistics")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "Motor Skill Error Statistics", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string(1, 0, "Exported:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string(1, 1, Local::now().to_rfc3339())
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string(2, 0, "Trials:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(2, 1, records.len() as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    let headers = [
        "Column",
        "Mean",
        "Median",
        "Mode",
        "Std Dev",
        "Variance",
        "Range",
        "IQR",
        "Max Difference (%)",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(4, col as u16, *header, &header_format)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    for (idx, stats) in ColumnStats::for_records(records).iter().enumerate() {
        let row = (idx + 5) as u32;
        sheet
            .write_string(row, 0, stats.column)
            .map_err(|e| Error::Excel(e.to_string()))?;

        let values = [
            Some(stats.mean),
            Some(stats.median),
            stats.mode,
            Some(stats.std_dev),
            Some(stats.variance),
            Some(stats.range),
            Some(stats.iqr),
            Some(stats.max_difference_pct),
        ];
        for (offset, value) in values.iter().enumerate() {
            let col = (offset + 1) as u16;
            // Empty and single-sample columns produce NaN, which xlsx cannot hold
            match value {
                Some(v) if v.is_finite() => sheet.write_number(row, col, *v),
                _ => sheet.write_string(row, col, "n/a"),
            }
            .map_err(|e| Error::Excel(e.to_string()))?;
        }
    }

    sheet
        .set_column_width(0, 28)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

/// Export results as comma-separated values with a header row
pub fn export_to_csv(records: &[TrialRecord], output_path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(output_path).map_err(|e| Error::Csv(e.to_string()))?;

    if records.is_empty() {
        writer
            .write_record(COLUMNS)
            .map_err(|e| Error::Csv(e.to_string()))?;
    }
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| Error::Csv(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
