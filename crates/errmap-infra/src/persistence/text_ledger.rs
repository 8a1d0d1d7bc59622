//! Plain-text result ledger
//!
//! Layout:
//!
//! ```text
//! Image Index    Z-Axis         Y-Axis         X-Axis
//! ============================================================
//! Image Trial: 1          Z-Axis: 5.00       Y-Axis: 4.00       X-Axis: 3.00
//! ```
//!
//! Values are persisted with two decimals.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use errmap_domain::repository::ResultLedger;
use errmap_types::{Error, Result, TrialRecord};

const HEADER_PREFIX: &str = "Image Index";
const RECORD_PREFIX: &str = "Image Trial:";

/// Line between the header and the first record
pub const LEDGER_SEPARATOR: &str =
    "============================================================";

pub fn format_header() -> String {
    format!(
        "{:<15}{:<15}{:<15}{:<15}",
        "Image Index", "Z-Axis", "Y-Axis", "X-Axis"
    )
}

pub fn format_record(record: &TrialRecord) -> String {
    format!(
        "Image Trial: {:<10} Z-Axis: {:<10.2} Y-Axis: {:<10.2} X-Axis: {:<10.2}",
        record.trial, record.z_axis, record.y_axis, record.x_axis
    )
}

/// Parse one data line; `None` for anything that is not a well-formed record
pub fn parse_record_line(line: &str) -> Option<TrialRecord> {
    let line = line.trim();
    if !line.starts_with(RECORD_PREFIX) {
        return None;
    }

    fn first_token<'a>(line: &'a str, label: &str) -> Option<&'a str> {
        line.split_once(label)?.1.split_whitespace().next()
    }

    let trial = first_token(line, RECORD_PREFIX)?.parse().ok()?;
    let z_axis = first_token(line, "Z-Axis:")?.parse().ok()?;
    let y_axis = first_token(line, "Y-Axis:")?.parse().ok()?;
    let x_axis = first_token(line, "X-Axis:")?.parse().ok()?;
    Some(TrialRecord::new(trial, z_axis, y_axis, x_axis))
}

/// Parse ledger text, skipping blank, header, separator and malformed lines
pub fn parse_ledger(content: &str) -> Vec<TrialRecord> {
    let mut records = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(HEADER_PREFIX) || line.starts_with('=') {
            continue;
        }
        match parse_record_line(line) {
            Some(record) => records.push(record),
            None => debug!(line, "skipping malformed ledger line"),
        }
    }
    records
}

/// Read and parse a ledger file
pub fn read_ledger(path: &Path) -> Result<Vec<TrialRecord>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_ledger(&content))
}

/// [`ResultLedger`] backed by the text file format above
#[derive(Debug, Clone)]
pub struct TextLedger {
    path: PathBuf,
}

impl TextLedger {
    /// Open an existing ledger for appending, or create it with a header
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            return Ok(Self { path });
        }
        Self::create(path)
    }

    /// Start a fresh ledger, replacing any existing file
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{}\n{}\n", format_header(), LEDGER_SEPARATOR))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultLedger for TextLedger {
    fn append(&mut self, record: &TrialRecord) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", format_record(record))?;
        Ok(())
    }

    fn remove_last(&mut self) -> Result<Option<TrialRecord>> {
        let content = fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().collect();

        let Some((index, record)) = lines
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, line)| parse_record_line(line).map(|r| (i, r)))
        else {
            warn!(path = %self.path.display(), "no record to remove");
            return Ok(None);
        };

        let mut rewritten = String::with_capacity(content.len());
        for (i, line) in lines.iter().enumerate() {
            if i != index {
                rewritten.push_str(line);
                rewritten.push('\n');
            }
        }
        fs::write(&self.path, rewritten)?;
        Ok(Some(record))
    }

    fn records(&self) -> Result<Vec<TrialRecord>> {
        read_ledger(&self.path)
    }
}
