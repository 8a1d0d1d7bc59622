//! Collaborator boundaries: result persistence and image worklists

use std::path::Path;

use errmap_types::{Result, TrialRecord};

use crate::model::Worklist;

/// Append-only store of trial measurements
///
/// Correction is limited to removing the most recent record.
pub trait ResultLedger {
    /// Append one record after the current last record
    fn append(&mut self, record: &TrialRecord) -> Result<()>;

    /// Remove and return the most recent record, if any
    fn remove_last(&mut self) -> Result<Option<TrialRecord>>;

    /// All records in append order
    fn records(&self) -> Result<Vec<TrialRecord>>;

    fn record_count(&self) -> Result<usize> {
        Ok(self.records()?.len())
    }
}

impl<L: ResultLedger + ?Sized> ResultLedger for &mut L {
    fn append(&mut self, record: &TrialRecord) -> Result<()> {
        (**self).append(record)
    }

    fn remove_last(&mut self) -> Result<Option<TrialRecord>> {
        (**self).remove_last()
    }

    fn records(&self) -> Result<Vec<TrialRecord>> {
        (**self).records()
    }
}

/// Supplies the ordered images of a session
pub trait WorklistProvider {
    fn worklist(&self, folder: &Path, calibration_image: &Path) -> Result<Worklist>;
}

/// Ledger kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Vec<TrialRecord>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultLedger for MemoryLedger {
    fn append(&mut self, record: &TrialRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }

    fn remove_last(&mut self) -> Result<Option<TrialRecord>> {
        Ok(self.records.pop())
    }

    fn records(&self) -> Result<Vec<TrialRecord>> {
        Ok(self.records.clone())
    }

    fn record_count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
