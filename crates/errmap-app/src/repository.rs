//! Result ledger location and opening

use std::path::{Path, PathBuf};

use errmap_infra::persistence::TextLedger;
use errmap_types::Result;
use tracing::info;

use crate::config::Config;

/// Open the ledger for an image folder.
///
/// An existing ledger is appended to unless `fresh` is set, which truncates it.
pub fn open_result_ledger(config: &Config, image_folder: &Path, fresh: bool) -> Result<TextLedger> {
    let path = config.results_path(image_folder);
    let ledger = if fresh {
        TextLedger::create(&path)?
    } else {
        TextLedger::open(&path)?
    };
    info!(path = %ledger.path().display(), fresh, "result ledger ready");
    Ok(ledger)
}

/// Defer [`open_result_ledger`] until a session starts measuring.
///
/// Nothing is created or truncated until the returned closure is called.
pub fn result_ledger_factory(
    config: &Config,
    image_folder: &Path,
    fresh: bool,
) -> impl FnMut() -> Result<TextLedger> + 'static {
    let config = config.clone();
    let image_folder = image_folder.to_path_buf();
    move || open_result_ledger(&config, &image_folder, fresh)
}

/// Accept either a ledger file or the image folder it belongs to
pub fn resolve_ledger_path(config: &Config, path: &Path) -> PathBuf {
    if path.is_dir() {
        config.results_path(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errmap_domain::repository::ResultLedger;
    use errmap_types::TrialRecord;
    use tempfile::tempdir;

    #[test]
    fn test_open_appends_and_fresh_truncates() {
        let dir = tempdir().unwrap();
        let config = Config::default();

        let mut ledger = open_result_ledger(&config, dir.path(), false).unwrap();
        ledger.append(&TrialRecord::new(1, 1.0, 1.0, 0.0)).unwrap();
        assert_eq!(
            ledger.path(),
            dir.path().join("Results").join("Results_File.txt").as_path()
        );

        let reopened = open_result_ledger(&config, dir.path(), false).unwrap();
        assert_eq!(reopened.record_count().unwrap(), 1);

        let fresh = open_result_ledger(&config, dir.path(), true).unwrap();
        assert_eq!(fresh.record_count().unwrap(), 0);
    }

    #[test]
    fn test_factory_defers_truncation() {
        let dir = tempdir().unwrap();
        let config = Config::default();
        let mut ledger = open_result_ledger(&config, dir.path(), false).unwrap();
        ledger.append(&TrialRecord::new(1, 1.0, 1.0, 0.0)).unwrap();

        let mut open = result_ledger_factory(&config, dir.path(), true);
        let reopened = open_result_ledger(&config, dir.path(), false).unwrap();
        assert_eq!(reopened.record_count().unwrap(), 1);

        assert_eq!(open().unwrap().record_count().unwrap(), 0);
    }

    #[test]
    fn test_resolve_folder_or_file() {
        let dir = tempdir().unwrap();
        let config = Config::default();
        assert_eq!(
            resolve_ledger_path(&config, dir.path()),
            dir.path().join("Results").join("Results_File.txt")
        );
        let file = dir.path().join("custom.txt");
        assert_eq!(resolve_ledger_path(&config, &file), file);
    }
}
