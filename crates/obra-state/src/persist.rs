//! Local snapshot file
//!
//! The whole snapshot lives in one JSON document named after the storage
//! key. It is read once at startup and rewritten after every change.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use obra_core::{ConstructionState, ObraResult};

/// Snapshot file stem used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "obraapp_v1_data";

/// JSON file holding the persisted snapshot
#[derive(Clone, Debug)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Snapshot stored as `<dir>/<storage_key>.json`
    pub fn new(dir: impl AsRef<Path>, storage_key: &str) -> Self {
        SnapshotFile {
            path: dir.as_ref().join(format!("{storage_key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot; a missing file is the empty snapshot
    pub fn load(&self) -> ObraResult<ConstructionState> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no saved snapshot, starting empty");
            return Ok(ConstructionState::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        let state: ConstructionState = serde_json::from_str(&raw)?;
        debug!(
            path = %self.path.display(),
            records = state.total_records(),
            "snapshot loaded"
        );
        Ok(state)
    }

    /// Replace the stored snapshot (write to a sibling temp file, then rename)
    pub fn save(&self, state: &ConstructionState) -> ObraResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer(&mut file, state)?;
            file.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            records = state.total_records(),
            "snapshot saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityStore;
    use obra_core::{NewContractor, NewPayment};

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path(), DEFAULT_STORAGE_KEY);
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested"), DEFAULT_STORAGE_KEY);

        let mut store = EntityStore::new();
        store.add_contractor(NewContractor {
            name: "Vial Norte".into(),
            ..Default::default()
        })
        .unwrap();
        store
            .add_payment(NewPayment {
                amount: 1234.5,
                ..Default::default()
            })
            .unwrap();
        file.save(store.snapshot()).unwrap();

        assert!(file.path().ends_with("obraapp_v1_data.json"));
        let loaded = file.load().unwrap();
        assert_eq!(&loaded, store.snapshot());
    }

    #[test]
    fn test_rejected_nan_keeps_file_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path(), DEFAULT_STORAGE_KEY);

        let mut store = EntityStore::new();
        store
            .add_payment(NewPayment {
                amount: -20.0,
                ..Default::default()
            })
            .unwrap();
        assert!(store
            .add_payment(NewPayment {
                amount: f64::NAN,
                ..Default::default()
            })
            .is_err());
        file.save(store.snapshot()).unwrap();

        let raw = fs::read_to_string(file.path()).unwrap();
        assert!(!raw.contains("null"));
        let loaded = file.load().unwrap();
        assert_eq!(loaded.payments.len(), 1);
        assert_eq!(loaded.payments[0].amount, -20.0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path(), "broken");
        fs::write(file.path(), "{not json").unwrap();
        assert!(file.load().is_err());
    }
}
