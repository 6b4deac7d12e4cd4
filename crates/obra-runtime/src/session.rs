//! Application session: the single writer of the entity store

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use obra_core::{
    Certificate, ConstructionState, Contractor, EntityId, NewCertificate, NewContractor,
    NewPayment, NewProject, Payment, Project,
};
use obra_exchange::{export_to_path, import_from_path};
use obra_state::{EntityStore, Reconciler, SnapshotFile};
use obra_sync::{RemoteStore, SyncAdapter, SyncHandle, SyncStats, SyncStatus};

use crate::{AppConfig, RuntimeResult};

/// Session counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub mutations: u64,
    pub saves: u64,
    /// Push worker counters, when remote sync is enabled
    pub sync: Option<SyncStats>,
    /// Sync status when the stats were taken
    pub status: SyncStatus,
}

/// Owns the entity store, its snapshot file and the optional push worker.
///
/// Every mutation rewrites the snapshot file and schedules a push of the
/// new snapshot. Must be opened inside a tokio runtime when a remote store
/// is configured.
pub struct Session {
    store: EntityStore,
    file: SnapshotFile,
    sync: Option<SyncHandle>,
    /// Status reported while no push worker runs
    offline_status: SyncStatus,
    stats: SessionStats,
}

impl Session {
    /// Open with the remote store described by `config`, if any. Remote
    /// settings that cannot produce a client leave the session local with
    /// the status set to `Error`.
    pub async fn open(config: &AppConfig) -> RuntimeResult<Self> {
        match config.remote_store() {
            Ok(remote) => Self::open_with(config, remote).await,
            Err(e) => {
                warn!(error = %e, "remote store unusable, working locally");
                let mut session = Self::open_with(config, None).await?;
                session.offline_status = SyncStatus::Error;
                Ok(session)
            }
        }
    }

    /// Load the local snapshot, then pull from `remote`. A non-empty
    /// remote replaces local state; an unreachable one leaves local state
    /// in place with the status set to `Error`.
    pub async fn open_with(
        config: &AppConfig,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> RuntimeResult<Self> {
        let file = SnapshotFile::new(&config.data_dir, &config.storage_key);
        let state = file.load()?;
        info!(
            path = %file.path().display(),
            records = state.total_records(),
            "loaded local snapshot"
        );

        let mut session = Session {
            store: EntityStore::from_snapshot(state),
            file,
            sync: None,
            offline_status: SyncStatus::Local,
            stats: SessionStats::default(),
        };

        if let Some(remote) = remote {
            let adapter = Arc::new(SyncAdapter::new(remote));
            match adapter.pull().await {
                Ok(Some(pulled)) => {
                    session.store.replace(pulled);
                    session.save()?;
                }
                Ok(None) => {}
                Err(e) => debug!(error = %e, "continuing with local snapshot"),
            }
            session.sync = Some(SyncHandle::spawn(adapter));
        }

        Ok(session)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn snapshot(&self) -> &ConstructionState {
        self.store.snapshot()
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(self.store.snapshot())
    }

    pub fn snapshot_path(&self) -> &Path {
        self.file.path()
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.sync.is_some()
    }

    /// `Local` when no remote store is configured
    pub fn sync_status(&self) -> SyncStatus {
        self.sync
            .as_ref()
            .map(SyncHandle::status)
            .unwrap_or(self.offline_status)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            sync: self.sync.as_ref().map(SyncHandle::stats),
            status: self.sync_status(),
            ..self.stats.clone()
        }
    }

    fn save(&mut self) -> RuntimeResult<()> {
        self.file.save(self.store.snapshot())?;
        self.stats.saves += 1;
        Ok(())
    }

    /// Persist and schedule a push after a mutation
    fn commit(&mut self) -> RuntimeResult<()> {
        self.stats.mutations += 1;
        self.save()?;
        self.push_now();
        Ok(())
    }

    /// Schedule a push of the current snapshot
    pub fn push_now(&self) {
        if let Some(sync) = &self.sync {
            sync.schedule(self.store.snapshot().clone());
        }
    }

    pub fn add_contractor(&mut self, input: NewContractor) -> RuntimeResult<Contractor> {
        let record = self.store.add_contractor(input)?.clone();
        self.commit()?;
        Ok(record)
    }

    pub fn add_project(&mut self, input: NewProject) -> RuntimeResult<Project> {
        let record = self.store.add_project(input)?.clone();
        self.commit()?;
        Ok(record)
    }

    pub fn add_certificate(&mut self, input: NewCertificate) -> RuntimeResult<Certificate> {
        let record = self.store.add_certificate(input)?.clone();
        self.commit()?;
        Ok(record)
    }

    pub fn add_payment(&mut self, input: NewPayment) -> RuntimeResult<Payment> {
        let record = self.store.add_payment(input)?.clone();
        self.commit()?;
        Ok(record)
    }

    pub fn remove_contractor(&mut self, id: &EntityId) -> RuntimeResult<Option<Contractor>> {
        let removed = self.store.remove_contractor(id);
        self.commit_if(removed)
    }

    pub fn remove_project(&mut self, id: &EntityId) -> RuntimeResult<Option<Project>> {
        let removed = self.store.remove_project(id);
        self.commit_if(removed)
    }

    pub fn remove_certificate(&mut self, id: &EntityId) -> RuntimeResult<Option<Certificate>> {
        let removed = self.store.remove_certificate(id);
        self.commit_if(removed)
    }

    pub fn remove_payment(&mut self, id: &EntityId) -> RuntimeResult<Option<Payment>> {
        let removed = self.store.remove_payment(id);
        self.commit_if(removed)
    }

    fn commit_if<T>(&mut self, removed: Option<T>) -> RuntimeResult<Option<T>> {
        if removed.is_some() {
            self.commit()?;
        }
        Ok(removed)
    }

    /// Replace the whole snapshot, returning the previous one
    pub fn replace_snapshot(&mut self, state: ConstructionState) -> RuntimeResult<ConstructionState> {
        let previous = self.store.replace(state);
        self.commit()?;
        Ok(previous)
    }

    /// Write the current snapshot as a workbook
    pub fn export(&self, path: &Path) -> RuntimeResult<()> {
        export_to_path(self.store.snapshot(), path)?;
        info!(path = %path.display(), "exported workbook");
        Ok(())
    }

    /// Parse a workbook without applying it; see [`Session::replace_snapshot`]
    pub fn read_import(&self, path: &Path) -> RuntimeResult<ConstructionState> {
        match import_from_path(path) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "import failed");
                Err(e.into())
            }
        }
    }

    /// Stop the push worker after its pending push
    pub async fn shutdown(self) -> SessionStats {
        let mut stats = self.stats;
        stats.status = self.offline_status;
        if let Some(sync) = self.sync {
            let status = sync.shared_status();
            stats.sync = Some(sync.shutdown().await);
            stats.status = status.get();
        }
        stats
    }
}
