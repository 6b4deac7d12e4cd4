//! Sync adapter: pull on connect, push on change

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use obra_core::{Certificate, ConstructionState, Contractor, EntityKind, Payment, Project};

use crate::remote::{decode_rows, encode_rows};
use crate::{RemoteStore, SharedStatus, SyncResult, SyncStatus};

/// Mirrors snapshots to a remote store
pub struct SyncAdapter {
    remote: Arc<dyn RemoteStore>,
    status: SharedStatus,
}

impl SyncAdapter {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        SyncAdapter {
            remote,
            status: SharedStatus::new(SyncStatus::Local),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status.get()
    }

    pub fn shared_status(&self) -> SharedStatus {
        self.status.clone()
    }

    async fn fetch_collection<T: DeserializeOwned>(&self, kind: EntityKind) -> SyncResult<Vec<T>> {
        let rows = self.remote.fetch(kind).await?;
        decode_rows(kind, rows)
    }

    /// Initial pull. Fetches the four tables concurrently and returns the
    /// remote snapshot when at least one table has rows; `None` means the
    /// remote is empty and local state should be kept.
    pub async fn pull(&self) -> SyncResult<Option<ConstructionState>> {
        self.status.set(SyncStatus::Syncing);

        let fetched = tokio::try_join!(
            self.fetch_collection::<Contractor>(EntityKind::Contractor),
            self.fetch_collection::<Project>(EntityKind::Project),
            self.fetch_collection::<Certificate>(EntityKind::Certificate),
            self.fetch_collection::<Payment>(EntityKind::Payment),
        );

        let (contractors, projects, certificates, payments) = match fetched {
            Ok(tables) => tables,
            Err(e) => {
                warn!(error = %e, "remote fetch failed");
                self.status.set(SyncStatus::Error);
                return Err(e);
            }
        };

        let state = ConstructionState {
            contractors,
            projects,
            certificates,
            payments,
        };
        self.status.set(SyncStatus::Connected);

        if state.is_empty() {
            info!("remote store is empty, keeping local snapshot");
            Ok(None)
        } else {
            info!(records = state.total_records(), "pulled remote snapshot");
            Ok(Some(state))
        }
    }

    /// Upsert every non-empty collection, in entity order. Stops at the
    /// first failure; nothing is retried. Skipped while a pull is running.
    pub async fn push(&self, state: &ConstructionState) -> SyncResult<()> {
        if self.status.get() == SyncStatus::Syncing {
            debug!("pull in progress, skipping push");
            return Ok(());
        }

        match self.push_collections(state).await {
            Ok(()) => {
                self.status.set(SyncStatus::Connected);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "auto-sync failed");
                self.status.set(SyncStatus::Error);
                Err(e)
            }
        }
    }

    async fn push_collections(&self, state: &ConstructionState) -> SyncResult<()> {
        for kind in EntityKind::ALL {
            let rows = match kind {
                EntityKind::Contractor => encode_rows(&state.contractors)?,
                EntityKind::Project => encode_rows(&state.projects)?,
                EntityKind::Certificate => encode_rows(&state.certificates)?,
                EntityKind::Payment => encode_rows(&state.payments)?,
            };
            if rows.is_empty() {
                continue;
            }
            debug!(table = kind.table_name(), rows = rows.len(), "upserting");
            self.remote.upsert(kind, rows).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRemote;
    use obra_core::{EntityId, ProjectStatus};
    use serde_json::json;

    fn state() -> ConstructionState {
        ConstructionState {
            projects: vec![Project {
                id: EntityId::new("p1"),
                name: "Ruta 5".into(),
                file_number: "E-1".into(),
                budget: 100_000.0,
                contractor_id: EntityId::new("c1"),
                start_date: "2024-01-01".into(),
                status: ProjectStatus::Active,
            }],
            payments: vec![Payment {
                id: EntityId::new("pa1"),
                project_id: EntityId::new("p1"),
                amount: 25_000.0,
                date: "2024-02-01".into(),
                reference: "OP-1".into(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_push_upserts_only_non_empty_collections() {
        let remote = Arc::new(MemoryRemote::new());
        let adapter = SyncAdapter::new(remote.clone());

        adapter.push(&state()).await.unwrap();

        assert_eq!(remote.upsert_count(), 2);
        assert_eq!(remote.rows(EntityKind::Project)[0]["fileNumber"], "E-1");
        assert!(remote.rows(EntityKind::Contractor).is_empty());
        assert_eq!(adapter.status(), SyncStatus::Connected);
    }

    #[tokio::test]
    async fn test_pull_empty_remote_keeps_local() {
        let adapter = SyncAdapter::new(Arc::new(MemoryRemote::new()));
        assert!(adapter.pull().await.unwrap().is_none());
        assert_eq!(adapter.status(), SyncStatus::Connected);
    }

    #[tokio::test]
    async fn test_pull_returns_remote_snapshot() {
        let remote = Arc::new(MemoryRemote::new());
        let adapter = SyncAdapter::new(remote.clone());
        adapter.push(&state()).await.unwrap();

        let pulled = adapter.pull().await.unwrap().unwrap();
        assert_eq!(pulled, state());
    }

    #[tokio::test]
    async fn test_failures_set_error_status() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_offline(true);
        let adapter = SyncAdapter::new(remote.clone());

        assert!(adapter.pull().await.is_err());
        assert_eq!(adapter.status(), SyncStatus::Error);

        assert!(adapter.push(&state()).await.is_err());
        assert_eq!(adapter.status(), SyncStatus::Error);

        remote.set_offline(false);
        adapter.push(&state()).await.unwrap();
        assert_eq!(adapter.status(), SyncStatus::Connected);
    }

    #[tokio::test]
    async fn test_push_skipped_while_syncing() {
        let remote = Arc::new(MemoryRemote::new());
        let adapter = SyncAdapter::new(remote.clone());
        adapter.shared_status().set(SyncStatus::Syncing);

        adapter.push(&state()).await.unwrap();
        assert_eq!(remote.upsert_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_remote_row() {
        let remote = Arc::new(MemoryRemote::new());
        remote
            .upsert(EntityKind::Payment, vec![json!({"id": "x", "amount": "lots"})])
            .await
            .unwrap();
        let adapter = SyncAdapter::new(remote);

        assert!(matches!(
            adapter.pull().await,
            Err(crate::SyncError::Decode { table: "payments", .. })
        ));
        assert_eq!(adapter.status(), SyncStatus::Error);
    }
}
