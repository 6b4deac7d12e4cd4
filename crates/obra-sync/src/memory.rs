//! In-process remote store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use obra_core::EntityKind;

use crate::{RemoteStore, SyncError, SyncResult};

/// Remote store kept in memory. Upserts replace rows with the same `id`
/// and append the rest, like a table with an id primary key.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    tables: Mutex<HashMap<&'static str, Vec<Value>>>,
    offline: AtomicBool,
    upserts: AtomicU64,
}

impl MemoryRemote {
    pub fn new() -> Self {
        MemoryRemote::default()
    }

    /// Simulate an unreachable remote
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current rows of one table
    pub fn rows(&self, kind: EntityKind) -> Vec<Value> {
        self.tables
            .lock()
            .get(kind.table_name())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful upsert calls so far
    pub fn upsert_count(&self) -> u64 {
        self.upserts.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> SyncResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Unavailable("remote is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch(&self, kind: EntityKind) -> SyncResult<Vec<Value>> {
        self.check_online()?;
        Ok(self.rows(kind))
    }

    async fn upsert(&self, kind: EntityKind, rows: Vec<Value>) -> SyncResult<()> {
        self.check_online()?;
        let mut tables = self.tables.lock();
        let table = tables.entry(kind.table_name()).or_default();
        for row in rows {
            let existing = table
                .iter_mut()
                .find(|r| r.get("id").is_some() && r.get("id") == row.get("id"));
            match existing {
                Some(slot) => *slot = row,
                None => table.push(row),
            }
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let remote = MemoryRemote::new();
        remote
            .upsert(EntityKind::Payment, vec![json!({"id": "a", "amount": 1})])
            .await
            .unwrap();
        remote
            .upsert(
                EntityKind::Payment,
                vec![json!({"id": "a", "amount": 2}), json!({"id": "b", "amount": 3})],
            )
            .await
            .unwrap();

        let rows = remote.fetch(EntityKind::Payment).await.unwrap();
        assert_eq!(rows, vec![json!({"id": "a", "amount": 2}), json!({"id": "b", "amount": 3})]);
        assert_eq!(remote.upsert_count(), 2);
    }

    #[tokio::test]
    async fn test_offline_fails() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);
        assert!(matches!(
            remote.fetch(EntityKind::Project).await,
            Err(SyncError::Unavailable(_))
        ));
    }
}
