//! Background push worker
//!
//! Snapshots are handed over through a `watch` channel, so the worker only
//! ever sees the newest one: at most one push is in flight and snapshots
//! scheduled meanwhile collapse into a single follow-up push.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use obra_core::ConstructionState;

use crate::{SharedStatus, SyncAdapter, SyncStatus};

/// Push counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub scheduled: u64,
    pub pushed: u64,
    pub failed: u64,
}

type Pending = Option<Arc<ConstructionState>>;

/// Handle to the running push worker
pub struct SyncHandle {
    tx: watch::Sender<Pending>,
    task: JoinHandle<()>,
    status: SharedStatus,
    stats: Arc<Mutex<SyncStats>>,
}

impl SyncHandle {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(adapter: Arc<SyncAdapter>) -> Self {
        let (tx, rx) = watch::channel::<Pending>(None);
        let stats = Arc::new(Mutex::new(SyncStats::default()));
        let status = adapter.shared_status();
        let task = tokio::spawn(run(adapter, rx, Arc::clone(&stats)));

        SyncHandle {
            tx,
            task,
            status,
            stats,
        }
    }

    /// Queue a snapshot for pushing, superseding any not yet picked up
    pub fn schedule(&self, state: ConstructionState) {
        self.tx.send_replace(Some(Arc::new(state)));
        self.stats.lock().scheduled += 1;
    }

    pub fn status(&self) -> SyncStatus {
        self.status.get()
    }

    /// Status cell that outlives the handle
    pub fn shared_status(&self) -> SharedStatus {
        self.status.clone()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats.lock().clone()
    }

    /// Close the queue, let the worker finish the pending push, and wait
    pub async fn shutdown(self) -> SyncStats {
        let SyncHandle {
            tx, task, stats, ..
        } = self;
        drop(tx);
        if let Err(e) = task.await {
            warn!(error = %e, "sync worker terminated abnormally");
        }
        let stats = stats.lock().clone();
        info!(pushed = stats.pushed, failed = stats.failed, "sync worker stopped");
        stats
    }
}

async fn run(adapter: Arc<SyncAdapter>, mut rx: watch::Receiver<Pending>, stats: Arc<Mutex<SyncStats>>) {
    debug!("sync worker started");
    while rx.changed().await.is_ok() {
        let pending = rx.borrow_and_update().clone();
        let Some(state) = pending else {
            continue;
        };
        // Failures are already logged and reflected in the status by the adapter
        match adapter.push(&state).await {
            Ok(()) => stats.lock().pushed += 1,
            Err(_) => stats.lock().failed += 1,
        }
    }
}
