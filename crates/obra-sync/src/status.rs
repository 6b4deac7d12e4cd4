//! Connection status shown next to every view

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

/// Remote connection state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// No remote configured; local snapshot only
    #[default]
    Local,
    /// Initial pull in progress; pushes are suppressed
    Syncing,
    /// Last remote operation succeeded
    Connected,
    /// Last remote operation failed
    Error,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Local => "local",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Connected => "connected",
            SyncStatus::Error => "error",
        }
    }

    /// Badge text of the status indicator
    pub fn label(self) -> &'static str {
        match self {
            SyncStatus::Local => "Modo Local",
            SyncStatus::Syncing => "Sincronizando...",
            SyncStatus::Connected => "Supabase Conectado",
            SyncStatus::Error => "Error de Conexión",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status shared between the session and the push worker
#[derive(Clone, Debug, Default)]
pub struct SharedStatus(Arc<RwLock<SyncStatus>>);

impl SharedStatus {
    pub fn new(initial: SyncStatus) -> Self {
        SharedStatus(Arc::new(RwLock::new(initial)))
    }

    pub fn get(&self) -> SyncStatus {
        *self.0.read()
    }

    pub fn set(&self, next: SyncStatus) {
        let mut current = self.0.write();
        if *current != next {
            let from = *current;
            debug!(%from, to = %next, "sync status changed");
            *current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_local() {
        assert_eq!(SharedStatus::default().get(), SyncStatus::Local);
    }

    #[test]
    fn test_clones_share_state() {
        let a = SharedStatus::new(SyncStatus::Local);
        let b = a.clone();
        b.set(SyncStatus::Error);
        assert_eq!(a.get(), SyncStatus::Error);
        assert_eq!(a.get().label(), "Error de Conexión");
    }
}
