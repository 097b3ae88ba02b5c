//! In-process realtime backend.
//!
//! Same listener and append semantics as [`SqliteBackend`](crate::SqliteBackend),
//! plus hooks that let tests play the part of a misbehaving server: raw
//! snapshot and error injection, failing writes, an unavailable key facility.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::debug;

use chatter_shared::keys::PushKeyGenerator;
use chatter_shared::{
    BackendError, DataPath, ListenEvent, Listener, ListenerId, Query, RealtimeBackend, Snapshot,
    SnapshotChild,
};

use crate::listeners::ListenerRegistry;

pub struct MemoryBackend {
    collections: Mutex<HashMap<DataPath, Vec<SnapshotChild>>>,
    listeners: ListenerRegistry,
    keys: PushKeyGenerator,
    keys_enabled: AtomicBool,
    write_failure: Mutex<Option<BackendError>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            listeners: ListenerRegistry::new(),
            keys: PushKeyGenerator::new(),
            keys_enabled: AtomicBool::new(true),
            write_failure: Mutex::new(None),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`RealtimeBackend::generate_key`] return `None` while disabled.
    pub fn set_key_generation(&self, enabled: bool) {
        self.keys_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Fail every subsequent append with `error` until cleared with `None`.
    pub fn fail_writes(&self, error: Option<BackendError>) {
        if let Ok(mut guard) = self.write_failure.lock() {
            *guard = error;
        }
    }

    /// Deliver `children` verbatim (no ordering applied) as a snapshot to
    /// every listener on `path`, without touching stored records.
    pub fn inject_snapshot(&self, path: &DataPath, children: Vec<SnapshotChild>) {
        let _guard = self.lock_collections();
        self.listeners.send_raw(
            path,
            ListenEvent::Snapshot(Snapshot {
                path: path.clone(),
                children,
            }),
        );
    }

    /// Report a listener error to every listener on `path`.
    pub fn inject_error(&self, path: &DataPath, error: BackendError) {
        let _guard = self.lock_collections();
        self.listeners.send_raw(path, ListenEvent::Error(error));
    }

    /// Stored children of `path`, in write order.
    pub fn records(&self, path: &DataPath) -> Vec<SnapshotChild> {
        self.lock_collections()
            .ok()
            .and_then(|c| c.get(path).cloned())
            .unwrap_or_default()
    }

    pub fn listener_count(&self, path: &DataPath) -> usize {
        self.listeners.count(path)
    }

    fn lock_collections(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<DataPath, Vec<SnapshotChild>>>, BackendError> {
        self.collections
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("memory backend poisoned: {e}")))
    }

    fn append_locked(&self, path: &DataPath, key: &str, value: Value) -> Result<(), BackendError> {
        if let Some(err) = self.write_failure.lock().ok().and_then(|g| g.clone()) {
            return Err(err);
        }

        let mut collections = self.lock_collections()?;
        let children = collections.entry(path.clone()).or_default();
        if children.iter().any(|c| c.key == key) {
            return Err(BackendError::AlreadyExists(format!("{path}/{key}")));
        }
        children.push(SnapshotChild::new(key, value));

        debug!(path = %path, key = %key, "record appended");
        self.listeners.notify(path, &children[..]);
        Ok(())
    }
}

impl RealtimeBackend for MemoryBackend {
    fn generate_key(&self) -> Option<String> {
        if !self.keys_enabled.load(Ordering::SeqCst) {
            return None;
        }
        self.keys.next_key()
    }

    fn listen(&self, query: Query) -> Result<Listener, BackendError> {
        let collections = self.lock_collections()?;
        let children = collections.get(&query.path).cloned().unwrap_or_default();
        Ok(self.listeners.register(query, children))
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.remove(id);
    }

    async fn append(&self, path: &DataPath, key: &str, value: Value) -> Result<(), BackendError> {
        self.append_locked(path, key, value)
    }
}
