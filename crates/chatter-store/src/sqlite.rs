//! SQLite-backed realtime collection store.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info};

use chatter_shared::keys::PushKeyGenerator;
use chatter_shared::{BackendError, DataPath, Listener, ListenerId, Query, RealtimeBackend};

use crate::database::Database;
use crate::error::Result;
use crate::listeners::ListenerRegistry;

struct Inner {
    db: Mutex<Database>,
    listeners: ListenerRegistry,
    keys: PushKeyGenerator,
}

/// A [`RealtimeBackend`] persisting records in a local SQLite file.
///
/// Writes and snapshot fan-out happen under one database lock, so every
/// listener sees snapshots in commit order.
#[derive(Clone)]
pub struct SqliteBackend {
    inner: Arc<Inner>,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(Inner {
                db: Mutex::new(db),
                listeners: ListenerRegistry::new(),
                keys: PushKeyGenerator::new(),
            }),
        }
    }

    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::open_at(path)?;
        info!(path = %path.display(), "sqlite backend ready");
        Ok(Self::new(db))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Number of live listeners on `path`.
    pub fn listener_count(&self, path: &DataPath) -> usize {
        self.inner.listeners.count(path)
    }
}

impl Inner {
    fn lock_db(&self) -> std::result::Result<MutexGuard<'_, Database>, BackendError> {
        self.db
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("database lock poisoned: {e}")))
    }

    fn append_blocking(&self, path: &DataPath, key: &str, value: &Value) -> std::result::Result<(), BackendError> {
        let db = self.lock_db()?;
        db.insert_record(path, key, value)?;

        let children = db.list_records(path)?;
        debug!(path = %path, key = %key, children = children.len(), "record appended");
        self.listeners.notify(path, &children);
        Ok(())
    }
}

impl RealtimeBackend for SqliteBackend {
    fn generate_key(&self) -> Option<String> {
        self.inner.keys.next_key()
    }

    fn listen(&self, query: Query) -> std::result::Result<Listener, BackendError> {
        let db = self.inner.lock_db()?;
        let children = db.list_records(&query.path)?;
        Ok(self.inner.listeners.register(query, children))
    }

    fn unlisten(&self, id: ListenerId) {
        self.inner.listeners.remove(id);
    }

    async fn append(&self, path: &DataPath, key: &str, value: Value) -> std::result::Result<(), BackendError> {
        let inner = Arc::clone(&self.inner);
        let path = path.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || inner.append_blocking(&path, &key, &value))
            .await
            .map_err(|e| BackendError::Unavailable(format!("write task failed: {e}")))?
    }
}
