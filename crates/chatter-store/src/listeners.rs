//! Listener bookkeeping shared by the backends.
//!
//! Each listener owns an unbounded queue. Sending happens under the registry
//! lock, so once [`ListenerRegistry::remove`] returns nothing more is queued
//! for that listener. Listeners whose receiver was dropped are pruned on the
//! next send.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use chatter_shared::backend::order_children;
use chatter_shared::{DataPath, ListenEvent, Listener, ListenerId, Query, Snapshot, SnapshotChild};

struct Entry {
    query: Query,
    tx: mpsc::UnboundedSender<ListenEvent>,
}

#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    entries: Mutex<HashMap<ListenerId, Entry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and queue its initial load from `children`.
    pub fn register(&self, query: Query, children: Vec<SnapshotChild>) -> Listener {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();

        let _ = tx.send(ListenEvent::Snapshot(snapshot_for(&query, children)));

        debug!(listener = id, path = %query.path, "listener registered");

        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id, Entry { query, tx });
        }

        Listener { id, events: rx }
    }

    /// Returns `true` if the listener was still registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let removed = self
            .entries
            .lock()
            .map(|mut entries| entries.remove(&id).is_some())
            .unwrap_or(false);
        if removed {
            debug!(listener = id, "listener removed");
        }
        removed
    }

    /// Push the current contents of `path` to every listener on it, each in
    /// its own query order.
    pub fn notify(&self, path: &DataPath, children: &[SnapshotChild]) {
        self.for_each_on(path, |query| {
            ListenEvent::Snapshot(snapshot_for(query, children.to_vec()))
        });
    }

    /// Queue `event` verbatim for every listener on `path`.
    pub fn send_raw(&self, path: &DataPath, event: ListenEvent) {
        self.for_each_on(path, |_| event.clone());
    }

    /// Number of live listeners on `path`.
    pub fn count(&self, path: &DataPath) -> usize {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .values()
                    .filter(|e| &e.query.path == path && !e.tx.is_closed())
                    .count()
            })
            .unwrap_or(0)
    }

    fn for_each_on<F>(&self, path: &DataPath, mut make_event: F)
    where
        F: FnMut(&Query) -> ListenEvent,
    {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };

        let mut closed = Vec::new();
        for (id, entry) in entries.iter() {
            if &entry.query.path != path {
                continue;
            }
            if entry.tx.send(make_event(&entry.query)).is_err() {
                closed.push(*id);
            }
        }

        for id in closed {
            debug!(listener = id, path = %path, "pruning closed listener");
            entries.remove(&id);
        }
    }
}

/// Build the snapshot a listener with `query` sees for `children`.
pub fn snapshot_for(query: &Query, mut children: Vec<SnapshotChild>) -> Snapshot {
    order_children(&mut children, query.order_by.as_deref());
    Snapshot {
        path: query.path.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn children() -> Vec<SnapshotChild> {
        vec![
            SnapshotChild::new("-A", json!({ "createdAt": 20 })),
            SnapshotChild::new("-B", json!({ "createdAt": 10 })),
        ]
    }

    #[test]
    fn initial_load_is_ordered_by_query() {
        let registry = ListenerRegistry::new();
        let query = Query::new(DataPath::parse("messages/c1").unwrap()).order_by_child("createdAt");
        let mut listener = registry.register(query, children());

        match listener.events.try_recv().unwrap() {
            ListenEvent::Snapshot(snap) => {
                let keys: Vec<_> = snap.children.iter().map(|c| c.key.as_str()).collect();
                assert_eq!(keys, ["-B", "-A"]);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn notify_only_reaches_matching_path() {
        let registry = ListenerRegistry::new();
        let c1 = DataPath::parse("messages/c1").unwrap();
        let c2 = DataPath::parse("messages/c2").unwrap();
        let mut l1 = registry.register(Query::new(c1.clone()), vec![]);
        let mut l2 = registry.register(Query::new(c2), vec![]);
        let _ = l1.events.try_recv();
        let _ = l2.events.try_recv();

        registry.notify(&c1, &children());

        assert!(l1.events.try_recv().is_ok());
        assert!(l2.events.try_recv().is_err());
    }

    #[test]
    fn removed_listener_gets_nothing_more() {
        let registry = ListenerRegistry::new();
        let path = DataPath::channels();
        let mut listener = registry.register(Query::new(path.clone()), vec![]);
        let _ = listener.events.try_recv();

        assert!(registry.remove(listener.id));
        registry.notify(&path, &children());

        assert!(listener.events.try_recv().is_err());
        assert!(!registry.remove(listener.id));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let registry = ListenerRegistry::new();
        let path = DataPath::channels();
        let listener = registry.register(Query::new(path.clone()), vec![]);
        assert_eq!(registry.count(&path), 1);

        drop(listener);
        registry.notify(&path, &[]);
        assert_eq!(registry.count(&path), 0);
    }
}
