use crate::error::BackendError;
use crate::types::DataPath;

/// One child node of a collection, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotChild {
    pub key: String,
    pub value: serde_json::Value,
}

impl SnapshotChild {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Complete point-in-time contents of a collection. Backends send one of
/// these on the initial load and again after any change, never a delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: DataPath,
    /// Children in the order the backend supplies them.
    pub children: Vec<SnapshotChild>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Event delivered to a listener, in backend order.
#[derive(Debug, Clone)]
pub enum ListenEvent {
    Snapshot(Snapshot),
    Error(BackendError),
}

/// What a listener watches: a collection, optionally ordered by a child field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub path: DataPath,
    pub order_by: Option<String>,
}

impl Query {
    pub fn new(path: DataPath) -> Self {
        Self {
            path,
            order_by: None,
        }
    }

    pub fn order_by_child(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }
}
