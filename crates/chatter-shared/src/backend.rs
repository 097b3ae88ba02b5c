//! The realtime database port.
//!
//! A backend stores collections of JSON children addressed by [`DataPath`],
//! generates chronologically sortable push keys, and pushes whole-collection
//! [`Snapshot`]s to listeners on every change.

use std::cmp::Ordering;
use std::future::Future;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::BackendError;
use crate::snapshot::{ListenEvent, Query, SnapshotChild};
use crate::types::DataPath;

pub type ListenerId = u64;

/// A registered listener. Events arrive in the order the backend produced
/// them; the first one is the initial full load.
#[derive(Debug)]
pub struct Listener {
    pub id: ListenerId,
    pub events: mpsc::UnboundedReceiver<ListenEvent>,
}

pub trait RealtimeBackend: Send + Sync + 'static {
    /// A fresh push key, or `None` when the key facility is unavailable.
    fn generate_key(&self) -> Option<String>;

    /// Attach a listener to a collection.
    fn listen(&self, query: Query) -> Result<Listener, BackendError>;

    /// Detach a listener. No event is queued for it once this returns.
    fn unlisten(&self, id: ListenerId);

    /// Write `value` as a new child `key` under `path`. Never overwrites:
    /// an existing key fails with [`BackendError::AlreadyExists`].
    fn append(
        &self,
        path: &DataPath,
        key: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Order children the way the hosted database does for `orderByChild`:
/// children lacking the field first, then booleans, numbers, strings and
/// finally objects; equal values fall back to key order. Without a field,
/// children are ordered by key alone.
pub fn order_children(children: &mut [SnapshotChild], order_by: Option<&str>) {
    match order_by {
        Some(field) => children.sort_by(|a, b| {
            compare_values(a.value.get(field), b.value.get(field)).then_with(|| a.key.cmp(&b.key))
        }),
        None => children.sort_by(|a, b| a.key.cmp(&b.key)),
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
