//! Observable lists published by subscriptions.
//!
//! A [`Feed`] is the read side: it always holds a complete list, swapped in
//! whole by the owning subscription. The write side, [`FeedPublisher`], sits
//! behind a mutex so closing it is a hard cut-off: once `close` returns,
//! no reader sees another value.

use std::sync::{Arc, Mutex};

use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::watch;

use chatter_shared::{Channel, Message};

/// Health of the listener behind a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedStatus {
    /// Attached, initial load not yet received.
    Connecting,
    /// The list reflects the latest snapshot.
    Live,
    /// The listener reported a transient error; the list is the last good one
    /// and updates resume when the backend recovers.
    Degraded { reason: String },
    /// The listener was cancelled by the backend. No further updates.
    Failed { reason: String },
}

/// Read side of a subscription.
pub struct Feed<T> {
    items: watch::Receiver<Arc<[T]>>,
    status: watch::Receiver<FeedStatus>,
}

pub type MessageFeed = Feed<Message>;
pub type ChannelFeed = Feed<Channel>;

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            status: self.status.clone(),
        }
    }
}

impl<T> Feed<T>
where
    T: Send + Sync + 'static,
{
    /// The current list.
    pub fn current(&self) -> Arc<[T]> {
        Arc::clone(&self.items.borrow())
    }

    pub fn status(&self) -> FeedStatus {
        self.status.borrow().clone()
    }

    /// Whether a list was published since this handle last looked.
    pub fn has_changed(&self) -> bool {
        self.items.has_changed().unwrap_or(false)
    }

    /// True once the subscription is detached (or its task has ended).
    pub fn is_closed(&self) -> bool {
        self.items.has_changed().is_err()
    }

    /// Wait for the next published list and return it. `None` once the
    /// subscription is detached; [`Feed::current`] still holds the last list.
    pub async fn changed(&mut self) -> Option<Arc<[T]>> {
        self.items.changed().await.ok()?;
        Some(Arc::clone(&self.items.borrow_and_update()))
    }

    /// Wait for the next status change.
    pub async fn status_changed(&mut self) -> Option<FeedStatus> {
        self.status.changed().await.ok()?;
        Some(self.status.borrow_and_update().clone())
    }

    /// The current list followed by every later one, ending on detach.
    pub fn into_stream(mut self) -> impl Stream<Item = Arc<[T]>> {
        let first = Arc::clone(&self.items.borrow_and_update());
        stream::unfold((Some(first), self), |(pending, mut feed)| async move {
            if let Some(list) = pending {
                return Some((list, (None, feed)));
            }
            let next = feed.changed().await?;
            Some((next, (None, feed)))
        })
    }
}

/// Write side of a subscription.
pub(crate) struct FeedPublisher<T> {
    senders: Mutex<Option<Senders<T>>>,
}

struct Senders<T> {
    items: watch::Sender<Arc<[T]>>,
    status: watch::Sender<FeedStatus>,
}

impl<T> FeedPublisher<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new() -> (Arc<Self>, Feed<T>) {
        let (items_tx, items_rx) = watch::channel::<Arc<[T]>>(Arc::from(Vec::new()));
        let (status_tx, status_rx) = watch::channel(FeedStatus::Connecting);
        let publisher = Arc::new(Self {
            senders: Mutex::new(Some(Senders {
                items: items_tx,
                status: status_tx,
            })),
        });
        (
            publisher,
            Feed {
                items: items_rx,
                status: status_rx,
            },
        )
    }

    /// Replace the list. An identical list is not re-published. Returns
    /// whether readers were notified.
    pub(crate) fn publish(&self, items: Vec<T>) -> bool {
        let Ok(guard) = self.senders.lock() else {
            return false;
        };
        let Some(senders) = guard.as_ref() else {
            return false;
        };
        senders.items.send_if_modified(|current| {
            if current[..] == items[..] {
                false
            } else {
                *current = Arc::from(items);
                true
            }
        })
    }

    pub(crate) fn set_status(&self, status: FeedStatus) {
        let Ok(guard) = self.senders.lock() else {
            return;
        };
        if let Some(senders) = guard.as_ref() {
            senders.status.send_if_modified(|current| {
                if *current == status {
                    false
                } else {
                    *current = status;
                    true
                }
            });
        }
    }

    /// Drop both senders. Readers keep their last values.
    pub(crate) fn close(&self) {
        if let Ok(mut guard) = self.senders.lock() {
            guard.take();
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.senders
            .lock()
            .map(|guard| guard.is_none())
            .unwrap_or(true)
    }
}
