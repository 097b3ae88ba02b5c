//! Cancellable subscriptions over a backend listener.
//!
//! Each subscription owns one task that drains its listener's event queue in
//! order, reconciles every snapshot into a full list and publishes it to the
//! subscription's [`Feed`]. Subscriptions share nothing with each other.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use chatter_shared::{
    ChannelId, DataPath, ListenEvent, ListenerId, Message, Query, RealtimeBackend, Snapshot,
};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::feed::{Feed, FeedPublisher, FeedStatus};
use crate::reconcile::reconcile_messages;

type Reconcile<T> = fn(&Snapshot) -> Vec<T>;

/// A live listener plus the feed it publishes to. Detached on drop.
pub struct Subscription<B: RealtimeBackend, T: PartialEq + Send + Sync + 'static> {
    backend: Arc<B>,
    path: DataPath,
    listener_id: ListenerId,
    publisher: Arc<FeedPublisher<T>>,
    feed: Feed<T>,
    task: Option<JoinHandle<()>>,
}

/// Messages of one channel, ordered by `createdAt`.
pub type MessageSubscription<B> = Subscription<B, Message>;

impl<B: RealtimeBackend> Subscription<B, Message> {
    /// Attach to `channel_id`'s message collection.
    pub fn start(backend: Arc<B>, config: &SyncConfig, channel_id: &ChannelId) -> Result<Self> {
        let path = config
            .messages_path(channel_id)
            .map_err(SyncError::Listen)?;
        let query = Query::new(path).order_by_child(config.order_by.clone());
        let subscription = Self::attach(backend, query, reconcile_messages)?;
        info!(channel = %channel_id, listener = subscription.listener_id, "subscribed to messages");
        Ok(subscription)
    }
}

impl<B, T> Subscription<B, T>
where
    B: RealtimeBackend,
    T: PartialEq + Send + Sync + 'static,
{
    pub(crate) fn attach(backend: Arc<B>, query: Query, reconcile: Reconcile<T>) -> Result<Self> {
        let path = query.path.clone();
        let listener = backend.listen(query).map_err(SyncError::Listen)?;
        let (publisher, feed) = FeedPublisher::new();

        let task = tokio::spawn(snapshot_loop(
            path.clone(),
            listener.events,
            Arc::clone(&publisher),
            reconcile,
        ));

        Ok(Self {
            backend,
            path,
            listener_id: listener.id,
            publisher,
            feed,
            task: Some(task),
        })
    }

    /// A handle on the published list. Handles stay valid after detach and
    /// keep the last list.
    pub fn feed(&self) -> Feed<T> {
        self.feed.clone()
    }

    pub fn current(&self) -> Arc<[T]> {
        self.feed.current()
    }

    pub fn status(&self) -> FeedStatus {
        self.feed.status()
    }

    pub fn path(&self) -> &DataPath {
        &self.path
    }

    pub fn is_detached(&self) -> bool {
        self.task.is_none()
    }

    /// Stop listening. Once this returns no feed handed out by this
    /// subscription receives another list. Idempotent.
    pub fn detach(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.publisher.close();
        self.backend.unlisten(self.listener_id);
        task.abort();
        info!(path = %self.path, listener = self.listener_id, "subscription detached");
    }
}

impl<B, T> Drop for Subscription<B, T>
where
    B: RealtimeBackend,
    T: PartialEq + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.detach();
    }
}

async fn snapshot_loop<T>(
    path: DataPath,
    mut events: mpsc::UnboundedReceiver<ListenEvent>,
    publisher: Arc<FeedPublisher<T>>,
    reconcile: Reconcile<T>,
) where
    T: PartialEq + Send + Sync + 'static,
{
    while let Some(event) = events.recv().await {
        if publisher.is_closed() {
            break;
        }
        match event {
            ListenEvent::Snapshot(snapshot) => {
                let items = reconcile(&snapshot);
                let count = items.len();
                let published = publisher.publish(items);
                publisher.set_status(FeedStatus::Live);
                debug!(path = %path, items = count, published, "snapshot applied");
            }
            ListenEvent::Error(err) if err.is_retryable() => {
                warn!(path = %path, error = %err, "listener degraded, keeping last list");
                publisher.set_status(FeedStatus::Degraded {
                    reason: err.to_string(),
                });
            }
            ListenEvent::Error(err) => {
                warn!(path = %path, error = %err, "listener cancelled by backend");
                publisher.set_status(FeedStatus::Failed {
                    reason: err.to_string(),
                });
                break;
            }
        }
    }
    // Readers keep the last list and status.
    publisher.close();
    debug!(path = %path, "snapshot loop ended");
}
