//! The shared list of channels.

use std::sync::Arc;

use tracing::info;

use chatter_shared::{Channel, Query, RealtimeBackend};

use crate::config::SyncConfig;
use crate::dispatcher::record_id;
use crate::error::{Result, SyncError};
use crate::feed::{ChannelFeed, FeedStatus};
use crate::reconcile::reconcile_channels;
use crate::subscription::Subscription;

/// Live view of the channel collection plus channel creation.
///
/// The listener stays attached until the directory is detached or dropped.
pub struct ChannelDirectory<B: RealtimeBackend> {
    backend: Arc<B>,
    config: SyncConfig,
    subscription: Subscription<B, Channel>,
}

impl<B: RealtimeBackend> ChannelDirectory<B> {
    pub fn observe(backend: Arc<B>, config: SyncConfig) -> Result<Self> {
        let path = config.channels_path().map_err(SyncError::Listen)?;
        let subscription =
            Subscription::attach(Arc::clone(&backend), Query::new(path), reconcile_channels)?;
        info!(path = %subscription.path(), "observing channels");
        Ok(Self {
            backend,
            config,
            subscription,
        })
    }

    /// The channel list, in the backend's key order.
    pub fn channels(&self) -> ChannelFeed {
        self.subscription.feed()
    }

    pub fn status(&self) -> FeedStatus {
        self.subscription.status()
    }

    /// Create a channel. Names are not validated and need not be unique.
    pub async fn add_channel(&self, name: &str) -> Result<Channel> {
        create_channel(self.backend.as_ref(), &self.config, name).await
    }

    pub fn detach(&mut self) {
        self.subscription.detach();
    }
}

/// Write a new channel record without holding a listener.
pub async fn create_channel<B: RealtimeBackend>(
    backend: &B,
    config: &SyncConfig,
    name: &str,
) -> Result<Channel> {
    let path = config.channels_path().map_err(SyncError::Write)?;
    let channel = Channel {
        id: record_id(backend),
        name: name.to_string(),
        created_at: Some(chrono::Utc::now().timestamp_millis()),
    };
    let value = serde_json::to_value(&channel).map_err(|e| SyncError::Write(e.into()))?;

    backend
        .append(&path, &channel.id, value)
        .await
        .map_err(SyncError::Write)?;

    info!(id = %channel.id, name = %channel.name, "channel created");
    Ok(channel)
}
