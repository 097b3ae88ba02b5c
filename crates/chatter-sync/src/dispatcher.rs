//! Outgoing messages.
//!
//! Every send builds a complete [`Message`] and appends it as a new child of
//! the channel's message collection. The dispatcher never waits for the
//! write to come back through a subscription; listeners pick it up like any
//! other record.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use chatter_shared::{BlobUploader, ChannelId, Identity, Message, RealtimeBackend};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};

pub struct MessageDispatcher<B, U> {
    backend: Arc<B>,
    uploader: Arc<U>,
    config: SyncConfig,
}

impl<B, U> MessageDispatcher<B, U>
where
    B: RealtimeBackend,
    U: BlobUploader,
{
    pub fn new(backend: Arc<B>, uploader: Arc<U>, config: SyncConfig) -> Self {
        Self {
            backend,
            uploader,
            config,
        }
    }

    /// Send a text message. `identity` is `None` for a signed-out sender;
    /// the record then carries empty sender fields.
    pub async fn send_text(
        &self,
        identity: Option<&Identity>,
        channel_id: &ChannelId,
        text: &str,
    ) -> Result<Message> {
        if text.len() > self.config.max_message_len {
            return Err(SyncError::MessageTooLarge {
                size: text.len(),
                max: self.config.max_message_len,
            });
        }

        let message = self.compose(identity, Some(text.to_string()), None);
        self.write(channel_id, message).await
    }

    /// Upload `local_image`, then send a message pointing at it. An upload
    /// failure writes nothing.
    pub async fn send_image(
        &self,
        identity: Option<&Identity>,
        channel_id: &ChannelId,
        local_image: &Path,
    ) -> Result<Message> {
        let image_url = self.uploader.upload(local_image).await.map_err(|e| {
            warn!(channel = %channel_id, error = %e, "image upload failed, nothing sent");
            e
        })?;
        debug!(channel = %channel_id, url = %image_url, "image uploaded");

        let message = self.compose(identity, None, Some(image_url));
        self.write(channel_id, message).await
    }

    fn compose(
        &self,
        identity: Option<&Identity>,
        text: Option<String>,
        image_url: Option<String>,
    ) -> Message {
        let (sender_id, sender_display_name) = match identity {
            Some(identity) => (
                identity.user_id.as_str().to_string(),
                identity.display_name.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        Message {
            id: record_id(self.backend.as_ref()),
            sender_id,
            text,
            created_at: chrono::Utc::now().timestamp_millis(),
            sender_display_name,
            sender_image: None,
            image_url,
        }
    }

    async fn write(&self, channel_id: &ChannelId, message: Message) -> Result<Message> {
        let path = self
            .config
            .messages_path(channel_id)
            .map_err(SyncError::Write)?;
        let value = serde_json::to_value(&message)
            .map_err(|e| SyncError::Write(e.into()))?;

        self.backend
            .append(&path, &message.id, value)
            .await
            .map_err(SyncError::Write)?;

        info!(
            channel = %channel_id,
            id = %message.id,
            image = message.is_image(),
            "message sent"
        );
        Ok(message)
    }
}

/// A fresh record id from the backend's key facility, or a random UUID when
/// the facility yields nothing.
pub(crate) fn record_id<B: RealtimeBackend>(backend: &B) -> String {
    match backend.generate_key() {
        Some(key) => key,
        None => {
            let id = Uuid::new_v4().to_string();
            warn!(id = %id, "key generation unavailable, using random id");
            id
        }
    }
}
