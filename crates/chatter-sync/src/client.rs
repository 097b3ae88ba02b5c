use std::path::Path;
use std::sync::Arc;

use chatter_shared::{
    BlobUploader, Channel, ChannelId, Identity, IdentityProvider, Message, NotificationSink,
    PushPayload, RealtimeBackend,
};

use crate::config::SyncConfig;
use crate::directory::{create_channel, ChannelDirectory};
use crate::dispatcher::MessageDispatcher;
use crate::error::Result;
use crate::notifications::{Delivery, NotificationFilter};
use crate::subscription::MessageSubscription;

/// One signed-in (or signed-out) client: the entry point presentation
/// layers hold on to.
///
/// The identity is read from the provider on every call, so sign-in and
/// sign-out apply to the next send or push without rebuilding the client.
pub struct ChatClient<B: RealtimeBackend, U: BlobUploader> {
    backend: Arc<B>,
    identity: Arc<dyn IdentityProvider>,
    dispatcher: MessageDispatcher<B, U>,
    notifications: NotificationFilter,
    config: SyncConfig,
}

impl<B, U> ChatClient<B, U>
where
    B: RealtimeBackend,
    U: BlobUploader,
{
    pub fn new(
        backend: Arc<B>,
        uploader: Arc<U>,
        identity: Arc<dyn IdentityProvider>,
        sink: Arc<dyn NotificationSink>,
        config: SyncConfig,
    ) -> Self {
        Self {
            dispatcher: MessageDispatcher::new(Arc::clone(&backend), uploader, config.clone()),
            notifications: NotificationFilter::new(sink, config.notification_id_range),
            backend,
            identity,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.identity.current_user()
    }

    /// Attach to a channel's messages. Dropping the subscription detaches it.
    pub fn subscribe(&self, channel_id: &ChannelId) -> Result<MessageSubscription<B>> {
        MessageSubscription::start(Arc::clone(&self.backend), &self.config, channel_id)
    }

    pub fn observe_channels(&self) -> Result<ChannelDirectory<B>> {
        ChannelDirectory::observe(Arc::clone(&self.backend), self.config.clone())
    }

    pub async fn add_channel(&self, name: &str) -> Result<Channel> {
        create_channel(self.backend.as_ref(), &self.config, name).await
    }

    pub async fn send_text(&self, channel_id: &ChannelId, text: &str) -> Result<Message> {
        let identity = self.current_user();
        self.dispatcher
            .send_text(identity.as_ref(), channel_id, text)
            .await
    }

    pub async fn send_image(&self, channel_id: &ChannelId, local_image: &Path) -> Result<Message> {
        let identity = self.current_user();
        self.dispatcher
            .send_image(identity.as_ref(), channel_id, local_image)
            .await
    }

    pub fn on_push_received(&self, payload: PushPayload) -> Delivery {
        let identity = self.current_user();
        self.notifications.on_push(payload, identity.as_ref())
    }
}
