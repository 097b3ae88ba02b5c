//! # chatter-sync
//!
//! Real-time sync engine for channel-based chat. Generic over the
//! [`RealtimeBackend`](chatter_shared::RealtimeBackend) and
//! [`BlobUploader`](chatter_shared::BlobUploader) ports, so the same engine
//! runs against the hosted database, the local SQLite store, or the
//! in-memory test backend.
//!
//! - [`MessageSubscription`]: a channel's messages as an always-sorted,
//!   de-duplicated list that is replaced wholesale on every snapshot.
//! - [`MessageDispatcher`]: append-only text and image sends.
//! - [`ChannelDirectory`]: the live channel list plus channel creation.
//! - [`NotificationFilter`]: suppression of pushes about one's own messages.
//! - [`ChatClient`]: all of the above bound to one identity provider.

pub mod client;
pub mod config;
pub mod directory;
pub mod dispatcher;
pub mod feed;
pub mod notifications;
pub mod reconcile;
pub mod subscription;

mod error;

pub use client::ChatClient;
pub use config::SyncConfig;
pub use directory::{create_channel, ChannelDirectory};
pub use dispatcher::MessageDispatcher;
pub use error::{Result, SyncError};
pub use feed::{ChannelFeed, Feed, FeedStatus, MessageFeed};
pub use notifications::{should_suppress, Delivery, LogNotificationSink, NotificationFilter};
pub use reconcile::{reconcile_channels, reconcile_messages};
pub use subscription::{MessageSubscription, Subscription};
