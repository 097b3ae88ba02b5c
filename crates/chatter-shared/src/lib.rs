//! Types shared by every Chatter crate: the wire records exchanged with the
//! realtime database, identity, and the ports the sync engine consumes
//! (realtime backend, blob uploader, notification sink).

pub mod backend;
pub mod constants;
pub mod error;
pub mod identity;
pub mod keys;
pub mod models;
pub mod notification;
pub mod snapshot;
pub mod types;
pub mod upload;

pub use backend::{Listener, ListenerId, RealtimeBackend};
pub use error::{BackendError, DecodeError, NotificationError, UploadError};
pub use notification::{NotificationCategory, NotificationSink, PushPayload, SystemNotification};
pub use upload::BlobUploader;
pub use identity::{Identity, IdentityProvider, StaticIdentity};
pub use models::{Channel, Message};
pub use snapshot::{ListenEvent, Query, Snapshot, SnapshotChild};
pub use types::{ChannelId, DataPath, UserId};
