//! Shapes exchanged with the push transport and the platform notification
//! facility.

use serde::{Deserialize, Serialize};

use crate::constants::{NOTIFICATION_CATEGORY_ID, NOTIFICATION_CATEGORY_NAME};
use crate::error::NotificationError;

/// Notification part of an inbound push message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl PushPayload {
    pub fn new(title: Option<&str>, body: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            body: body.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    Default,
    High,
}

/// A notification channel/category registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCategory {
    pub id: String,
    pub name: String,
    pub importance: Importance,
}

impl NotificationCategory {
    /// The one category every chat message is posted under.
    pub fn messages() -> Self {
        Self {
            id: NOTIFICATION_CATEGORY_ID.to_string(),
            name: NOTIFICATION_CATEGORY_NAME.to_string(),
            importance: Importance::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemNotification {
    pub category: String,
    pub title: Option<String>,
    pub body: Option<String>,
    /// Posting a second notification with the same id replaces the first.
    pub id: u32,
}

/// The platform notification facility.
pub trait NotificationSink: Send + Sync + 'static {
    fn register_category(&self, category: &NotificationCategory) -> Result<(), NotificationError>;

    fn show(&self, notification: SystemNotification) -> Result<(), NotificationError>;
}
