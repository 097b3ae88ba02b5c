//! Inbound push handling.
//!
//! A push about a message the local user wrote themselves is swallowed;
//! everything else becomes one system notification.

use std::sync::{Arc, Mutex};

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use chatter_shared::{
    Identity, NotificationCategory, NotificationError, NotificationSink, PushPayload,
    SystemNotification,
};

/// True when the push mentions the local user's display name in its title
/// or body. A missing or empty name never suppresses.
pub fn should_suppress(title: Option<&str>, body: Option<&str>, display_name: Option<&str>) -> bool {
    let Some(name) = display_name.filter(|n| !n.is_empty()) else {
        return false;
    };
    title.is_some_and(|t| t.contains(name)) || body.is_some_and(|b| b.contains(name))
}

/// What happened to one push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Delivery {
    Suppressed,
    Shown { id: u32 },
    /// The payload had neither title nor body.
    Empty,
    Failed { reason: String },
}

pub struct NotificationFilter {
    sink: Arc<dyn NotificationSink>,
    category: NotificationCategory,
    registered: Mutex<bool>,
    id_range: u32,
}

impl NotificationFilter {
    pub fn new(sink: Arc<dyn NotificationSink>, id_range: u32) -> Self {
        Self {
            sink,
            category: NotificationCategory::messages(),
            registered: Mutex::new(false),
            id_range: id_range.max(1),
        }
    }

    pub fn on_push(&self, payload: PushPayload, identity: Option<&Identity>) -> Delivery {
        if payload.title.is_none() && payload.body.is_none() {
            debug!("push without notification part ignored");
            return Delivery::Empty;
        }

        let display_name = identity.and_then(|i| i.display_name.as_deref());
        if should_suppress(payload.title.as_deref(), payload.body.as_deref(), display_name) {
            debug!("suppressing notification for own message");
            return Delivery::Suppressed;
        }

        match self.show(payload) {
            Ok(id) => {
                info!(id, "notification shown");
                Delivery::Shown { id }
            }
            Err(e) => {
                warn!(error = %e, "failed to show notification");
                Delivery::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn show(&self, payload: PushPayload) -> Result<u32, NotificationError> {
        self.ensure_category()?;
        let id = rand::thread_rng().gen_range(0..self.id_range);
        self.sink.show(SystemNotification {
            category: self.category.id.clone(),
            title: payload.title,
            body: payload.body,
            id,
        })?;
        Ok(id)
    }

    fn ensure_category(&self) -> Result<(), NotificationError> {
        let mut registered = self
            .registered
            .lock()
            .map_err(|e| NotificationError::Unavailable(format!("registration lock poisoned: {e}")))?;
        if !*registered {
            self.sink.register_category(&self.category)?;
            *registered = true;
            debug!(category = %self.category.id, "notification category registered");
        }
        Ok(())
    }
}

/// Sink that writes notifications to the log. Used where no platform
/// notification facility exists, e.g. the command line.
#[derive(Debug, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn register_category(&self, category: &NotificationCategory) -> Result<(), NotificationError> {
        info!(id = %category.id, name = %category.name, importance = ?category.importance, "category registered");
        Ok(())
    }

    fn show(&self, notification: SystemNotification) -> Result<(), NotificationError> {
        info!(
            id = notification.id,
            category = %notification.category,
            title = notification.title.as_deref().unwrap_or(""),
            body = notification.body.as_deref().unwrap_or(""),
            "notification"
        );
        Ok(())
    }
}
