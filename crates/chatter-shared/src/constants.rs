/// Application name
pub const APP_NAME: &str = "Chatter";

/// Root collection holding one child collection of messages per channel
pub const MESSAGES_ROOT: &str = "messages";

/// Root collection holding every channel record
pub const CHANNELS_ROOT: &str = "channel";

/// Field message collections are ordered by
pub const ORDER_BY_CREATED_AT: &str = "createdAt";

/// Maximum message text size in bytes (256 KiB)
pub const MAX_MESSAGE_SIZE: usize = 262_144;

/// Length of a generated push key
pub const PUSH_ID_LEN: usize = 20;

/// The single notification category every chat message is posted under
pub const NOTIFICATION_CATEGORY_ID: &str = "messages";
pub const NOTIFICATION_CATEGORY_NAME: &str = "Messages";

/// Notification ids are drawn from `0..NOTIFICATION_ID_RANGE`
pub const NOTIFICATION_ID_RANGE: u32 = 1000;
