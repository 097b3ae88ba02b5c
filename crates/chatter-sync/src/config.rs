//! Engine configuration loaded from environment variables.
//!
//! Every setting has a default matching the hosted database layout, so the
//! engine runs with zero configuration.

use chatter_shared::constants::{
    CHANNELS_ROOT, MAX_MESSAGE_SIZE, MESSAGES_ROOT, NOTIFICATION_ID_RANGE, ORDER_BY_CREATED_AT,
};
use chatter_shared::{BackendError, ChannelId, DataPath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Collection holding one message collection per channel.
    /// Env: `CHATTER_MESSAGES_PATH`
    /// Default: `messages`
    pub messages_root: String,

    /// Collection holding channel records.
    /// Env: `CHATTER_CHANNELS_PATH`
    /// Default: `channel`
    pub channels_root: String,

    /// Child field message listeners are ordered by.
    /// Env: `CHATTER_ORDER_BY`
    /// Default: `createdAt`
    pub order_by: String,

    /// Largest text body `send_text` accepts, in bytes.
    /// Env: `CHATTER_MAX_MESSAGE_LEN`
    /// Default: `262144`
    pub max_message_len: usize,

    /// Notification ids are drawn from `0..notification_id_range`.
    /// Env: `CHATTER_NOTIFICATION_ID_RANGE`
    /// Default: `1000`
    pub notification_id_range: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            messages_root: MESSAGES_ROOT.to_string(),
            channels_root: CHANNELS_ROOT.to_string(),
            order_by: ORDER_BY_CREATED_AT.to_string(),
            max_message_len: MAX_MESSAGE_SIZE,
            notification_id_range: NOTIFICATION_ID_RANGE,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("CHATTER_MESSAGES_PATH") {
            if DataPath::parse(&path).is_ok() {
                config.messages_root = path;
            } else {
                tracing::warn!(value = %path, "Invalid CHATTER_MESSAGES_PATH, using default");
            }
        }

        if let Some(path) = lookup("CHATTER_CHANNELS_PATH") {
            if DataPath::parse(&path).is_ok() {
                config.channels_root = path;
            } else {
                tracing::warn!(value = %path, "Invalid CHATTER_CHANNELS_PATH, using default");
            }
        }

        if let Some(field) = lookup("CHATTER_ORDER_BY") {
            if !field.trim().is_empty() {
                config.order_by = field.trim().to_string();
            }
        }

        if let Some(val) = lookup("CHATTER_MAX_MESSAGE_LEN") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_message_len = n,
                _ => tracing::warn!(value = %val, "Invalid CHATTER_MAX_MESSAGE_LEN, using default"),
            }
        }

        if let Some(val) = lookup("CHATTER_NOTIFICATION_ID_RANGE") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.notification_id_range = n,
                _ => tracing::warn!(
                    value = %val,
                    "Invalid CHATTER_NOTIFICATION_ID_RANGE, using default"
                ),
            }
        }

        config
    }

    /// Collection holding `channel_id`'s messages.
    pub fn messages_path(&self, channel_id: &ChannelId) -> Result<DataPath, BackendError> {
        DataPath::parse(&self.messages_root)?.child(channel_id.as_str())
    }

    pub fn channels_path(&self) -> Result<DataPath, BackendError> {
        DataPath::parse(&self.channels_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.messages_root, "messages");
        assert_eq!(config.channels_root, "channel");
        assert_eq!(config.order_by, "createdAt");
        assert_eq!(config.notification_id_range, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("CHATTER_MESSAGES_PATH", "chat/messages"),
            ("CHATTER_MAX_MESSAGE_LEN", "16"),
        ]));
        assert_eq!(config.max_message_len, 16);
        assert_eq!(
            config.messages_path(&ChannelId::from("c1")).unwrap().as_str(),
            "chat/messages/c1"
        );
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("CHATTER_CHANNELS_PATH", "bad#path"),
            ("CHATTER_MAX_MESSAGE_LEN", "lots"),
            ("CHATTER_NOTIFICATION_ID_RANGE", "0"),
        ]));
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn test_channel_id_must_be_a_single_segment() {
        let config = SyncConfig::default();
        assert!(config.messages_path(&ChannelId::from("a/b")).is_err());
        assert!(config.messages_path(&ChannelId::from("")).is_err());
    }
}
