//! Records stored in the realtime database.
//!
//! Field names on the wire follow the database's camelCase JSON layout, so
//! records written by other clients decode without a translation layer.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DecodeError;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message. Never mutated after it is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Push key generated at write time (UUID v4 if key generation failed).
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Sender's user id; empty when the sender was not signed in.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender_id: String,
    /// Text body. Text-only and image messages are not enforced exclusive.
    #[serde(
        rename = "message",
        alias = "text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
    /// Sender-side wall clock in milliseconds since the epoch. Sole ordering key.
    pub created_at: i64,
    /// Sender name copied into the record so it renders without a lookup.
    #[serde(
        rename = "senderName",
        alias = "senderDisplayName",
        default,
        deserialize_with = "null_as_default"
    )]
    pub sender_display_name: String,
    /// Sender avatar URL. Written as null by this client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_image: Option<String>,
    /// URL of a previously uploaded image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Message {
    /// Decode one snapshot child. A record without its own `id` takes the
    /// key it is stored under.
    pub fn decode(key: &str, value: &serde_json::Value) -> Result<Self, DecodeError> {
        if !value.is_object() {
            return Err(DecodeError::NotAnObject {
                key: key.to_string(),
            });
        }
        let mut message: Message =
            serde_json::from_value(value.clone()).map_err(|source| DecodeError::Malformed {
                key: key.to_string(),
                source,
            })?;
        if message.id.is_empty() {
            message.id = key.to_string();
        }
        Ok(message)
    }

    pub fn is_image(&self) -> bool {
        self.image_url.is_some()
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A named conversation container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Display label; neither unique nor guaranteed non-empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Creation time in ms. Records written by older clients lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl Channel {
    pub fn decode(key: &str, value: &serde_json::Value) -> Result<Self, DecodeError> {
        if !value.is_object() {
            return Err(DecodeError::NotAnObject {
                key: key.to_string(),
            });
        }
        let mut channel: Channel =
            serde_json::from_value(value.clone()).map_err(|source| DecodeError::Malformed {
                key: key.to_string(),
                source,
            })?;
        if channel.id.is_empty() {
            channel.id = key.to_string();
        }
        Ok(channel)
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
