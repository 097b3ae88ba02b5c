use serde::{Deserialize, Serialize};

use crate::constants::CHANNELS_ROOT;
use crate::error::BackendError;

// Identity of a signed-in user as handed out by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Slash-separated location of a collection in the realtime database,
/// e.g. `messages/-NxAbc123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataPath(String);

impl DataPath {
    /// A top-level collection. Root names are compile-time constants and are
    /// not validated.
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn channels() -> Self {
        Self::root(CHANNELS_ROOT)
    }

    /// Parse a full path, validating every segment.
    pub fn parse(path: &str) -> Result<Self, BackendError> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments
            .next()
            .ok_or_else(|| BackendError::InvalidPath(path.to_string()))?;
        validate_segment(first)?;
        let mut out = Self::root(first);
        for segment in segments {
            out = out.child(segment)?;
        }
        Ok(out)
    }

    /// Append one segment. Segments may not be empty or contain `/ . # $ [ ]`.
    pub fn child(&self, segment: &str) -> Result<Self, BackendError> {
        validate_segment(segment)?;
        Ok(Self(format!("{}/{}", self.0, segment)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_segment(segment: &str) -> Result<(), BackendError> {
    const FORBIDDEN: &[char] = &['/', '.', '#', '$', '[', ']'];
    if segment.is_empty() || segment.contains(FORBIDDEN) || segment.chars().any(char::is_control) {
        return Err(BackendError::InvalidPath(segment.to_string()));
    }
    Ok(())
}
