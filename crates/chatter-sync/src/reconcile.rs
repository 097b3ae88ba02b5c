//! Turning whole-collection snapshots into the lists a feed publishes.
//!
//! Both functions are pure: the output depends only on the snapshot's
//! content, so an identical snapshot yields an identical list.

use std::collections::HashSet;

use tracing::debug;

use chatter_shared::{Channel, Message, Snapshot};

/// Decode, order and de-duplicate a message collection.
///
/// Order is ascending `createdAt`, then child key, then message id. Children
/// that do not decode are dropped. When two children carry the same message
/// id, the first in that order wins.
pub fn reconcile_messages(snapshot: &Snapshot) -> Vec<Message> {
    let mut decoded: Vec<(&str, Message)> = Vec::with_capacity(snapshot.len());
    let mut dropped = 0usize;

    for child in &snapshot.children {
        match Message::decode(&child.key, &child.value) {
            Ok(message) => decoded.push((child.key.as_str(), message)),
            Err(e) => {
                dropped += 1;
                debug!(path = %snapshot.path, error = %e, "dropping undecodable message");
            }
        }
    }

    decoded.sort_by(|(key_a, a), (key_b, b)| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| key_a.cmp(key_b))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen = HashSet::with_capacity(decoded.len());
    let messages: Vec<Message> = decoded
        .into_iter()
        .filter_map(|(_, message)| seen.insert(message.id.clone()).then_some(message))
        .collect();

    debug!(
        path = %snapshot.path,
        children = snapshot.len(),
        messages = messages.len(),
        dropped,
        "reconciled message snapshot"
    );
    messages
}

/// Decode a channel collection, keeping the backend's order.
pub fn reconcile_channels(snapshot: &Snapshot) -> Vec<Channel> {
    let mut seen = HashSet::with_capacity(snapshot.len());
    snapshot
        .children
        .iter()
        .filter_map(|child| match Channel::decode(&child.key, &child.value) {
            Ok(channel) => Some(channel),
            Err(e) => {
                debug!(error = %e, "dropping undecodable channel");
                None
            }
        })
        .filter(|channel| seen.insert(channel.id.clone()))
        .collect()
}
