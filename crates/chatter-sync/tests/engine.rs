//! End-to-end runs of the sync engine against the SQLite store.

use std::sync::Arc;
use std::time::Duration;

use chatter_shared::constants::MAX_MESSAGE_SIZE;
use chatter_shared::{
    ChannelId, Identity, Message, PushPayload, RealtimeBackend, SnapshotChild, StaticIdentity,
};
use chatter_store::{FileBlobStore, MemoryBackend, SqliteBackend};
use chatter_sync::{
    should_suppress, ChatClient, Delivery, Feed, FeedStatus, LogNotificationSink, SyncConfig,
    SyncError,
};
use serde_json::json;
use tempfile::TempDir;

struct Harness<B: RealtimeBackend> {
    client: ChatClient<B, FileBlobStore>,
    backend: Arc<B>,
    identity: Arc<StaticIdentity>,
    dir: TempDir,
}

async fn harness<B: RealtimeBackend>(make: impl FnOnce(&TempDir) -> B) -> Harness<B> {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(make(&dir));
    let blobs = FileBlobStore::new(dir.path().join("blobs"), MAX_MESSAGE_SIZE as u64)
        .await
        .unwrap();
    let identity = Arc::new(StaticIdentity::new(Some(Identity::new("u1", Some("Alice")))));
    let client = ChatClient::new(
        backend.clone(),
        Arc::new(blobs),
        identity.clone(),
        Arc::new(LogNotificationSink),
        SyncConfig::default(),
    );
    Harness {
        client,
        backend,
        identity,
        dir,
    }
}

async fn sqlite() -> Harness<SqliteBackend> {
    harness(|dir| SqliteBackend::open(&dir.path().join("chatter.db")).unwrap()).await
}

async fn wait_until<T, F>(feed: &mut Feed<T>, done: F) -> Arc<[T]>
where
    T: Send + Sync + 'static,
    F: Fn(&[T]) -> bool,
{
    loop {
        let current = feed.current();
        if done(&current) {
            return current;
        }
        tokio::time::timeout(Duration::from_secs(5), feed.changed())
            .await
            .expect("timed out waiting for the feed")
            .expect("feed closed");
    }
}

fn assert_sorted_unique(list: &[Message]) {
    assert!(list.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    let mut ids: Vec<_> = list.iter().map(|m| &m.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), list.len());
}

#[tokio::test]
async fn sent_message_becomes_last_element() {
    let h = sqlite().await;
    let channel = ChannelId::from("general");
    let sub = h.client.subscribe(&channel).unwrap();
    let mut feed = sub.feed();

    h.client.send_text(&channel, "first").await.unwrap();
    let sent = h.client.send_text(&channel, "second").await.unwrap();

    let list = wait_until(&mut feed, |l| l.len() == 2).await;
    assert_sorted_unique(&list);
    assert_eq!(list.last(), Some(&sent));
    assert_eq!(sent.sender_display_name, "Alice");
    assert_eq!(sub.status(), FeedStatus::Live);
}

#[tokio::test]
async fn late_subscriber_gets_full_history() {
    let h = sqlite().await;
    let channel = ChannelId::from("general");
    for text in ["a", "b", "c"] {
        h.client.send_text(&channel, text).await.unwrap();
    }

    let sub = h.client.subscribe(&channel).unwrap();
    let mut feed = sub.feed();
    let list = wait_until(&mut feed, |l| l.len() == 3).await;
    let texts: Vec<_> = list.iter().filter_map(|m| m.text.as_deref()).collect();
    assert_eq!(texts, ["a", "b", "c"]);
}

#[tokio::test]
async fn channels_are_isolated() {
    let h = sqlite().await;
    let general = h.client.subscribe(&ChannelId::from("general")).unwrap();
    let random = h.client.subscribe(&ChannelId::from("random")).unwrap();
    let mut random_feed = random.feed();

    h.client.send_text(&ChannelId::from("random"), "hey").await.unwrap();
    wait_until(&mut random_feed, |l| l.len() == 1).await;
    assert!(general.current().is_empty());
}

#[tokio::test]
async fn image_message_round_trip() {
    let h = sqlite().await;
    let channel = ChannelId::from("general");
    let sub = h.client.subscribe(&channel).unwrap();
    let mut feed = sub.feed();

    let photo = h.dir.path().join("cat.png");
    std::fs::write(&photo, b"png").unwrap();
    let sent = h.client.send_image(&channel, &photo).await.unwrap();

    let list = wait_until(&mut feed, |l| l.len() == 1).await;
    assert_eq!(list[0], sent);
    assert!(list[0].image_url.as_deref().is_some_and(|u| u.starts_with("file://")));
}

#[tokio::test]
async fn failed_upload_sends_nothing() {
    let h = sqlite().await;
    let channel = ChannelId::from("general");
    let missing = h.dir.path().join("missing.png");

    let err = h.client.send_image(&channel, &missing).await.unwrap_err();
    assert!(matches!(err, SyncError::Upload(_)));

    // A later text send is the only record.
    let sub = h.client.subscribe(&channel).unwrap();
    let mut feed = sub.feed();
    h.client.send_text(&channel, "after").await.unwrap();
    let list = wait_until(&mut feed, |l| !l.is_empty()).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].text.as_deref(), Some("after"));
}

#[tokio::test]
async fn sign_out_applies_to_next_send() {
    let h = sqlite().await;
    let channel = ChannelId::from("general");

    h.identity.sign_out();
    let sent = h.client.send_text(&channel, "anon").await.unwrap();
    assert_eq!(sent.sender_id, "");
    assert!(h.client.current_user().is_none());
}

#[tokio::test]
async fn added_channel_is_observed() {
    let h = sqlite().await;
    let directory = h.client.observe_channels().unwrap();
    let mut feed = directory.channels();

    let team = h.client.add_channel("Team").await.unwrap();
    let list = wait_until(&mut feed, |l| !l.is_empty()).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Team");
    assert!(!list[0].id.is_empty());
    assert_eq!(list[0].id, team.id);
}

#[tokio::test]
async fn history_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("chatter.db");
    let channel = ChannelId::from("general");
    let config = SyncConfig::default();

    let path = config.messages_path(&channel).unwrap();
    {
        let backend = SqliteBackend::open(&db_path).unwrap();
        let value = json!({ "id": "-A", "senderId": "u1", "message": "kept", "createdAt": 1 });
        backend.append(&path, "-A", value).await.unwrap();
    }

    let backend = Arc::new(SqliteBackend::open(&db_path).unwrap());
    let sub = chatter_sync::MessageSubscription::start(backend, &config, &channel).unwrap();
    let mut feed = sub.feed();
    let list = wait_until(&mut feed, |l| !l.is_empty()).await;
    assert_eq!(list[0].text.as_deref(), Some("kept"));
}

#[tokio::test]
async fn malformed_record_is_skipped() {
    let h = harness(|_| MemoryBackend::new()).await;
    let channel = ChannelId::from("general");
    let path = h.client.config().messages_path(&channel).unwrap();
    let sub = h.client.subscribe(&channel).unwrap();
    let mut feed = sub.feed();

    h.backend.inject_snapshot(
        &path,
        vec![
            SnapshotChild::new("-A", json!({ "id": "a", "senderId": "u", "message": "x", "createdAt": 2 })),
            SnapshotChild::new("-B", json!({ "message": "missing createdAt" })),
            SnapshotChild::new("-C", json!({ "id": "c", "senderId": "u", "message": "y", "createdAt": 1 })),
        ],
    );

    let list = wait_until(&mut feed, |l| !l.is_empty()).await;
    let ids: Vec<_> = list.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["c", "a"]);
}

#[tokio::test]
async fn detached_feed_is_frozen() {
    let h = harness(|_| MemoryBackend::new()).await;
    let channel = ChannelId::from("general");
    let path = h.client.config().messages_path(&channel).unwrap();
    let mut sub = h.client.subscribe(&channel).unwrap();
    let mut feed = sub.feed();

    h.client.send_text(&channel, "before").await.unwrap();
    wait_until(&mut feed, |l| l.len() == 1).await;

    sub.detach();
    h.backend.inject_snapshot(
        &path,
        vec![SnapshotChild::new("-Z", json!({ "id": "z", "senderId": "u", "createdAt": 9 }))],
    );
    h.client.send_text(&channel, "after").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let list = feed.current();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].text.as_deref(), Some("before"));
    assert!(feed.is_closed());
}

#[tokio::test]
async fn key_fallback_still_sends() {
    let h = harness(|_| MemoryBackend::new()).await;
    h.backend.set_key_generation(false);

    let sent = h.client.send_text(&ChannelId::from("general"), "hi").await.unwrap();
    assert_eq!(sent.id.len(), 36);
}

#[tokio::test]
async fn push_handling_follows_identity() {
    let h = sqlite().await;

    assert!(should_suppress(Some("Alice: hi"), Some("hi"), Some("Alice")));
    assert!(!should_suppress(Some("Bob: hi"), Some("hi"), Some("Alice")));
    assert!(!should_suppress(Some("hi"), Some("hi"), None));

    let own = h.client.on_push_received(PushPayload::new(Some("Alice: hi"), Some("hi")));
    assert_eq!(own, Delivery::Suppressed);

    let other = h.client.on_push_received(PushPayload::new(Some("Bob: hi"), Some("hi")));
    assert!(matches!(other, Delivery::Shown { id } if id < 1000));

    h.identity.sign_out();
    let after = h.client.on_push_received(PushPayload::new(Some("Alice: hi"), Some("hi")));
    assert!(matches!(after, Delivery::Shown { .. }));
}
