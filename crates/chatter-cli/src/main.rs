//! # chatter
//!
//! Command-line client for the Chatter sync engine, running against the
//! local SQLite store. Useful for poking at a database by hand and for
//! watching a channel from a terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatter_shared::constants::{APP_NAME, MAX_MESSAGE_SIZE};
use chatter_shared::{ChannelId, Identity, PushPayload, StaticIdentity};
use chatter_store::{Database, FileBlobStore, SqliteBackend};
use chatter_sync::{ChatClient, Feed, FeedStatus, LogNotificationSink, SyncConfig};

/// How long `channels` waits for the initial load.
const INITIAL_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "chatter")]
#[command(about = "Channel chat over a realtime collection store")]
struct Cli {
    /// SQLite database file. Defaults to the platform data directory.
    #[arg(long, env = "CHATTER_DB_PATH", global = true)]
    db: Option<PathBuf>,

    /// Directory uploaded images are copied into.
    #[arg(long, env = "CHATTER_BLOB_DIR", global = true)]
    blob_dir: Option<PathBuf>,

    /// Signed-in user id. Without it every operation runs signed out.
    #[arg(long, env = "CHATTER_USER_ID", global = true)]
    user_id: Option<String>,

    #[arg(long, env = "CHATTER_DISPLAY_NAME", global = true)]
    display_name: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print every channel.
    Channels,
    /// Create a channel.
    AddChannel { name: String },
    /// Send a text message.
    Send { channel: String, text: String },
    /// Upload an image and send it.
    SendImage { channel: String, path: PathBuf },
    /// Follow a channel, printing its message list on every change.
    Watch { channel: String },
    /// Run a push payload through the notification filter.
    Notify {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,chatter_sync=debug,chatter_store=info")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting {} CLI v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = SyncConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the store and build the client
    // -----------------------------------------------------------------------
    let db_path = match cli.db {
        Some(path) => path,
        None => Database::default_path().context("no data directory for the database")?,
    };
    let blob_dir = cli.blob_dir.unwrap_or_else(|| {
        db_path
            .parent()
            .map(|p| p.join("blobs"))
            .unwrap_or_else(|| PathBuf::from("blobs"))
    });

    let backend = Arc::new(
        SqliteBackend::open(&db_path)
            .with_context(|| format!("opening {}", db_path.display()))?,
    );
    let blobs = Arc::new(FileBlobStore::new(blob_dir, MAX_MESSAGE_SIZE as u64).await?);
    let identity = cli
        .user_id
        .as_deref()
        .map(|uid| Identity::new(uid, cli.display_name.as_deref()));
    let client = ChatClient::new(
        backend,
        blobs,
        Arc::new(StaticIdentity::new(identity)),
        Arc::new(LogNotificationSink),
        config,
    );

    // -----------------------------------------------------------------------
    // 4. Run the command
    // -----------------------------------------------------------------------
    match cli.cmd {
        Cmd::Channels => {
            let directory = client.observe_channels()?;
            let mut feed = directory.channels();
            wait_for_initial_load(&mut feed).await?;
            for channel in feed.current().iter() {
                println!("{}\t{}", channel.id, channel.name);
            }
        }
        Cmd::AddChannel { name } => {
            let channel = client.add_channel(&name).await?;
            println!("{}", serde_json::to_string(&channel)?);
        }
        Cmd::Send { channel, text } => {
            let message = client.send_text(&ChannelId::from(channel), &text).await?;
            println!("{}", serde_json::to_string(&message)?);
        }
        Cmd::SendImage { channel, path } => {
            let message = client.send_image(&ChannelId::from(channel), &path).await?;
            println!("{}", serde_json::to_string(&message)?);
        }
        Cmd::Watch { channel } => {
            let subscription = client.subscribe(&ChannelId::from(channel))?;
            let mut lists = Box::pin(subscription.feed().into_stream());
            loop {
                tokio::select! {
                    next = lists.next() => {
                        let Some(list) = next else { break };
                        println!("{}", serde_json::to_string(&*list)?);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted, detaching");
                        break;
                    }
                }
            }
            if let FeedStatus::Failed { reason } = subscription.status() {
                anyhow::bail!("subscription failed: {reason}");
            }
        }
        Cmd::Notify { title, body } => {
            let delivery = client.on_push_received(PushPayload { title, body });
            println!("{}", serde_json::to_string(&delivery)?);
        }
    }

    Ok(())
}

async fn wait_for_initial_load<T: Send + Sync + 'static>(feed: &mut Feed<T>) -> anyhow::Result<()> {
    let wait = async {
        loop {
            match feed.status() {
                FeedStatus::Connecting => {}
                FeedStatus::Failed { reason } => anyhow::bail!("listener failed: {reason}"),
                _ => return Ok(()),
            }
            if feed.status_changed().await.is_none() {
                anyhow::bail!("listener closed before the initial load");
            }
        }
    };
    tokio::time::timeout(INITIAL_LOAD_TIMEOUT, wait)
        .await
        .context("timed out waiting for the initial load")?
}
