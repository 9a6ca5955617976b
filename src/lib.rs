//! # queuebird
//!
//! Per-guild playback queue engine for Discord bots built on
//! [serenity](https://docs.rs/serenity) + [songbird](https://docs.rs/songbird).
//!
//! The crate owns the queue state machine and nothing else: audio decoding
//! and voice transport stay inside songbird, command parsing stays in the
//! host bot. A [`GuildPlayer`] is created per guild voice session with three
//! injected capabilities:
//!
//! - a [`VoiceSink`] that outputs one active stream per guild,
//! - a [`SourceResolver`] that turns a [`TrackRequest`] into a playable input,
//! - a [`Notifier`] for user-facing error messages.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use queuebird::{
//!     ChannelNotifier, PlayerConfig, PlayerManager, SongbirdSink, TrackRequest, YtDlpResolver,
//! };
//! use serenity::model::id::{ChannelId, GuildId, UserId};
//!
//! # async fn example(
//! #     call: Arc<tokio::sync::Mutex<songbird::Call>>,
//! #     http: Arc<serenity::http::Http>,
//! # ) -> anyhow::Result<()> {
//! let config = PlayerConfig::load()?;
//! let manager = PlayerManager::new(config.clone());
//! let _reaper = manager.spawn_reaper();
//!
//! let player = manager
//!     .create(
//!         GuildId::new(1),
//!         Arc::new(SongbirdSink::new(call, config.default_volume)),
//!         Arc::new(YtDlpResolver::new(reqwest::Client::new())),
//!         Arc::new(ChannelNotifier::new(http, ChannelId::new(2))),
//!     )
//!     .await;
//!
//! player
//!     .enqueue(TrackRequest::new("Song1", "https://youtu.be/x", UserId::new(3)))
//!     .await?;
//! player.play().await?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod notify;
pub mod sources;
pub mod ui;

pub use audio::manager::PlayerManager;
pub use audio::player::{GuildPlayer, PlayerState};
pub use audio::queue::{TrackQueue, DEFAULT_MAX_QUEUE};
pub use audio::sink::{SongbirdSink, TrackEndEvent, VoiceSink};
pub use audio::track::{TrackEntry, TrackRequest};
pub use config::PlayerConfig;
pub use error::{PlayerError, SinkError};
pub use notify::{ChannelNotifier, Notifier};
pub use sources::{DirectUrlResolver, SourceResolver, YtDlpResolver};
