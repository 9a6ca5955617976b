use dashmap::DashMap;
use futures::future::join_all;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::audio::player::GuildPlayer;
use crate::audio::sink::VoiceSink;
use crate::config::PlayerConfig;
use crate::notify::Notifier;
use crate::sources::SourceResolver;

/// Registro de players por guild.
///
/// Un player nace cuando arranca la sesión de voz del guild y muere cuando el
/// bot se desconecta del canal; nada se persiste entre reinicios. El reaper
/// recorre los players y desarma los que quedaron inactivos demasiado tiempo.
pub struct PlayerManager {
    players: DashMap<GuildId, Arc<GuildPlayer>>,
    config: PlayerConfig,
}

impl PlayerManager {
    pub fn new(config: PlayerConfig) -> Arc<Self> {
        Arc::new(Self {
            players: DashMap::new(),
            config,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<GuildPlayer>> {
        self.players.get(&guild_id).map(|entry| entry.clone())
    }

    /// Crea (o reemplaza) el player del guild con sus capacidades inyectadas.
    /// El player reemplazado se desarma para no dejar su stream huérfano.
    pub async fn create(
        &self,
        guild_id: GuildId,
        sink: Arc<dyn VoiceSink>,
        resolver: Arc<dyn SourceResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<GuildPlayer> {
        let player = GuildPlayer::spawn(&self.config, sink, resolver, notifier);
        if let Some(old) = self.players.insert(guild_id, player.clone()) {
            old.teardown().await;
        }
        info!("🎧 Player creado para guild {}", guild_id);
        player
    }

    /// Desarma el player del guild: detiene el sink y descarta su cola.
    pub async fn remove(&self, guild_id: GuildId) -> bool {
        match self.players.remove(&guild_id) {
            Some((_, player)) => {
                player.teardown().await;
                info!("🔌 Player desarmado para guild {}", guild_id);
                true
            }
            None => false,
        }
    }

    /// Desarma todos los players inactivos y devuelve sus guilds.
    pub async fn reap_stale(&self) -> Vec<GuildId> {
        let threshold = self.config.stale_after();
        let snapshot: Vec<(GuildId, Arc<GuildPlayer>)> = self
            .players
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let checks = snapshot
            .into_iter()
            .map(|(guild_id, player)| async move { (guild_id, player.is_stale(threshold).await) });

        let mut reaped = Vec::new();
        for (guild_id, stale) in join_all(checks).await {
            if stale {
                warn!("🧹 Sesión inactiva en guild {}, desconectando", guild_id);
                self.remove(guild_id).await;
                reaped.push(guild_id);
            }
        }
        reaped
    }

    /// Lanza la tarea periódica que cosecha sesiones inactivas.
    ///
    /// Cancelar el token devuelto la detiene; también se detiene sola si el
    /// manager se suelta.
    pub fn spawn_reaper(self: &Arc<Self>) -> CancellationToken {
        let token = CancellationToken::new();
        let guard = token.clone();
        let manager = Arc::downgrade(self);
        let interval = self.config.reaper_interval();

        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = guard.cancelled() => break,
                    _ = tick.tick() => {
                        let Some(manager) = manager.upgrade() else { break };
                        let reaped = manager.reap_stale().await;
                        if !reaped.is_empty() {
                            debug!("🧹 Reaper desarmó {} players", reaped.len());
                        }
                    }
                }
            }
            debug!("🧹 Reaper detenido");
        });

        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sink::MockVoiceSink;
    use crate::audio::track::TrackRequest;
    use crate::notify::MockNotifier;
    use crate::sources::MockSourceResolver;
    use pretty_assertions::assert_eq;
    use serenity::model::id::UserId;

    fn capabilities() -> (
        Arc<MockVoiceSink>,
        Arc<MockSourceResolver>,
        Arc<MockNotifier>,
    ) {
        let mut sink = MockVoiceSink::new();
        sink.expect_is_playing().returning(|| false);
        sink.expect_is_paused().returning(|| false);
        sink.expect_stop().returning(|| ());
        (
            Arc::new(sink),
            Arc::new(MockSourceResolver::new()),
            Arc::new(MockNotifier::new()),
        )
    }

    #[tokio::test]
    async fn create_get_and_remove_round_trip() {
        let manager = PlayerManager::new(PlayerConfig::default());
        let guild = GuildId::new(42);
        let (sink, resolver, notifier) = capabilities();

        assert!(manager.get(guild).is_none());
        manager.create(guild, sink, resolver, notifier).await;
        assert!(manager.get(guild).is_some());

        assert!(manager.remove(guild).await);
        assert!(manager.get(guild).is_none());
        assert!(!manager.remove(guild).await);
    }

    #[tokio::test]
    async fn create_tears_down_the_replaced_player() {
        let manager = PlayerManager::new(PlayerConfig::default());
        let guild = GuildId::new(7);

        // el player desplazado tiene que detener su sink exactamente una vez
        let mut old_sink = MockVoiceSink::new();
        old_sink.expect_stop().times(1).returning(|| ());
        let old = manager
            .create(
                guild,
                Arc::new(old_sink),
                Arc::new(MockSourceResolver::new()),
                Arc::new(MockNotifier::new()),
            )
            .await;
        old.enqueue(TrackRequest::new("a", "https://example.com/a", UserId::new(1)))
            .await
            .unwrap();

        let (sink, resolver, notifier) = capabilities();
        let new = manager.create(guild, sink, resolver, notifier).await;

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(old.queue_len().await, 0, "el player viejo queda desarmado");
        assert!(Arc::ptr_eq(&manager.get(guild).unwrap(), &new));
    }

    #[tokio::test]
    async fn reaper_only_collects_stale_players() {
        let config = PlayerConfig {
            stale_after_secs: 0,
            ..PlayerConfig::default()
        };
        let manager = PlayerManager::new(config);

        let fresh = GuildId::new(1);
        let idle = GuildId::new(2);
        let (sink, resolver, notifier) = capabilities();
        manager
            .create(fresh, sink.clone(), resolver.clone(), notifier.clone())
            .await;
        let idle_player = manager.create(idle, sink, resolver, notifier).await;

        idle_player
            .enqueue(TrackRequest::new("a", "https://example.com/a", UserId::new(1)))
            .await
            .unwrap();
        idle_player.skip().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let reaped = manager.reap_stale().await;
        assert_eq!(reaped, vec![idle]);
        assert!(manager.get(fresh).is_some());
        assert!(manager.get(idle).is_none());
    }
}
