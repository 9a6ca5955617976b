use serenity::builder::CreateEmbed;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::audio::queue::TrackQueue;
use crate::audio::sink::{TrackEndEvent, VoiceSink};
use crate::audio::track::{TrackEntry, TrackRequest};
use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::notify::Notifier;
use crate::sources::SourceResolver;
use crate::ui::embeds;

/// Estado observable del player de un guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Cola vacía o sink sin salida activa.
    Idle,
    /// El sink está sacando la entrada en posición 0.
    Playing,
    /// El sink retiene el stream de la posición 0 sin sacarlo.
    Paused,
}

/// Motor de reproducción de un guild + canal de texto.
///
/// Posee la cola detrás de un mutex que serializa toda mutación, incluida la
/// atención de los avisos de finalización: el sink los manda por un canal
/// mpsc y una tarea por guild los vuelve a meter en la misma sección crítica.
/// Las tres capacidades externas (sink de voz, resolver de fuentes y canal de
/// avisos) se inyectan al construir; no hay acceso global.
pub struct GuildPlayer {
    queue: Mutex<TrackQueue>,
    sink: Arc<dyn VoiceSink>,
    resolver: Arc<dyn SourceResolver>,
    notifier: Arc<dyn Notifier>,
    events: mpsc::UnboundedSender<TrackEndEvent>,
    retry_limit: u32,
}

impl GuildPlayer {
    /// Crea el player y lanza su tarea de avisos de finalización.
    ///
    /// La tarea vive mientras viva el player: sostiene una referencia débil,
    /// así que soltar el último `Arc` cierra el canal y la termina.
    pub fn spawn(
        config: &PlayerConfig,
        sink: Arc<dyn VoiceSink>,
        resolver: Arc<dyn SourceResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let (events, mut rx) = mpsc::unbounded_channel();

        let player = Arc::new(Self {
            queue: Mutex::new(TrackQueue::new(config.max_queue_size)),
            sink,
            resolver,
            notifier,
            events,
            retry_limit: config.play_retry_limit,
        });

        let weak = Arc::downgrade(&player);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match weak.upgrade() {
                    Some(player) => player.handle_track_end(event).await,
                    None => break,
                }
            }
            debug!("🛑 Tarea de finalización terminada");
        });

        player
    }

    /// Agrega un track al final de la cola y devuelve el largo nuevo.
    ///
    /// No toca el estado de reproducción: si el player está inactivo, es la
    /// capa de comandos la que dispara `play`.
    pub async fn enqueue(&self, request: TrackRequest) -> Result<usize, PlayerError> {
        let mut queue = self.queue.lock().await;
        queue.enqueue(request)
    }

    /// Arranca la reproducción de la cabeza de la cola.
    ///
    /// Devuelve `Ok(false)` sin hacer nada si la cola está vacía o el sink ya
    /// tiene un stream (sonando o pausado). Si el resolver o el sink fallan,
    /// la cola queda como estaba y el error se devuelve al llamador.
    pub async fn play(&self) -> Result<bool, PlayerError> {
        let mut queue = self.queue.lock().await;
        self.play_locked(&mut queue).await
    }

    async fn play_locked(&self, queue: &mut TrackQueue) -> Result<bool, PlayerError> {
        if queue.is_empty() || self.sink.is_playing().await || self.sink.is_paused().await {
            return Ok(false);
        }

        queue.clear_idle();
        let request = match queue.head_mut() {
            Some(head) => {
                head.mark_started();
                head.request().clone()
            }
            None => return Ok(false),
        };

        let stream = match self.resolver.resolve(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                if let Some(head) = queue.head_mut() {
                    head.mark_stopped();
                }
                return Err(PlayerError::SourceResolution {
                    title: request.title.clone(),
                    source: e,
                });
            }
        };

        if let Err(e) = self.sink.start(stream, self.events.clone()).await {
            if let Some(head) = queue.head_mut() {
                head.mark_stopped();
            }
            return Err(e.into());
        }

        info!("🎵 Reproduciendo: {}", request.title);
        Ok(true)
    }

    /// Atiende el fin de un intento de reproducción.
    ///
    /// Un error reportado por el sink se loguea y no detiene el avance. Con
    /// repetición apagada la cabeza se quita; después se intenta seguir con
    /// la siguiente entrada. Si el arranque falla se avisa al canal, se salta
    /// el track problemático y se reintenta, acotado por el límite
    /// configurado; agotado el límite se vacía la cola y se avisa.
    pub(crate) async fn handle_track_end(&self, event: TrackEndEvent) {
        let mut queue = self.queue.lock().await;

        if let Some(code) = event.error {
            warn!("⚠️ El sink reportó un error al terminar el track: {}", code);
        }

        if let Some(head) = queue.head_mut() {
            head.mark_stopped();
        }
        if !queue.loop_enabled() {
            queue.remove(0);
        }

        let mut attempts = 0u32;
        loop {
            let failure = match self.play_locked(&mut queue).await {
                Ok(_) => return,
                Err(e) => e,
            };

            let title = match &failure {
                PlayerError::SourceResolution { title, .. } => title.clone(),
                _ => queue
                    .head()
                    .map(|head| head.title().to_owned())
                    .unwrap_or_default(),
            };
            error!("❌ No se pudo reproducir `{}`: {}", title, failure);
            let _ = self
                .notifier
                .send(&format!("❌ No se pudo reproducir `{title}`."))
                .await;

            attempts += 1;
            if attempts > self.retry_limit {
                queue.clear_all();
                let _ = self
                    .notifier
                    .send("⏹️ Demasiados fallos seguidos; se vació la cola.")
                    .await;
                return;
            }

            // se salta el track problemático y se sigue con el próximo
            queue.remove(0);
        }
    }

    /// Detiene el stream activo y registra el instante del salto.
    ///
    /// El avance real lo hace el aviso de finalización, que llega de forma
    /// asíncrona: al volver de acá la cola todavía no cambió.
    pub async fn skip(&self) {
        let mut queue = self.queue.lock().await;
        self.sink.stop().await;
        queue.mark_idle();
        info!("⏭️ Salto solicitado");
    }

    /// Alterna pausa/reanudación. Devuelve `true` si quedó sonando.
    pub async fn toggle_pause(&self) -> bool {
        let mut queue = self.queue.lock().await;

        if self.sink.is_paused().await {
            self.sink.resume().await;
            if let Some(head) = queue.head_mut() {
                head.mark_started();
            }
            queue.clear_idle();
            info!("▶️ Reproducción reanudada");
            true
        } else {
            self.sink.pause().await;
            if let Some(head) = queue.head_mut() {
                head.mark_stopped();
            }
            queue.mark_idle();
            info!("⏸️ Reproducción pausada");
            false
        }
    }

    /// Quita la entrada en `index`; quitar la posición 0 no detiene el sink.
    pub async fn remove(&self, index: usize) -> Option<TrackEntry> {
        let mut queue = self.queue.lock().await;
        queue.remove(index)
    }

    /// Copia de la entrada en `index`, si existe.
    pub async fn track_at(&self, index: usize) -> Option<TrackEntry> {
        let queue = self.queue.lock().await;
        queue.get(index).cloned()
    }

    /// Descarta todo menos la entrada en reproducción.
    pub async fn clear(&self) -> usize {
        let mut queue = self.queue.lock().await;
        queue.clear_upcoming()
    }

    pub async fn toggle_loop(&self) -> bool {
        let mut queue = self.queue.lock().await;
        queue.toggle_loop()
    }

    pub async fn shuffle(&self) {
        let mut queue = self.queue.lock().await;
        queue.shuffle();
    }

    pub async fn queue_len(&self) -> usize {
        let queue = self.queue.lock().await;
        queue.len()
    }

    /// Si el player lleva inactivo más que `threshold` desde la última pausa
    /// o salto. Pensado para el reaper que desconecta sesiones abandonadas.
    pub async fn is_stale(&self, threshold: Duration) -> bool {
        let queue = self.queue.lock().await;
        queue.is_stale(threshold)
    }

    pub async fn state(&self) -> PlayerState {
        if self.sink.is_paused().await {
            PlayerState::Paused
        } else if self.sink.is_playing().await {
            PlayerState::Playing
        } else {
            PlayerState::Idle
        }
    }

    /// Resumen visual de la entrada en `index` (por defecto la que suena), o
    /// `None` si no hay nada encolado. Solo lectura.
    pub async fn describe(&self, index: usize) -> Option<CreateEmbed> {
        let queue = self.queue.lock().await;
        queue.get(index).map(embeds::now_playing)
    }

    /// Detiene el sink y vacía la cola; se usa al cerrar la sesión de voz.
    pub(crate) async fn teardown(&self) {
        self.sink.stop().await;
        let mut queue = self.queue.lock().await;
        queue.clear_all();
    }
}
