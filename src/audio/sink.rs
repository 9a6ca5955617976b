use async_trait::async_trait;
use songbird::{
    input::Input,
    tracks::{PlayMode, TrackHandle},
    Call, Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::error::SinkError;

/// Aviso de que un intento de reproducción terminó.
///
/// El sink lo entrega exactamente una vez por intento, sea por fin natural,
/// por `stop` o por error del driver. `error` trae el detalle cuando el
/// driver reportó un fallo; no es fatal para la cola.
#[derive(Debug, Clone)]
pub struct TrackEndEvent {
    pub error: Option<String>,
}

/// Capacidad externa que saca un único stream activo por el canal de voz.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceSink: Send + Sync {
    /// Empieza a reproducir `stream` y registra la entrega de un
    /// [`TrackEndEvent`] por `events` cuando el intento termine. Puede fallar
    /// sincrónicamente si el cliente de voz no está en condiciones.
    async fn start(
        &self,
        stream: Input,
        events: UnboundedSender<TrackEndEvent>,
    ) -> Result<(), SinkError>;

    /// Detiene el stream activo; el aviso de finalización llega igual, de
    /// forma asíncrona.
    async fn stop(&self);

    async fn pause(&self);

    async fn resume(&self);

    async fn is_playing(&self) -> bool;

    async fn is_paused(&self) -> bool;
}

/// Sink de producción sobre un [`songbird::Call`].
///
/// Guarda el `TrackHandle` vivo del intento en curso; ese handle es el único
/// dueño del stream y se suelta a lo sumo una vez.
pub struct SongbirdSink {
    call: Arc<tokio::sync::Mutex<Call>>,
    current: parking_lot::Mutex<Option<TrackHandle>>,
    volume: f32,
}

impl SongbirdSink {
    pub fn new(call: Arc<tokio::sync::Mutex<Call>>, volume: f32) -> Self {
        Self {
            call,
            current: parking_lot::Mutex::new(None),
            volume,
        }
    }

    async fn play_mode(&self) -> Option<PlayMode> {
        let handle = self.current.lock().clone()?;
        handle.get_info().await.ok().map(|info| info.playing)
    }
}

#[async_trait]
impl VoiceSink for SongbirdSink {
    async fn start(
        &self,
        stream: Input,
        events: UnboundedSender<TrackEndEvent>,
    ) -> Result<(), SinkError> {
        let mut call = self.call.lock().await;
        let handle = call.play_input(stream);
        let _ = handle.set_volume(self.volume);

        // Un solo aviso por intento, aunque End y Error disparen ambos o
        // un stop natural corra contra el fin del stream.
        let fired = Arc::new(AtomicBool::new(false));

        let end = handle.add_event(
            Event::Track(TrackEvent::End),
            TrackEndNotifier {
                events: events.clone(),
                fired: fired.clone(),
            },
        );
        let error = handle.add_event(
            Event::Track(TrackEvent::Error),
            TrackErrorNotifier { events, fired },
        );

        if let Err(e) = end.and(error) {
            let _ = handle.stop();
            return Err(SinkError::Rejected(e.to_string()));
        }

        *self.current.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self) {
        // se toma el handle una sola vez; la finalización llega por eventos
        if let Some(handle) = self.current.lock().take() {
            let _ = handle.stop();
        }
    }

    async fn pause(&self) {
        if let Some(handle) = self.current.lock().clone() {
            let _ = handle.pause();
        }
    }

    async fn resume(&self) {
        if let Some(handle) = self.current.lock().clone() {
            let _ = handle.play();
        }
    }

    async fn is_playing(&self) -> bool {
        matches!(self.play_mode().await, Some(PlayMode::Play))
    }

    async fn is_paused(&self) -> bool {
        matches!(self.play_mode().await, Some(PlayMode::Pause))
    }
}

/// Entrega el aviso de finalización a lo sumo una vez por intento.
fn deliver_once(
    events: &UnboundedSender<TrackEndEvent>,
    fired: &AtomicBool,
    error: Option<String>,
) {
    if !fired.swap(true, Ordering::SeqCst) {
        let _ = events.send(TrackEndEvent { error });
    }
}

/// Handler de fin natural (o por stop) de un track.
struct TrackEndNotifier {
    events: UnboundedSender<TrackEndEvent>,
    fired: Arc<AtomicBool>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        debug!("🎵 Track terminado, avisando al player");
        deliver_once(&self.events, &self.fired, None);
        None
    }
}

/// Handler de errores del driver durante la reproducción.
struct TrackErrorNotifier {
    events: UnboundedSender<TrackEndEvent>,
    fired: Arc<AtomicBool>,
}

#[async_trait]
impl VoiceEventHandler for TrackErrorNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let mut detail = String::from("error de reproducción desconocido");
        if let EventContext::Track(track_list) = ctx {
            for (state, _handle) in *track_list {
                detail = format!("{:?}", state.playing);
            }
        }

        deliver_once(&self.events, &self.fired, Some(detail));
        None
    }
}
