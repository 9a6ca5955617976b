use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use std::time::{Duration, Instant};

/// Descriptor de una canción solicitada, tal como lo arma la capa de comandos.
#[derive(Debug, Clone)]
pub struct TrackRequest {
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub duration: Option<Duration>,
    pub requested_by: UserId,
    pub requested_at: DateTime<Utc>,
}

impl TrackRequest {
    pub fn new(title: impl Into<String>, url: impl Into<String>, requested_by: UserId) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            thumbnail: None,
            duration: None,
            requested_by,
            requested_at: Utc::now(),
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Una entrada de la cola de un guild.
///
/// Lleva la contabilidad de reproducción del track: el tiempo acumulado y el
/// instante en que arrancó el segmento en curso. El stream reproducible nunca
/// vive acá; lo produce el resolver una vez por intento y lo posee el sink
/// hasta que lo libera.
#[derive(Debug, Clone)]
pub struct TrackEntry {
    id: u64,
    request: TrackRequest,
    accumulated: Duration,
    playing_since: Option<Instant>,
}

impl TrackEntry {
    pub(crate) fn new(id: u64, request: TrackRequest) -> Self {
        Self {
            id,
            request,
            accumulated: Duration::ZERO,
            playing_since: None,
        }
    }

    /// Identidad local a la cola, asignada al encolar.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn request(&self) -> &TrackRequest {
        &self.request
    }

    pub fn title(&self) -> &str {
        &self.request.title
    }

    pub fn url(&self) -> &str {
        &self.request.url
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.request.thumbnail.as_deref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.request.duration
    }

    pub fn requested_by(&self) -> UserId {
        self.request.requested_by
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.request.requested_at
    }

    /// Marca el comienzo de un segmento de reproducción. Idempotente.
    pub(crate) fn mark_started(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    /// Cierra el segmento en curso y acumula su duración. Idempotente.
    pub(crate) fn mark_stopped(&mut self) {
        if let Some(since) = self.playing_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    /// Tiempo total reproducido, incluyendo el segmento en curso.
    pub fn elapsed(&self) -> Duration {
        let running = self
            .playing_since
            .map(|since| since.elapsed())
            .unwrap_or_default();
        self.accumulated + running
    }
}
