use rand::seq::SliceRandom;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::audio::track::{TrackEntry, TrackRequest};
use crate::error::PlayerError;

/// Capacidad por defecto de la cola de un guild.
pub const DEFAULT_MAX_QUEUE: usize = 800;

/// Cola ordenada de tracks de un guild.
///
/// Estado puro, sin I/O: el dueño (el player del guild) la muta siempre
/// dentro de su sección crítica. La entrada en la posición 0 es la única que
/// puede estar reproduciéndose o arrancando.
#[derive(Debug)]
pub struct TrackQueue {
    entries: Vec<TrackEntry>,
    len: usize,
    loop_enabled: bool,
    idle_since: Option<Instant>,
    max_size: usize,
    next_id: u64,
}

impl TrackQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
            loop_enabled: false,
            idle_since: None,
            max_size,
            next_id: 0,
        }
    }

    /// Agrega un track al final de la cola.
    ///
    /// Devuelve el largo nuevo, o `QueueFull` sin modificar nada si la cola
    /// ya está en su capacidad máxima.
    pub fn enqueue(&mut self, request: TrackRequest) -> Result<usize, PlayerError> {
        if self.len == self.max_size {
            return Err(PlayerError::QueueFull { max: self.max_size });
        }

        let id = self.next_id;
        self.next_id += 1;
        info!("➕ Agregado a la cola: {}", request.title);
        self.entries.push(TrackEntry::new(id, request));
        self.len += 1;
        debug_assert_eq!(self.len, self.entries.len());

        Ok(self.len)
    }

    /// Quita la entrada en `index`. Quitar la posición 0 no detiene la
    /// reproducción; eso es responsabilidad de `skip`.
    pub fn remove(&mut self, index: usize) -> Option<TrackEntry> {
        if index >= self.entries.len() {
            return None;
        }

        let entry = self.entries.remove(index);
        self.len -= 1;
        debug_assert_eq!(self.len, self.entries.len());
        debug!("❌ Track eliminado en posición {}: {}", index, entry.title());
        Some(entry)
    }

    /// Quita una entrada por identidad.
    pub fn remove_by_id(&mut self, id: u64) -> Option<TrackEntry> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        self.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&TrackEntry> {
        self.entries.get(index)
    }

    pub fn head(&self) -> Option<&TrackEntry> {
        self.entries.first()
    }

    pub(crate) fn head_mut(&mut self) -> Option<&mut TrackEntry> {
        self.entries.first_mut()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Descarta todo menos la entrada en reproducción.
    pub fn clear_upcoming(&mut self) -> usize {
        let removed = self.len.saturating_sub(1);
        self.entries.truncate(1);
        self.len = self.entries.len();
        info!("🗑️ Cola limpiada: {} tracks removidos", removed);
        removed
    }

    /// Vacía la cola por completo. Reservado para el abandono terminal tras
    /// fallos repetidos y para el teardown de la sesión.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.len;
        self.entries.clear();
        self.len = 0;
        removed
    }

    pub fn toggle_loop(&mut self) -> bool {
        self.loop_enabled = !self.loop_enabled;
        if self.loop_enabled {
            info!("🔂 Repetición activada");
        } else {
            info!("➡️ Repetición desactivada");
        }
        self.loop_enabled
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Mezcla las posiciones 1..fin; la posición 0 queda fija por ser la que
    /// está sonando.
    pub fn shuffle(&mut self) {
        if self.len > 1 {
            let mut rng = rand::thread_rng();
            self.entries[1..].shuffle(&mut rng);
            info!("🔀 Cola mezclada");
        }
    }

    /// Registra el instante de una pausa o un salto.
    pub(crate) fn mark_idle(&mut self) {
        self.idle_since = Some(Instant::now());
    }

    pub(crate) fn clear_idle(&mut self) {
        self.idle_since = None;
    }

    /// Si la cola lleva inactiva (pausada/salteada sin volver a reproducir)
    /// más que `threshold`. Sin marca de inactividad devuelve `false` sin
    /// importar cuánto tiempo haya pasado.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        match self.idle_since {
            None => false,
            Some(since) => since.elapsed() > threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serenity::model::id::UserId;
    use std::collections::BTreeSet;

    fn request(title: &str) -> TrackRequest {
        TrackRequest::new(title, format!("https://example.com/{title}"), UserId::new(7))
    }

    fn filled(n: usize, max: usize) -> TrackQueue {
        let mut queue = TrackQueue::new(max);
        for i in 0..n {
            queue.enqueue(request(&format!("t{i}"))).unwrap();
        }
        queue
    }

    #[test]
    fn length_tracks_every_enqueue() {
        let mut queue = TrackQueue::new(DEFAULT_MAX_QUEUE);
        for i in 0..DEFAULT_MAX_QUEUE {
            assert_eq!(queue.enqueue(request("x")).unwrap(), i + 1);
        }
        assert_eq!(queue.len(), DEFAULT_MAX_QUEUE);
    }

    #[test]
    fn enqueue_past_capacity_fails_and_leaves_queue_intact() {
        let mut queue = filled(3, 3);
        let err = queue.enqueue(request("extra")).unwrap_err();
        assert!(matches!(err, PlayerError::QueueFull { max: 3 }));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.get(2).unwrap().title(), "t2");
    }

    #[test]
    fn shuffle_pins_head_and_preserves_the_rest() {
        let mut queue = filled(20, 50);
        let head_id = queue.head().unwrap().id();
        let tail_ids: BTreeSet<u64> = (1..20).map(|i| queue.get(i).unwrap().id()).collect();

        queue.shuffle();

        assert_eq!(queue.head().unwrap().id(), head_id);
        let shuffled_ids: BTreeSet<u64> = (1..20).map(|i| queue.get(i).unwrap().id()).collect();
        assert_eq!(shuffled_ids, tail_ids);
        assert_eq!(queue.len(), 20);
    }

    #[test]
    fn shuffle_on_single_entry_is_a_noop() {
        let mut queue = filled(1, 5);
        queue.shuffle();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn clear_upcoming_keeps_exactly_the_head() {
        let mut queue = filled(5, 10);
        let head_id = queue.head().unwrap().id();

        assert_eq!(queue.clear_upcoming(), 4);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.head().unwrap().id(), head_id);
    }

    #[test]
    fn loop_flag_parity_under_repeated_toggles() {
        let mut queue = TrackQueue::new(5);
        assert!(!queue.loop_enabled());
        for i in 1..=7 {
            let enabled = queue.toggle_loop();
            assert_eq!(enabled, i % 2 == 1);
        }
        assert!(queue.loop_enabled());
    }

    #[test]
    fn remove_head_of_single_entry_queue_empties_it() {
        let mut queue = filled(1, 5);
        assert!(queue.remove(0).is_some());
        assert_eq!(queue.len(), 0);
        assert!(queue.head().is_none());
    }

    #[test]
    fn remove_out_of_range_returns_none() {
        let mut queue = filled(2, 5);
        assert!(queue.remove(5).is_none());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn remove_by_id_targets_the_right_entry() {
        let mut queue = filled(3, 5);
        let middle = queue.get(1).unwrap().id();
        let removed = queue.remove_by_id(middle).unwrap();
        assert_eq!(removed.id(), middle);
        assert_eq!(queue.len(), 2);
        assert!(queue.remove_by_id(middle).is_none());
    }

    #[test]
    fn stale_requires_an_idle_mark() {
        let mut queue = filled(1, 5);
        assert!(!queue.is_stale(Duration::ZERO));

        queue.mark_idle();
        // checked_sub: en un reloj monotónico recién arrancado no se puede
        // retroceder 301 s
        if let Some(past) = Instant::now().checked_sub(Duration::from_secs(301)) {
            queue.idle_since = Some(past);
            assert!(queue.is_stale(Duration::from_secs(300)));
            assert!(!queue.is_stale(Duration::from_secs(600)));
        }

        queue.clear_idle();
        assert!(!queue.is_stale(Duration::ZERO));
    }
}
