use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::audio::queue::DEFAULT_MAX_QUEUE;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Tamaño máximo de la cola por guild.
    pub max_queue_size: usize,

    /// Segundos de inactividad (pausa/salto sin reanudar) antes de que el
    /// reaper desarme la sesión.
    pub stale_after_secs: u64,

    /// Reintentos de avance tras un fallo de reproducción antes de vaciar la
    /// cola y darse por vencido.
    pub play_retry_limit: u32,

    /// Cada cuántos segundos el reaper recorre los players.
    pub reaper_interval_secs: u64,

    /// Volumen inicial del sink (0.0 a 2.0).
    pub default_volume: f32,
}

impl PlayerConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            max_queue_size: std::env::var("MAX_QUEUE_SIZE")
                .unwrap_or_else(|_| DEFAULT_MAX_QUEUE.to_string())
                .parse()?,
            stale_after_secs: std::env::var("STALE_AFTER_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            play_retry_limit: std::env::var("PLAY_RETRY_LIMIT")
                .unwrap_or_else(|_| "2".to_string())
                .parse()?,
            reaper_interval_secs: std::env::var("REAPER_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            default_volume: std::env::var("DEFAULT_VOLUME")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_queue_size == 0 {
            anyhow::bail!("Max queue size must be greater than 0");
        }

        if self.stale_after_secs == 0 {
            anyhow::bail!("Stale timeout must be greater than 0");
        }

        if self.reaper_interval_secs == 0 {
            anyhow::bail!("Reaper interval must be greater than 0");
        }

        if self.default_volume < 0.0 || self.default_volume > 2.0 {
            anyhow::bail!(
                "Default volume must be between 0.0 and 2.0, got: {}",
                self.default_volume
            );
        }

        Ok(())
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs)
    }

    /// Resumen apto para loguear al arrancar.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Queue: {} max, {} retries on failure\n  \
            Idle: stale after {}s, reaper every {}s\n  \
            Audio: {}% vol",
            self.max_queue_size,
            self.play_retry_limit,
            self.stale_after_secs,
            self.reaper_interval_secs,
            (self.default_volume * 100.0) as u32,
        )
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_queue_size: DEFAULT_MAX_QUEUE,
            stale_after_secs: 300,
            play_retry_limit: 2,
            reaper_interval_secs: 60,
            default_volume: 0.5,
        }
    }
}
