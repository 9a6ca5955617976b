pub mod direct_url;
pub mod ytdlp;

use anyhow::Result;
use async_trait::async_trait;
use songbird::input::Input;

use crate::audio::track::TrackRequest;

pub use direct_url::DirectUrlResolver;
pub use ytdlp::YtDlpResolver;

/// Capacidad externa que convierte el descriptor de un track en un stream
/// reproducible.
///
/// Se invoca una vez por intento de reproducción; el `Input` resultante pasa
/// al sink, que es quien lo posee y libera.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(&self, request: &TrackRequest) -> Result<Input>;
}
