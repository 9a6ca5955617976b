use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serenity::model::id::UserId;
use songbird::input::{Input, YoutubeDl};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::SourceResolver;
use crate::audio::track::TrackRequest;

/// Resolver sobre yt-dlp: los metadatos salen de `yt-dlp -j` y el stream lo
/// arma Songbird de forma perezosa con el mismo binario.
pub struct YtDlpResolver {
    client: reqwest::Client,
}

/// Campos de interés de la salida JSON de yt-dlp.
#[derive(Debug, Deserialize)]
struct YtDlpMetadata {
    title: Option<String>,
    webpage_url: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
}

impl YtDlpResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Verifica que yt-dlp esté disponible.
    pub async fn verify_dependencies() -> Result<()> {
        let check = Command::new("yt-dlp").arg("--version").output().await;

        match check {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                info!("✅ yt-dlp versión: {}", version.trim());
                Ok(())
            }
            _ => {
                error!("❌ yt-dlp no encontrado. Instala con: pip install yt-dlp");
                anyhow::bail!("yt-dlp no disponible");
            }
        }
    }

    /// Consulta los metadatos de `query` (URL o término de búsqueda) y arma
    /// el descriptor del track para encolar.
    pub async fn probe(&self, query: &str, requested_by: UserId) -> Result<TrackRequest> {
        debug!("🔍 Consultando metadatos con yt-dlp: {}", query);

        let output = Command::new("yt-dlp")
            .args([
                "-j",
                "--no-playlist",
                "--default-search",
                "ytsearch",
                "--socket-timeout",
                "30",
                "--retries",
                "3",
                query,
            ])
            .output()
            .await
            .context("no se pudo ejecutar yt-dlp")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp falló: {}", stderr.trim());
        }

        let meta: YtDlpMetadata =
            serde_json::from_slice(&output.stdout).context("salida de yt-dlp inválida")?;

        let mut request = TrackRequest::new(
            meta.title.unwrap_or_else(|| "Desconocido".to_string()),
            meta.webpage_url.unwrap_or_else(|| query.to_string()),
            requested_by,
        );
        if let Some(thumbnail) = meta.thumbnail {
            request = request.with_thumbnail(thumbnail);
        }
        if let Some(duration) = meta.duration {
            request = request.with_duration(Duration::from_secs_f64(duration));
        }

        Ok(request)
    }

    pub fn is_youtube_url(url: &str) -> bool {
        url.contains("youtube.com") || url.contains("youtu.be") || url.contains("music.youtube.com")
    }
}

#[async_trait]
impl SourceResolver for YtDlpResolver {
    async fn resolve(&self, request: &TrackRequest) -> Result<Input> {
        debug!("🎬 Resolviendo stream con yt-dlp: {}", request.url);
        let ytdl = YoutubeDl::new(self.client.clone(), request.url.clone());
        Ok(Input::from(ytdl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_url_detection() {
        assert!(YtDlpResolver::is_youtube_url(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        ));
        assert!(YtDlpResolver::is_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(YtDlpResolver::is_youtube_url(
            "https://music.youtube.com/watch?v=test"
        ));
        assert!(!YtDlpResolver::is_youtube_url("https://example.com/video"));
    }

    #[test]
    fn metadata_parsing_tolerates_missing_fields() {
        let meta: YtDlpMetadata = serde_json::from_str(r#"{"title": "Song1"}"#).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Song1"));
        assert!(meta.webpage_url.is_none());
        assert!(meta.duration.is_none());
        assert!(meta.thumbnail.is_none());
    }
}
