use anyhow::Result;
use async_trait::async_trait;
use songbird::input::{HttpRequest, Input};
use tracing::debug;
use url::Url;

use super::SourceResolver;
use crate::audio::track::TrackRequest;

/// Resolver para URLs http(s) que apuntan directo a un archivo de audio.
pub struct DirectUrlResolver {
    client: reqwest::Client,
}

const AUDIO_EXTENSIONS: [&str; 5] = [".mp3", ".wav", ".ogg", ".flac", ".m4a"];

impl DirectUrlResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Si la URL parece un stream de audio directo.
    pub fn accepts(url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }

        let path = parsed.path().to_lowercase();
        AUDIO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }
}

#[async_trait]
impl SourceResolver for DirectUrlResolver {
    async fn resolve(&self, request: &TrackRequest) -> Result<Input> {
        let parsed = Url::parse(&request.url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("esquema no soportado: {}", parsed.scheme());
        }

        debug!("🔗 Stream directo: {}", request.url);
        let source = HttpRequest::new(self.client.clone(), request.url.clone());
        Ok(Input::from(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_audio_urls() {
        assert!(DirectUrlResolver::accepts("https://example.com/song.mp3"));
        assert!(DirectUrlResolver::accepts("http://example.com/a/b.FLAC"));
    }

    #[test]
    fn rejects_non_audio_or_non_http() {
        assert!(!DirectUrlResolver::accepts("https://example.com/page.html"));
        assert!(!DirectUrlResolver::accepts("ftp://example.com/song.mp3"));
        assert!(!DirectUrlResolver::accepts("no es una url"));
    }
}
