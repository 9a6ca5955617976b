use anyhow::Result;
use async_trait::async_trait;
use serenity::{builder::CreateMessage, http::Http, model::id::ChannelId};
use std::sync::Arc;
use tracing::debug;

/// Canal de avisos hacia los usuarios del guild.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Neutraliza los disparadores de mención para que un título malicioso nunca
/// genere un ping.
pub fn sanitize_mentions(text: &str) -> String {
    text.replace('@', "＠")
}

/// Notifier de producción: publica en un canal de texto vía la API HTTP.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        debug!("💬 Aviso al canal {}: {}", self.channel_id, text);
        self.channel_id
            .send_message(
                &self.http,
                CreateMessage::new().content(sanitize_mentions(text)),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mention_triggers_are_escaped() {
        assert_eq!(sanitize_mentions("hola @everyone"), "hola ＠everyone");
        assert_eq!(
            sanitize_mentions("@here y @usuario"),
            "＠here y ＠usuario"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_mentions("sin menciones"), "sin menciones");
    }
}
