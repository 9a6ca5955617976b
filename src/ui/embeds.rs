use serenity::{
    all::Timestamp,
    builder::{CreateEmbed, CreateEmbedFooter},
};
use std::time::Duration;

use crate::audio::track::TrackEntry;

/// Paleta de colores estandarizada
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const MUSIC_PURPLE: Colour = Colour::from_rgb(138, 43, 226);
    pub const NEUTRAL_GRAY: Colour = Colour::from_rgb(108, 117, 125);
}

/// Footer estandarizado para todos los embeds
const STANDARD_FOOTER: &str = "🎵 queuebird";

/// Crea el embed de "reproduciendo ahora" para una entrada de la cola.
pub fn now_playing(entry: &TrackEntry) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("🎵 Reproduciendo Ahora")
        .description(seek_bar(entry.elapsed(), entry.duration()))
        .color(colors::MUSIC_PURPLE)
        .field(
            "🎼 Título",
            format!("[{}]({})", entry.title(), entry.url()),
            false,
        )
        .field("⏱️ Tiempo", format_duration(entry.elapsed()), true)
        .field(
            "👤 Solicitado por",
            format!("<@{}>", entry.requested_by()),
            true,
        );

    if let Some(thumbnail) = entry.thumbnail() {
        embed = embed.image(thumbnail.to_string());
    }

    embed
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Barra de progreso textual con el tiempo transcurrido.
///
/// Sin duración conocida (streams en vivo) solo muestra el transcurrido.
pub fn seek_bar(elapsed: Duration, total: Option<Duration>) -> String {
    const SLOTS: usize = 12;

    match total {
        Some(total) if !total.is_zero() => {
            let ratio = (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0);
            let knob = ((SLOTS - 1) as f64 * ratio).round() as usize;
            let mut bar = String::new();
            for slot in 0..SLOTS {
                bar.push_str(if slot == knob { "🔘" } else { "▬" });
            }
            format!(
                "{} `{} / {}`",
                bar,
                format_duration(elapsed),
                format_duration(total)
            )
        }
        _ => format!("`{}` 🔴 En vivo", format_duration(elapsed)),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn durations_format_as_clock_time() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(format_duration(Duration::from_secs(65)), "1:05");
        assert_eq!(format_duration(Duration::from_secs(3700)), "1:01:40");
    }

    #[test]
    fn seek_bar_places_the_knob_proportionally() {
        let start = seek_bar(Duration::ZERO, Some(Duration::from_secs(100)));
        assert!(start.starts_with("🔘"));

        let end = seek_bar(Duration::from_secs(100), Some(Duration::from_secs(100)));
        assert!(end.contains("▬🔘 "));
        assert!(end.ends_with("`1:40 / 1:40`"));
    }

    #[test]
    fn seek_bar_clamps_past_the_end() {
        let over = seek_bar(Duration::from_secs(200), Some(Duration::from_secs(100)));
        assert!(over.contains("🔘"));
    }

    #[test]
    fn live_streams_show_elapsed_only() {
        let live = seek_bar(Duration::from_secs(61), None);
        assert_eq!(live, "`1:01` 🔴 En vivo");
    }
}
