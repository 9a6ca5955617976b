use thiserror::Error;

/// Errores que el motor de reproducción devuelve a la capa de comandos.
///
/// Los errores de capacidad y de rechazo del sink son sincrónicos y nunca
/// mutan la cola. Los fallos de resolución durante el avance automático se
/// manejan internamente y solo se reportan por el canal de avisos.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// La cola alcanzó su tamaño máximo; la canción no fue agregada.
    #[error("la cola está llena (máximo {max} canciones)")]
    QueueFull { max: usize },

    /// El cliente de voz rechazó iniciar la reproducción.
    #[error("el cliente de voz rechazó la reproducción: {0}")]
    SinkRejected(String),

    /// La fuente no pudo producir un stream reproducible para el track.
    #[error("no se pudo resolver la fuente de `{title}`")]
    SourceResolution {
        title: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Fallo sincrónico del sink de voz al iniciar un stream.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("reproducción rechazada: {0}")]
    Rejected(String),
}

impl From<SinkError> for PlayerError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Rejected(detail) => PlayerError::SinkRejected(detail),
        }
    }
}
