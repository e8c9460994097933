use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
    #[error("Fuente de vídeo no disponible: {0}")]
    SourceUnavailable(String),
    #[error("Error leyendo frame: {0}")]
    ReadFailed(String),
    #[error("Error enviando notificación: {0}")]
    DispatchFailed(String),
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_context() {
        assert_eq!(
            DomainError::InvalidInput("camera_url vacío".into()).to_string(),
            "Entrada inválida: camera_url vacío"
        );
        assert_eq!(
            DomainError::SourceUnavailable("rtsp://barn/cam".into()).to_string(),
            "Fuente de vídeo no disponible: rtsp://barn/cam"
        );
    }
}
