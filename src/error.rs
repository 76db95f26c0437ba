use thiserror::Error;

/// Errores de las capas con I/O (vault, borrador, materialización, servidor).
/// Los motores de warnings y desbloqueo nunca fallan.
#[derive(Debug, Error)]
pub enum MallaError {
    #[error("error de E/S en {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML inválido: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("term_id inválido: {0}")]
    InvalidTerm(String),

    /// Error de validación de datos ingresados por el usuario (mensaje visible).
    #[error("{0}")]
    Validation(String),
}

impl MallaError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        MallaError::Io { path: path.as_ref().display().to_string(), source }
    }

    /// Los errores de validación/parseo son culpa del cliente (HTTP 400).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MallaError::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, MallaError>;
