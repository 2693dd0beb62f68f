use thiserror::Error;

/// Centralized error type for the shared crate
#[derive(Error, Debug)]
pub enum SharedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON (de)serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Município não encontrado no registro de parâmetros: {0}")]
    MunicipalityNotFound(String),

    #[error("Registro de parâmetros inválido: {0}")]
    InvalidRegistry(String),
}

/// Alias for fallible operations in the shared crate
pub type SharedResult<T> = Result<T, SharedError>;
