use thiserror::Error;

/// Generic message used when the backend fails without saying why
pub const EXTRACTION_FALLBACK_MESSAGE: &str = "Erro na extração";

/// Message shown to the user when the request never reached the backend
pub const CONNECTION_FALLBACK_MESSAGE: &str = "Erro ao conectar com o servidor";

/// Centralized error type for the extraction crate
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Backend { status: Option<u16>, message: String },

    #[error("JSON (de)serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("CNES inválido: '{0}' (esperado 7 dígitos)")]
    InvalidCnes(String),

    #[error("Competência inválida: '{0}' (esperado YYYYMM)")]
    InvalidCompetencia(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("An extraction is already running")]
    RunInProgress,
}

impl ExtractionError {
    /// Builds a backend-reported failure, falling back to the generic message
    pub fn backend(status: Option<u16>, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| EXTRACTION_FALLBACK_MESSAGE.to_string());
        ExtractionError::Backend { status, message }
    }

    /// True when the request never completed (DNS, refused connection, reset...)
    pub fn is_transport(&self) -> bool {
        matches!(self, ExtractionError::Transport(_))
    }

    /// True when the backend rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ExtractionError::Backend { status: Some(401), .. })
    }

    /// Text shown to the user as the run's summary message
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::Transport(_) => CONNECTION_FALLBACK_MESSAGE.to_string(),
            ExtractionError::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Alias for fallible operations in the extraction crate
pub type ExtractionResult<T> = Result<T, ExtractionError>;
