use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrismError>;

/// Errors raised inside the extensions.
///
/// Block handlers never hand these to the host: every failure is turned into the
/// block's neutral result at the handler boundary. The dispatcher only surfaces
/// [`PrismError::UnknownOpcode`] and registration errors.
#[derive(Debug, Error)]
pub enum PrismError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown opcode \"{0}\"")]
    UnknownOpcode(String),

    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid mime type: \"{0}\"")]
    UnsupportedMime(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Codec error: {0}")]
    Codec(String),
}

impl From<reqwest::Error> for PrismError {
    fn from(e: reqwest::Error) -> Self {
        PrismError::Fetch(e.to_string())
    }
}
