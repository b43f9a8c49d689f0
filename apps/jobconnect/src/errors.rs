use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Every collaborator (steps, lookups, summaries, the input channel) reports through it;
/// the sequencer decides which of these end a session and which degrade to a fallback.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Step error: {0}")]
    Step(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short, user-facing diagnostic. Transport details stay in the logs.
    pub fn diagnostic(&self) -> String {
        match self {
            AppError::Config(msg) | AppError::Input(msg) | AppError::Step(msg) => msg.clone(),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                "A language-model call failed".to_string()
            }
            AppError::Lookup(msg) => {
                tracing::error!("Lookup error: {msg}");
                "A reference lookup failed".to_string()
            }
            AppError::Io(e) => format!("I/O failure: {e}"),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_diagnostic_is_message_verbatim() {
        let err = AppError::Step("resume missing".to_string());
        assert_eq!(err.diagnostic(), "resume missing");
    }

    #[test]
    fn test_llm_diagnostic_hides_transport_detail() {
        let err = AppError::Llm(LlmError::EmptyContent);
        assert_eq!(err.diagnostic(), "A language-model call failed");
    }

    #[test]
    fn test_io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
