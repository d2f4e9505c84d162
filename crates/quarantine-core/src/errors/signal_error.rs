//! External signal errors. Never fatal: callers degrade to "signal unavailable".

use super::error_code::{self, QuarantineErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("{signal} signal unavailable: {message}")]
    Unavailable { signal: String, message: String },

    #[error("Malformed {signal} data: {message}")]
    Malformed { signal: String, message: String },
}

impl SignalError {
    pub fn unavailable(signal: &str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            signal: signal.to_string(),
            message: message.into(),
        }
    }
}

impl QuarantineErrorCode for SignalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => error_code::SIGNAL_UNAVAILABLE,
            Self::Malformed { .. } => error_code::SIGNAL_ERROR,
        }
    }
}
