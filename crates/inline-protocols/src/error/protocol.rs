//! Errors raised while interpreting protocol values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown correction function: {0}")]
    UnknownFunction(String),

    #[error("Invalid chord {chord}: {reason}")]
    InvalidChord { chord: String, reason: String },
}
