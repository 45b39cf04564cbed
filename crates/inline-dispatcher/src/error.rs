//! Dispatcher errors.

use thiserror::Error;

use inline_protocols::ProviderId;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Provider already registered: {0}")]
    AlreadyRegistered(ProviderId),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}
