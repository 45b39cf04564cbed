//! # Inline Protocols
//!
//! Shared definitions for the Inline page agent and dispatcher.
//! Contains only data types and interface definitions - no I/O.
//!
//! ## Core Traits
//!
//! - [`ProviderAdapter`] - Translator between a correction request and one vendor API
//! - [`TabOutbox`] - Asynchronous push-back channel towards page agents
//! - [`DispatchEndpoint`] - Synchronous entry point of the dispatcher

pub mod channel;
pub mod chord;
pub mod error;
pub mod function;
pub mod ids;
pub mod message;
pub mod provider;

pub use channel::{DispatchEndpoint, TabId, TabOutbox};
pub use chord::{Chord, MODIFIER_KEYS};
pub use error::{ChannelError, ProtocolError, ProviderError, TransportError};
pub use function::CorrectionFunction;
pub use ids::{InputId, RequestId};
pub use message::{
    CorrectTextRequest, DispatchAck, DispatcherMessage, ElementInfo, PageMessage, SettingsStatus,
};
pub use provider::{GenerationParams, ProviderAdapter, ProviderId, ProviderRequest};
