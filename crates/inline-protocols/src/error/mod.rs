//! Error types for the Inline protocol layer.

mod channel;
mod protocol;
mod provider;
mod transport;

pub use channel::*;
pub use protocol::*;
pub use provider::*;
pub use transport::*;
