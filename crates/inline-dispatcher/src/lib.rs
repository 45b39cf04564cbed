//! # Inline Dispatcher
//!
//! Receives correction requests from page agents, routes each one to its
//! provider adapter on a separate task and pushes the outcome back to the tab
//! that asked for it.
//!
//! ## Components
//!
//! - [`Dispatcher`] - routing, timeouts and broadcasts
//! - [`ProviderSet`] - adapters keyed by provider id
//! - [`TabHub`] - in-process push channel to page agents

mod dispatcher;
mod error;
mod hub;
mod registry;

pub use dispatcher::{BroadcastSummary, Dispatcher, STARTUP_REASON};
pub use error::DispatchError;
pub use hub::TabHub;
pub use registry::ProviderSet;
