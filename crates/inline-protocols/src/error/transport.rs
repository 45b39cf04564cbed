//! Page-side transport errors.

use thiserror::Error;

/// Failure of the page -> dispatcher send path.
///
/// Only genuine delivery failures are represented here. A dispatcher that
/// declines a request answers with
/// [`DispatchAck::Rejected`](crate::message::DispatchAck::Rejected) instead.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("No dispatcher is listening")]
    NoReceiver,
}
