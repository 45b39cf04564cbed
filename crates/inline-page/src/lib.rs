//! # Inline Page Agent
//!
//! Runs once per document. Detects the configured shortcuts on the focused
//! text field, sends a correction request to the dispatcher, shows a spinner
//! while it is in flight and applies the pushed result to the element that
//! asked for it.
//!
//! The host document is reached only through [`PageDocument`] and
//! [`PageElement`]; [`MemoryDocument`] implements them without a browser.

pub mod detector;
pub mod dom;
pub mod link;
pub mod memory_dom;
pub mod pending;
pub mod session;
pub mod spinner;

pub use detector::{Detection, KeyEvent, NoOpReason};
pub use dom::{ElementKey, OverlayId, PageDocument, PageElement};
pub use link::{DispatcherLink, EndpointLink};
pub use memory_dom::{MemoryDocument, MemoryElement};
pub use pending::{PendingRequest, PendingStore, RequestIdAllocator};
pub use session::{CorrelationError, KeyDisposition, PageSession, SubmitOutcome};
pub use spinner::SpinnerManager;
