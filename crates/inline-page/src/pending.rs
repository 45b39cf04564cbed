//! Pending-request store and id allocation.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};

use inline_protocols::{CorrectionFunction, InputId, RequestId};

use crate::dom::{ElementKey, PageElement};

/// An in-flight correction awaiting its outcome.
pub struct PendingRequest {
    /// The element may be removed by the page before resolution.
    pub element: Weak<dyn PageElement>,
    pub element_key: ElementKey,
    pub input_id: InputId,
    pub function: CorrectionFunction,
    pub original_text: String,
    pub created_at: DateTime<Utc>,
}

impl PendingRequest {
    pub fn new(
        element: &Rc<dyn PageElement>,
        input_id: InputId,
        function: CorrectionFunction,
        original_text: impl Into<String>,
    ) -> Self {
        Self {
            element: Rc::downgrade(element),
            element_key: element.key(),
            input_id,
            function,
            original_text: original_text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn element(&self) -> Option<Rc<dyn PageElement>> {
        self.element.upgrade()
    }
}

/// Outstanding requests of one page. Removal is the only terminal transition.
#[derive(Default)]
pub struct PendingStore {
    requests: HashMap<RequestId, PendingRequest>,
}

impl PendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: RequestId, request: PendingRequest) {
        self.requests.insert(id, request);
    }

    pub fn get(&self, id: &RequestId) -> Option<&PendingRequest> {
        self.requests.get(id)
    }

    pub fn remove(&mut self, id: &RequestId) -> Option<PendingRequest> {
        self.requests.remove(id)
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.requests.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn ids(&self) -> Vec<RequestId> {
        self.requests.keys().cloned().collect()
    }

    /// Elements of all pending requests that are still alive.
    pub fn live_elements(&self) -> Vec<Rc<dyn PageElement>> {
        self.requests.values().filter_map(PendingRequest::element).collect()
    }
}

/// Allocates `req-<millis>-<counter>` ids, unique for the allocator's lifetime.
#[derive(Debug, Default)]
pub struct RequestIdAllocator {
    counter: u64,
}

impl RequestIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> RequestId {
        self.counter += 1;
        RequestId::from_parts(Utc::now().timestamp_millis(), self.counter)
    }
}

/// The element's persisted [`InputId`], assigned on first use.
pub fn input_id_for(element: &dyn PageElement) -> InputId {
    if let Some(existing) = current_input_id(element) {
        return existing;
    }
    let id = InputId::generate();
    element.set_data_attribute(InputId::ATTRIBUTE, id.as_str());
    id
}

/// The element's [`InputId`] if one was ever assigned; never assigns.
pub fn current_input_id(element: &dyn PageElement) -> Option<InputId> {
    element
        .data_attribute(InputId::ATTRIBUTE)
        .filter(|id| !id.is_empty())
        .map(InputId::new)
}
