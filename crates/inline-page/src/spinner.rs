//! In-flight indicator attached to a target element.

use std::collections::HashMap;

use tracing::debug;

use crate::dom::{ElementKey, OverlayId, PageDocument, PageElement};

pub const STYLE_ID: &str = "inline-spinner-styles";
pub const CONTAINER_CLASS: &str = "inline-spinner-container";
pub const POSITIONED_CLASS: &str = "inline-input-with-spinner";

const SPINNER_CSS: &str = r#"
.inline-spinner-container {
  position: absolute;
  top: 8px;
  right: 8px;
  z-index: 10000;
  pointer-events: none;
}

.inline-spinner {
  width: 20px;
  height: 20px;
  border: 3px solid rgba(0, 0, 0, 0.1);
  border-top-color: #007bff;
  border-radius: 50%;
  animation: inline-spin 0.8s linear infinite;
}

@keyframes inline-spin {
  to { transform: rotate(360deg); }
}

.inline-input-with-spinner {
  position: relative;
}
"#;

#[derive(Debug)]
struct SpinnerHandle {
    overlay: OverlayId,
    /// Inline `position` before we forced `relative`, when we did.
    position_override: Option<Option<String>>,
    /// `POSITIONED_CLASS` was absent before `show`.
    added_class: bool,
}

/// One spinner per element, keyed by [`ElementKey`].
#[derive(Debug, Default)]
pub struct SpinnerManager {
    handles: HashMap<ElementKey, SpinnerHandle>,
}

impl SpinnerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a spinner, replacing any existing one on the same element.
    pub fn show(&mut self, document: &dyn PageDocument, element: &dyn PageElement) {
        self.hide(element);

        if !document.has_stylesheet(STYLE_ID) {
            document.insert_stylesheet(STYLE_ID, SPINNER_CSS);
        }

        let mut added_class = false;
        let position_override = if element.computed_position() == "static" {
            let previous = element.inline_position();
            if !element.has_class(POSITIONED_CLASS) {
                element.add_class(POSITIONED_CLASS);
                added_class = true;
            }
            element.set_inline_position(Some("relative"));
            Some(previous)
        } else {
            None
        };

        let overlay = element.append_overlay(CONTAINER_CLASS);
        self.handles.insert(
            element.key(),
            SpinnerHandle {
                overlay,
                position_override,
                added_class,
            },
        );
    }

    /// Remove the spinner and revert our positioning override. No-op when
    /// nothing is shown.
    pub fn hide(&mut self, element: &dyn PageElement) -> bool {
        let Some(handle) = self.handles.remove(&element.key()) else {
            return false;
        };

        element.remove_overlay(handle.overlay);
        if handle.added_class {
            element.remove_class(POSITIONED_CLASS);
        }
        if let Some(previous) = handle.position_override {
            if element.inline_position().as_deref() == Some("relative") {
                element.set_inline_position(previous.as_deref());
            }
        }
        true
    }

    /// Drop the handle of an element that no longer exists.
    pub fn forget(&mut self, key: ElementKey) {
        if self.handles.remove(&key).is_some() {
            debug!(element = key.0, "Dropped spinner of a collected element");
        }
    }

    pub fn is_showing(&self, key: ElementKey) -> bool {
        self.handles.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
