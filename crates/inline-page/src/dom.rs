//! Host document abstraction.
//!
//! The page agent never touches a concrete DOM. A browser binding, or the
//! in-memory document used by the CLI and tests, implements these traits.

use std::rc::Rc;

use inline_protocols::ElementInfo;

/// Identity of an element for the lifetime of its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u64);

/// Handle to an overlay node appended to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

pub trait PageElement {
    fn key(&self) -> ElementKey;

    /// Upper-case tag name, as the DOM reports it.
    fn tag_name(&self) -> String;

    /// Lower-cased `type` attribute, for `input` elements.
    fn input_type(&self) -> Option<String>;

    fn id(&self) -> Option<String>;

    fn class_name(&self) -> Option<String>;

    fn is_content_editable(&self) -> bool;

    /// False once the element has been removed from its document.
    fn is_connected(&self) -> bool;

    /// `innerText` for content-editable elements, `value` otherwise.
    fn text(&self) -> String;

    /// Replace the text and fire a bubbling `input` event.
    fn set_text(&self, text: &str);

    /// `data-*` attribute, `name` given without the prefix.
    fn data_attribute(&self, name: &str) -> Option<String>;

    fn set_data_attribute(&self, name: &str, value: &str);

    /// Computed CSS `position`.
    fn computed_position(&self) -> String;

    /// Inline `style.position`, if set.
    fn inline_position(&self) -> Option<String>;

    fn set_inline_position(&self, value: Option<&str>);

    fn has_class(&self, class: &str) -> bool;

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    /// Append a child overlay with the given class.
    fn append_overlay(&self, class: &str) -> OverlayId;

    /// Remove an overlay; returns false if it was already gone.
    fn remove_overlay(&self, overlay: OverlayId) -> bool;

    fn info(&self) -> ElementInfo {
        ElementInfo {
            tag_name: self.tag_name(),
            input_type: self.input_type(),
            id: self.id(),
            class_name: self.class_name(),
            is_content_editable: self.is_content_editable(),
        }
    }
}

pub trait PageDocument {
    fn url(&self) -> String;

    fn active_element(&self) -> Option<Rc<dyn PageElement>>;

    fn has_stylesheet(&self, id: &str) -> bool;

    fn insert_stylesheet(&self, id: &str, css: &str);
}
