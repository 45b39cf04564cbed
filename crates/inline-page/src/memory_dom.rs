//! Headless in-memory document.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::{ElementKey, OverlayId, PageDocument, PageElement};

#[derive(Debug, Default)]
struct ElementState {
    input_type: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    content_editable: bool,
    text: String,
    data: BTreeMap<String, String>,
    stylesheet_position: String,
    inline_position: Option<String>,
    overlays: Vec<(OverlayId, String)>,
}

/// Element of a [`MemoryDocument`].
#[derive(Debug)]
pub struct MemoryElement {
    key: ElementKey,
    tag_name: String,
    connected: Cell<bool>,
    input_events: Cell<usize>,
    next_overlay: Cell<u64>,
    state: RefCell<ElementState>,
}

impl MemoryElement {
    fn new(key: ElementKey, tag_name: &str) -> Self {
        Self {
            key,
            tag_name: tag_name.to_uppercase(),
            connected: Cell::new(true),
            input_events: Cell::new(0),
            next_overlay: Cell::new(0),
            state: RefCell::new(ElementState {
                stylesheet_position: "static".to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn set_input_type(&self, input_type: &str) {
        self.state.borrow_mut().input_type = Some(input_type.to_lowercase());
    }

    pub fn set_id(&self, id: &str) {
        self.state.borrow_mut().id = Some(id.to_string());
    }

    pub fn set_content_editable(&self, editable: bool) {
        self.state.borrow_mut().content_editable = editable;
    }

    /// Position the page's own stylesheets give the element.
    pub fn set_stylesheet_position(&self, position: &str) {
        self.state.borrow_mut().stylesheet_position = position.to_string();
    }

    /// Simulate the user typing: changes the text without an `input` event.
    pub fn type_text(&self, text: &str) {
        self.state.borrow_mut().text = text.to_string();
    }

    /// Number of `input` events fired by [`PageElement::set_text`].
    pub fn input_events(&self) -> usize {
        self.input_events.get()
    }

    /// Classes of the overlays currently attached.
    pub fn overlays(&self) -> Vec<String> {
        self.state
            .borrow()
            .overlays
            .iter()
            .map(|(_, class)| class.clone())
            .collect()
    }
}

impl PageElement for MemoryElement {
    fn key(&self) -> ElementKey {
        self.key
    }

    fn tag_name(&self) -> String {
        self.tag_name.clone()
    }

    fn input_type(&self) -> Option<String> {
        self.state.borrow().input_type.clone()
    }

    fn id(&self) -> Option<String> {
        self.state.borrow().id.clone()
    }

    fn class_name(&self) -> Option<String> {
        let state = self.state.borrow();
        if state.classes.is_empty() {
            None
        } else {
            Some(state.classes.join(" "))
        }
    }

    fn is_content_editable(&self) -> bool {
        self.state.borrow().content_editable
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn text(&self) -> String {
        self.state.borrow().text.clone()
    }

    fn set_text(&self, text: &str) {
        self.state.borrow_mut().text = text.to_string();
        self.input_events.set(self.input_events.get() + 1);
    }

    fn data_attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().data.get(name).cloned()
    }

    fn set_data_attribute(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .data
            .insert(name.to_string(), value.to_string());
    }

    fn computed_position(&self) -> String {
        let state = self.state.borrow();
        state
            .inline_position
            .clone()
            .unwrap_or_else(|| state.stylesheet_position.clone())
    }

    fn inline_position(&self) -> Option<String> {
        self.state.borrow().inline_position.clone()
    }

    fn set_inline_position(&self, value: Option<&str>) {
        self.state.borrow_mut().inline_position = value.map(String::from);
    }

    fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        let mut state = self.state.borrow_mut();
        if !state.classes.iter().any(|c| c == class) {
            state.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.state.borrow_mut().classes.retain(|c| c != class);
    }

    fn append_overlay(&self, class: &str) -> OverlayId {
        let id = OverlayId(self.next_overlay.get());
        self.next_overlay.set(id.0 + 1);
        self.state
            .borrow_mut()
            .overlays
            .push((id, class.to_string()));
        id
    }

    fn remove_overlay(&self, overlay: OverlayId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.overlays.len();
        state.overlays.retain(|(id, _)| *id != overlay);
        state.overlays.len() != before
    }
}

/// A document held entirely in memory, with focus tracking.
#[derive(Debug)]
pub struct MemoryDocument {
    url: RefCell<String>,
    next_key: Cell<u64>,
    elements: RefCell<Vec<Rc<MemoryElement>>>,
    active: RefCell<Option<Rc<MemoryElement>>>,
    stylesheets: RefCell<BTreeMap<String, String>>,
}

impl MemoryDocument {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: RefCell::new(url.into()),
            next_key: Cell::new(1),
            elements: RefCell::new(Vec::new()),
            active: RefCell::new(None),
            stylesheets: RefCell::new(BTreeMap::new()),
        }
    }

    /// Create an element and attach it to the document.
    pub fn create_element(&self, tag_name: &str) -> Rc<MemoryElement> {
        let key = ElementKey(self.next_key.get());
        self.next_key.set(key.0 + 1);
        let element = Rc::new(MemoryElement::new(key, tag_name));
        self.elements.borrow_mut().push(element.clone());
        element
    }

    pub fn create_input(&self, input_type: &str) -> Rc<MemoryElement> {
        let element = self.create_element("input");
        element.set_input_type(input_type);
        element
    }

    pub fn create_textarea(&self) -> Rc<MemoryElement> {
        self.create_element("textarea")
    }

    pub fn focus(&self, element: &Rc<MemoryElement>) {
        *self.active.borrow_mut() = Some(element.clone());
    }

    pub fn blur(&self) {
        *self.active.borrow_mut() = None;
    }

    /// Detach an element. The caller's handle stays valid but disconnected.
    pub fn remove(&self, element: &Rc<MemoryElement>) {
        element.connected.set(false);
        self.elements
            .borrow_mut()
            .retain(|e| !Rc::ptr_eq(e, element));
        let mut active = self.active.borrow_mut();
        if active.as_ref().is_some_and(|a| Rc::ptr_eq(a, element)) {
            *active = None;
        }
    }

    pub fn navigate(&self, url: impl Into<String>) {
        *self.url.borrow_mut() = url.into();
    }

    pub fn stylesheet(&self, id: &str) -> Option<String> {
        self.stylesheets.borrow().get(id).cloned()
    }

    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.borrow().len()
    }
}

impl PageDocument for MemoryDocument {
    fn url(&self) -> String {
        self.url.borrow().clone()
    }

    fn active_element(&self) -> Option<Rc<dyn PageElement>> {
        self.active
            .borrow()
            .clone()
            .map(|element| element as Rc<dyn PageElement>)
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.stylesheets.borrow().contains_key(id)
    }

    fn insert_stylesheet(&self, id: &str, css: &str) {
        self.stylesheets
            .borrow_mut()
            .insert(id.to_string(), css.to_string());
    }
}
