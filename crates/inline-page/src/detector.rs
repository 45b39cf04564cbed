//! Shortcut and focus detection.

use std::collections::BTreeSet;
use std::rc::Rc;

use thiserror::Error;

use inline_config::{ResolvedSettings, ShortcutTable};
use inline_protocols::chord::{is_modifier, normalize_key};
use inline_protocols::{CorrectionFunction, SettingsStatus};

use crate::dom::{PageDocument, PageElement};

/// Input types that carry plain editable text.
const TEXT_INPUT_TYPES: [&str; 7] = ["text", "email", "password", "search", "tel", "url", ""];

/// A key press as seen in the capture phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            meta: false,
            ctrl: false,
            shift: false,
        }
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Active modifiers plus the normalized non-modifier key.
    pub fn pressed_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        if self.meta {
            keys.insert("Meta".to_string());
        }
        if self.ctrl {
            keys.insert("Control".to_string());
        }
        if self.shift {
            keys.insert("Shift".to_string());
        }
        if !is_modifier(&self.key) {
            keys.insert(normalize_key(&self.key));
        }
        keys
    }
}

/// Why a matched shortcut did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoOpReason {
    #[error("not eligible")]
    NotEligible,

    #[error("input empty")]
    EmptyInput,

    #[error("settings incomplete")]
    SettingsIncomplete(SettingsStatus),
}

impl NoOpReason {
    pub fn settings_status(&self) -> Option<SettingsStatus> {
        match self {
            NoOpReason::SettingsIncomplete(status) => Some(*status),
            _ => None,
        }
    }
}

/// Outcome of running one key event through the detector.
pub enum Detection {
    /// No configured chord matched; the event propagates untouched.
    NoMatch,
    /// A chord matched but a precondition failed.
    NoOp {
        function: CorrectionFunction,
        reason: NoOpReason,
        element: Option<Rc<dyn PageElement>>,
    },
    /// Everything is in place to submit a correction.
    Submit {
        function: CorrectionFunction,
        element: Rc<dyn PageElement>,
        text: String,
    },
}

impl Detection {
    /// Only a ready submission suppresses the key's default action.
    pub fn suppresses_default(&self) -> bool {
        matches!(self, Detection::Submit { .. })
    }

    pub fn function(&self) -> Option<CorrectionFunction> {
        match self {
            Detection::NoMatch => None,
            Detection::NoOp { function, .. } | Detection::Submit { function, .. } => {
                Some(*function)
            }
        }
    }
}

/// First function, in evaluation order, whose chord equals the pressed set.
pub fn match_shortcut(shortcuts: &ShortcutTable, event: &KeyEvent) -> Option<CorrectionFunction> {
    let pressed = event.pressed_keys();
    shortcuts
        .iter()
        .find(|(_, chord)| chord.matches(&pressed))
        .map(|(function, _)| *function)
}

/// `textarea`, a text-like `input`, or any content-editable element.
pub fn is_eligible(element: &dyn PageElement) -> bool {
    if element.is_content_editable() {
        return true;
    }
    match element.tag_name().to_lowercase().as_str() {
        "textarea" => true,
        "input" => {
            let input_type = element.input_type().unwrap_or_default().to_lowercase();
            TEXT_INPUT_TYPES.contains(&input_type.as_str())
        }
        _ => false,
    }
}

pub fn detect(
    document: &dyn PageDocument,
    settings: &ResolvedSettings,
    event: &KeyEvent,
) -> Detection {
    let Some(function) = match_shortcut(&settings.shortcuts, event) else {
        return Detection::NoMatch;
    };

    let element = match document.active_element() {
        Some(element) if is_eligible(element.as_ref()) => element,
        other => {
            return Detection::NoOp {
                function,
                reason: NoOpReason::NotEligible,
                element: other,
            };
        }
    };

    let text = element.text();
    if text.trim().is_empty() {
        return Detection::NoOp {
            function,
            reason: NoOpReason::EmptyInput,
            element: Some(element),
        };
    }

    let status = settings.status();
    if !status.is_complete() {
        return Detection::NoOp {
            function,
            reason: NoOpReason::SettingsIncomplete(status),
            element: Some(element),
        };
    }

    Detection::Submit {
        function,
        element,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_dom::MemoryDocument;
    use inline_config::StoredSettings;

    fn complete() -> ResolvedSettings {
        let mut stored = StoredSettings {
            provider: Some("openai".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        };
        stored.set_api_key("openai", "sk-1");
        stored.resolve()
    }

    fn fix_language() -> KeyEvent {
        KeyEvent::new("t").meta().ctrl().shift()
    }

    #[test]
    fn test_pressed_keys_normalized() {
        let keys = KeyEvent::new("t").meta().shift().pressed_keys();
        let expected: BTreeSet<String> = ["Meta", "Shift", "T"].iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_pressed_keys_named_key_kept() {
        let keys = KeyEvent::new("Enter").ctrl().pressed_keys();
        assert!(keys.contains("Enter"));
    }

    #[test]
    fn test_modifier_alone_not_added_twice() {
        let keys = KeyEvent::new("Shift").shift().pressed_keys();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_match_default_chords() {
        let table = ShortcutTable::default();
        assert_eq!(
            match_shortcut(&table, &fix_language()),
            Some(CorrectionFunction::FixLanguage)
        );
        assert_eq!(
            match_shortcut(&table, &KeyEvent::new("R").shift().ctrl().meta()),
            Some(CorrectionFunction::RephraseFriendlyProfessional)
        );
    }

    #[test]
    fn test_subset_does_not_match() {
        let table = ShortcutTable::default();
        assert_eq!(match_shortcut(&table, &KeyEvent::new("t").meta().shift()), None);
    }

    #[test]
    fn test_eligibility() {
        let doc = MemoryDocument::new("https://example.com/");
        assert!(is_eligible(&*doc.create_textarea()));
        assert!(is_eligible(&*doc.create_input("search")));
        assert!(is_eligible(&*doc.create_input("")));
        assert!(!is_eligible(&*doc.create_input("checkbox")));
        assert!(!is_eligible(&*doc.create_element("div")));

        let editable = doc.create_element("div");
        editable.set_content_editable(true);
        assert!(is_eligible(&*editable));
    }

    #[test]
    fn test_input_without_type_is_eligible() {
        let doc = MemoryDocument::new("https://example.com/");
        assert!(is_eligible(&*doc.create_element("input")));
    }

    #[test]
    fn test_detect_no_match() {
        let doc = MemoryDocument::new("https://example.com/");
        let detection = detect(&doc, &complete(), &KeyEvent::new("a"));
        assert!(matches!(detection, Detection::NoMatch));
        assert!(!detection.suppresses_default());
    }

    #[test]
    fn test_detect_not_eligible() {
        let doc = MemoryDocument::new("https://example.com/");
        let div = doc.create_element("div");
        doc.focus(&div);

        let detection = detect(&doc, &complete(), &fix_language());
        assert!(!detection.suppresses_default());
        match detection {
            Detection::NoOp { reason, element, .. } => {
                assert_eq!(reason, NoOpReason::NotEligible);
                assert_eq!(element.unwrap().tag_name(), "DIV");
            }
            _ => panic!("expected no-op"),
        }
    }

    #[test]
    fn test_detect_nothing_focused() {
        let doc = MemoryDocument::new("https://example.com/");
        match detect(&doc, &complete(), &fix_language()) {
            Detection::NoOp { reason, element, .. } => {
                assert_eq!(reason, NoOpReason::NotEligible);
                assert!(element.is_none());
            }
            _ => panic!("expected no-op"),
        }
    }

    #[test]
    fn test_detect_whitespace_only_is_empty() {
        let doc = MemoryDocument::new("https://example.com/");
        let area = doc.create_textarea();
        area.type_text("  \n ");
        doc.focus(&area);

        match detect(&doc, &complete(), &fix_language()) {
            Detection::NoOp { reason, .. } => assert_eq!(reason, NoOpReason::EmptyInput),
            _ => panic!("expected no-op"),
        }
    }

    #[test]
    fn test_detect_settings_incomplete() {
        let doc = MemoryDocument::new("https://example.com/");
        let area = doc.create_textarea();
        area.type_text("helo");
        doc.focus(&area);

        let detection = detect(&doc, &ResolvedSettings::default(), &fix_language());
        assert!(!detection.suppresses_default());
        match detection {
            Detection::NoOp { reason, .. } => {
                let status = reason.settings_status().unwrap();
                assert!(!status.has_provider);
                assert_eq!(reason.to_string(), "settings incomplete");
            }
            _ => panic!("expected no-op"),
        }
    }

    #[test]
    fn test_detect_submit() {
        let doc = MemoryDocument::new("https://example.com/");
        let area = doc.create_textarea();
        area.type_text("helo wrld");
        doc.focus(&area);

        let detection = detect(&doc, &complete(), &fix_language());
        assert!(detection.suppresses_default());
        assert_eq!(detection.function(), Some(CorrectionFunction::FixLanguage));
        match detection {
            Detection::Submit { text, .. } => assert_eq!(text, "helo wrld"),
            _ => panic!("expected submit"),
        }
    }
}
