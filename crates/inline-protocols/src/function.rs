//! Correction functions and their prompt templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::error::ProtocolError;

const FIX_LANGUAGE_PROMPT: &str = "Correct the spelling and grammar in the following text without changing its meaning or tone. Return ONLY the corrected text with no additional commentary, explanations, or phrases like \"here is\" or \"corrected text:\".\n\n";

const REPHRASE_PROMPT: &str = "Rephrase the following text in a friendly yet professional manner. Return ONLY the corrected text with no additional commentary, explanations, or phrases like \"here is\" or \"corrected text:\".\n\n";

/// One of the rewrite operations a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CorrectionFunction {
    #[serde(rename = "fix_language")]
    FixLanguage,
    #[serde(rename = "rephrase_as_friendly_and_professional")]
    RephraseFriendlyProfessional,
}

impl CorrectionFunction {
    /// All functions in chord evaluation order.
    pub const ALL: [CorrectionFunction; 2] = [
        CorrectionFunction::FixLanguage,
        CorrectionFunction::RephraseFriendlyProfessional,
    ];

    /// The function used when a request names none or an unknown one.
    pub const fn primary() -> Self {
        CorrectionFunction::FixLanguage
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CorrectionFunction::FixLanguage => "fix_language",
            CorrectionFunction::RephraseFriendlyProfessional => {
                "rephrase_as_friendly_and_professional"
            }
        }
    }

    /// Prompt prefix prepended to the user's text.
    pub const fn prompt(self) -> &'static str {
        match self {
            CorrectionFunction::FixLanguage => FIX_LANGUAGE_PROMPT,
            CorrectionFunction::RephraseFriendlyProfessional => REPHRASE_PROMPT,
        }
    }

    /// Chord bound to this function when settings carry none.
    pub fn default_chord(self) -> Chord {
        let literal = match self {
            CorrectionFunction::FixLanguage => "T",
            CorrectionFunction::RephraseFriendlyProfessional => "R",
        };
        Chord::from_trusted(["Meta", "Control", "Shift", literal])
    }

    /// Resolve a wire value, falling back to [`primary`](Self::primary).
    pub fn resolve(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(Self::primary)
    }
}

impl fmt::Display for CorrectionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrectionFunction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownFunction(s.to_string()))
    }
}
