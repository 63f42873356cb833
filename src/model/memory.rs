use serde::{Deserialize, Serialize};

/// How verbose the teammate's replies should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Cross-round adaptation state for the AI teammate.
///
/// Mutated only through `apply_instruction`, at most once per round.
/// Adaptation is a one-way ratchet: `Medium` is reachable only as the
/// untouched default and `focus_equity` never turns back off. That is
/// intentional experiment design, not a bug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMemory {
    pub explanation_length: ExplanationLength,
    pub focus_equity: bool,

    /// Every raw instruction ever supplied, verbatim, in order.
    pub instructions: Vec<String>,
}

const SHORTEN_KEYWORDS: [&str; 3] = ["short", "concise", "brief"];
const LENGTHEN_KEYWORDS: [&str; 3] = ["more detail", "longer", "explain more"];
const EQUITY_KEYWORDS: [&str; 3] = ["equity", "fairness", "fair"];

impl TeamMemory {
    /// Folds one free-text instruction into the memory.
    ///
    /// The raw text is always recorded, even when no keyword matches.
    /// Length keywords are mutually exclusive (shorten checked first);
    /// the equity family is matched independently.
    pub fn apply_instruction(&mut self, raw: &str) {
        self.instructions.push(raw.to_string());

        let text = raw.to_lowercase();

        if contains_any(&text, &SHORTEN_KEYWORDS) {
            self.explanation_length = ExplanationLength::Short;
        } else if contains_any(&text, &LENGTHEN_KEYWORDS) {
            self.explanation_length = ExplanationLength::Long;
        }

        if contains_any(&text, &EQUITY_KEYWORDS) {
            self.focus_equity = true;
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
