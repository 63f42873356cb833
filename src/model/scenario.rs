use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::error::InvalidDecisionError;

/// One of the four policy options a participant can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [
        OptionLabel::A,
        OptionLabel::B,
        OptionLabel::C,
        OptionLabel::D,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = InvalidDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            _ => Err(InvalidDecisionError {
                label: s.trim().to_string(),
            }),
        }
    }
}

/// The scored consequence of picking one option.
/// `total` comes straight from the scenario data; it is not derived
/// from the four component scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub safety: i32,
    pub equity: i32,
    pub cost: i32,
    pub political: i32,
    pub total: i32,
}

/// One outcome per option label. Stored as named fields so every label
/// always has an outcome and the decision phase cannot miss a lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutcomeTable {
    pub a: Outcome,
    pub b: Outcome,
    pub c: Outcome,
    pub d: Outcome,
}

impl OutcomeTable {
    pub fn for_label(&self, label: OptionLabel) -> Outcome {
        match label {
            OptionLabel::A => self.a,
            OptionLabel::B => self.b,
            OptionLabel::C => self.c,
            OptionLabel::D => self.d,
        }
    }
}

/// One experiment round's worth of material.
/// Immutable after load; the catalog owns every scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub round_num: i32,
    pub scenario_id: String,
    pub title: String,
    pub options_text: String,

    /// Stakeholder memo shown only to the participant.
    pub human_private_info: String,

    /// Technical memo shown only to the AI teammate.
    pub ai_private_info: String,

    pub outcomes: OutcomeTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_parses_any_case_with_whitespace() {
        assert_eq!(" a ".parse::<OptionLabel>().unwrap(), OptionLabel::A);
        assert_eq!("B".parse::<OptionLabel>().unwrap(), OptionLabel::B);
        assert_eq!("d\n".parse::<OptionLabel>().unwrap(), OptionLabel::D);
    }

    #[test]
    fn label_rejects_everything_else() {
        for bad in ["E", "", "AB", "1", "decide"] {
            assert!(bad.parse::<OptionLabel>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn outcome_table_covers_every_label() {
        let outcome = |total| Outcome {
            safety: 0,
            equity: 0,
            cost: 0,
            political: 0,
            total,
        };
        let table = OutcomeTable {
            a: outcome(1),
            b: outcome(2),
            c: outcome(3),
            d: outcome(4),
        };
        let totals: Vec<i32> = OptionLabel::ALL
            .iter()
            .map(|l| table.for_label(*l).total)
            .collect();
        assert_eq!(totals, vec![1, 2, 3, 4]);
    }
}
