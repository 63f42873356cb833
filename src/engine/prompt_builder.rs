use crate::model::memory::{ExplanationLength, TeamMemory};
use crate::model::scenario::Scenario;

/// Builds the system prompt handed to the AI teammate.
/// This module is intentionally dumb: it only formats text.
/// No parsing, no networking, no session logic.
pub fn build_system_prompt(scenario: &Scenario, memory: &TeamMemory) -> String {
    let mut prompt = String::new();

    push_role_preamble(&mut prompt);
    push_technical_memo(&mut prompt, scenario);
    push_collaboration_rules(&mut prompt);

    if memory.focus_equity {
        push_equity_directive(&mut prompt);
    }

    push_length_directive(&mut prompt, memory.explanation_length);

    prompt
}

fn push_role_preamble(prompt: &mut String) {
    prompt.push_str(
        "You are an AI policy teammate in a research experiment.\n\
You only see the following *technical memo* about this scenario \
and NOT the human's stakeholder memo.\n\n",
    );
}

fn push_technical_memo(prompt: &mut String, scenario: &Scenario) {
    prompt.push_str("Technical memo:\n");
    prompt.push_str(&scenario.ai_private_info);
    prompt.push_str("\n\n");
}

fn push_collaboration_rules(prompt: &mut String) {
    prompt.push_str(
        "Your role:\n\
- Collaborate with the human.\n\
- Offer reasoning and trade-offs between options A/B/C/D.\n\
- Do NOT make the final decision; the human decides.\n\
- Be honest that you only see technical data.\n",
    );
}

fn push_equity_directive(prompt: &mut String) {
    prompt.push_str(
        "\nThe human has asked you to pay particular attention to equity \
and distributional impacts when relevant.\n",
    );
}

fn push_length_directive(prompt: &mut String, length: ExplanationLength) {
    match length {
        ExplanationLength::Short => {
            prompt.push_str("\nKeep replies concise (2-3 sentences).\n");
        }
        ExplanationLength::Long => {
            prompt.push_str("\nGive more detailed reasoning (4-6 sentences).\n");
        }
        ExplanationLength::Medium => {
            prompt.push_str("\nUse a moderate level of detail (3-4 sentences).\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::scenario::{Outcome, OutcomeTable};

    fn scenario() -> Scenario {
        let zero = Outcome {
            safety: 0,
            equity: 0,
            cost: 0,
            political: 0,
            total: 0,
        };
        Scenario {
            round_num: 1,
            scenario_id: "transit_fares".into(),
            title: "Transit fare reform".into(),
            options_text: "A) freeze fares ...".into(),
            human_private_info: "The mayor is up for re-election.".into(),
            ai_private_info: "Ridership fell 12% after the last fare hike.".into(),
            outcomes: OutcomeTable {
                a: zero,
                b: zero,
                c: zero,
                d: zero,
            },
        }
    }

    #[test]
    fn prompt_is_pure_and_deterministic() {
        let memory = TeamMemory {
            focus_equity: true,
            ..TeamMemory::default()
        };
        let s = scenario();
        assert_eq!(build_system_prompt(&s, &memory), build_system_prompt(&s, &memory));
    }

    #[test]
    fn memo_text_appears_verbatim_and_stakeholder_memo_does_not() {
        let prompt = build_system_prompt(&scenario(), &TeamMemory::default());
        assert!(prompt.contains("Ridership fell 12% after the last fare hike."));
        assert!(!prompt.contains("re-election"));
    }

    #[test]
    fn equity_directive_only_when_flag_set_and_before_length() {
        let s = scenario();

        let plain = build_system_prompt(&s, &TeamMemory::default());
        assert!(!plain.contains("equity and distributional impacts"));

        let focused = build_system_prompt(
            &s,
            &TeamMemory {
                focus_equity: true,
                ..TeamMemory::default()
            },
        );
        let equity_at = focused.find("equity and distributional impacts").unwrap();
        let length_at = focused.find("moderate level of detail").unwrap();
        assert!(equity_at < length_at);
    }

    #[test]
    fn length_directive_three_way_branch() {
        let s = scenario();
        let with_length = |length| {
            build_system_prompt(
                &s,
                &TeamMemory {
                    explanation_length: length,
                    ..TeamMemory::default()
                },
            )
        };

        assert!(with_length(ExplanationLength::Short).contains("concise (2-3 sentences)"));
        assert!(with_length(ExplanationLength::Long).contains("detailed reasoning (4-6 sentences)"));
        assert!(
            with_length(ExplanationLength::Medium).contains("moderate level of detail (3-4 sentences)")
        );
    }

    #[test]
    fn exactly_one_length_directive() {
        let prompt = build_system_prompt(&scenario(), &TeamMemory::default());
        let directives = ["concise (2-3", "reasoning (4-6", "detail (3-4"];
        let count = directives.iter().filter(|d| prompt.contains(*d)).count();
        assert_eq!(count, 1);
    }
}
