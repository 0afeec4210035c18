//! Turn-intent resolution: does the next attack point replace the last
//! one or join the list?
//!
//! Callers that know the user's intent pass it explicitly; the keyword
//! heuristic only runs as a fallback, and ambiguity resolves to add.

/// Explicit intent supplied alongside a user utterance, when the caller
/// can provide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnIntent {
    Modify,
    CreateNew,
    /// Derive intent from the utterance text.
    #[default]
    Unspecified,
}

/// How an extracted attack point is merged into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    Add,
    ModifyLast,
}

/// The literal prompt whose presence as the previous assistant message
/// marks the next utterance as modification instructions.
pub const MODIFY_PROMPT: &str = "What modifications would you like to make to the Attack Point?";

const MODIFY_WORDS: &[&str] = &["modify", "change", "edit", "update", "revise"];
const CREATE_WORDS: &[&str] = &["new", "create", "another", "different"];

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Resolve the mutation mode for an utterance.
///
/// Modification language without creation language selects modify-last,
/// as does answering the literal modification prompt. Everything else,
/// including the very first beat of a session, selects add.
pub fn mutation_mode(
    intent: TurnIntent,
    utterance: &str,
    last_assistant: Option<&str>,
) -> MutationMode {
    match intent {
        TurnIntent::Modify => return MutationMode::ModifyLast,
        TurnIntent::CreateNew => return MutationMode::Add,
        TurnIntent::Unspecified => {}
    }

    if last_assistant.is_some_and(|msg| msg.trim() == MODIFY_PROMPT) {
        return MutationMode::ModifyLast;
    }

    let lower = utterance.to_lowercase();
    if contains_any(&lower, MODIFY_WORDS) && !contains_any(&lower, CREATE_WORDS) {
        return MutationMode::ModifyLast;
    }

    MutationMode::Add
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_language_selects_modify_last() {
        for utterance in [
            "please modify the opening",
            "change the patient's age",
            "edit the framing",
            "update it with newer data",
            "revise the tone",
        ] {
            assert_eq!(
                mutation_mode(TurnIntent::Unspecified, utterance, None),
                MutationMode::ModifyLast,
                "{utterance}"
            );
        }
    }

    #[test]
    fn creation_language_overrides_modify_language() {
        assert_eq!(
            mutation_mode(TurnIntent::Unspecified, "change it to a new patient example", None),
            MutationMode::Add
        );
        assert_eq!(
            mutation_mode(TurnIntent::Unspecified, "create another one", None),
            MutationMode::Add
        );
    }

    #[test]
    fn ambiguity_resolves_to_add() {
        assert_eq!(
            mutation_mode(TurnIntent::Unspecified, "make it more dramatic", None),
            MutationMode::Add
        );
        assert_eq!(
            mutation_mode(TurnIntent::Unspecified, "yes", None),
            MutationMode::Add
        );
    }

    #[test]
    fn modification_prompt_as_previous_message_selects_modify_last() {
        assert_eq!(
            mutation_mode(
                TurnIntent::Unspecified,
                "use a younger patient",
                Some(MODIFY_PROMPT)
            ),
            MutationMode::ModifyLast
        );
    }

    #[test]
    fn explicit_intent_bypasses_the_heuristic() {
        assert_eq!(
            mutation_mode(TurnIntent::Modify, "a brand new take", None),
            MutationMode::ModifyLast
        );
        assert_eq!(
            mutation_mode(TurnIntent::CreateNew, "modify this", Some(MODIFY_PROMPT)),
            MutationMode::Add
        );
    }
}
