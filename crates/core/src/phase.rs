use serde::{Deserialize, Serialize};

/// The current stage of the guided conversation.
///
/// Every phase still accepts modification requests; none is terminal.
/// `reset` returns to `ConceptChoice`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the user to pick the configured core story concept or
    /// offer a new one.
    #[default]
    ConceptChoice,
    /// Waiting for a user-typed core story concept.
    ConceptEntry,
    /// Walking through the remaining setup questions.
    Setup(SetupQuestion),
    /// Attack point creation/modification loop.
    AttackPoint,
    /// Tension-resolution point creation loop.
    TensionResolution,
    /// Outline has been projected into a table.
    Table,
    /// Waiting for the requested talk length in minutes.
    ScriptLength,
    /// A long-form script has been produced.
    Script,
}

impl Phase {
    pub fn display(&self) -> &'static str {
        match self {
            Self::ConceptChoice => "concept choice",
            Self::ConceptEntry => "concept entry",
            Self::Setup(q) => q.display(),
            Self::AttackPoint => "attack point",
            Self::TensionResolution => "tension-resolution",
            Self::Table => "table",
            Self::ScriptLength => "script length",
            Self::Script => "script",
        }
    }
}

/// The setup questions asked after the core story concept is settled,
/// in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetupQuestion {
    Audience,
    Intervention,
    Disease,
}

impl SetupQuestion {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Audience => "What is your Audience?",
            Self::Intervention => "What is your Intervention Name?",
            Self::Disease => "What is the Disease or Condition?",
        }
    }

    /// The question that follows this one, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Audience => Some(Self::Intervention),
            Self::Intervention => Some(Self::Disease),
            Self::Disease => None,
        }
    }

    fn display(&self) -> &'static str {
        match self {
            Self::Audience => "setup: audience",
            Self::Intervention => "setup: intervention",
            Self::Disease => "setup: disease",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_questions_walk_in_order() {
        let mut q = SetupQuestion::Audience;
        let mut prompts = vec![q.prompt()];
        while let Some(next) = q.next() {
            q = next;
            prompts.push(q.prompt());
        }
        assert_eq!(
            prompts,
            vec![
                "What is your Audience?",
                "What is your Intervention Name?",
                "What is the Disease or Condition?",
            ]
        );
    }

    #[test]
    fn phase_serializes_as_snake_case() {
        let json = serde_json::to_string(&Phase::Setup(SetupQuestion::Audience)).unwrap();
        assert!(json.contains("setup"));
        assert!(json.contains("audience"));

        let parsed: Phase = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Phase::Setup(SetupQuestion::Audience));
    }
}
