use serde::{Deserialize, Serialize};

/// The four answers gathered during setup, before any generation happens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryContext {
    #[serde(default)]
    pub core_story_concept: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub intervention_name: String,
    #[serde(default)]
    pub disease_condition: String,
}

impl StoryContext {
    /// Setup is complete once every field has been answered.
    pub fn is_complete(&self) -> bool {
        !self.core_story_concept.trim().is_empty()
            && !self.audience.trim().is_empty()
            && !self.intervention_name.trim().is_empty()
            && !self.disease_condition.trim().is_empty()
    }
}

/// The opening unit of a story. Indices are 1-based and contiguous;
/// only the highest-index entry is ever modified in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttackPoint {
    pub index: u32,
    pub text: String,
}

/// One paired unit of narrative conflict and its payoff.
///
/// Positional: the 1-based number shown to the user is derived from the
/// point's place in the session's list, never stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TensionResolutionPoint {
    pub headline: String,
    pub tension: String,
    pub resolution: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One prior conversation turn, kept as read-only context for
/// classification heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_completeness() {
        let mut ctx = StoryContext::default();
        assert!(!ctx.is_complete());

        ctx.core_story_concept = "Plaque inflammation drives events.".to_string();
        ctx.audience = "cardiologists".to_string();
        ctx.intervention_name = "orticumab".to_string();
        assert!(!ctx.is_complete());

        ctx.disease_condition = "atherosclerosis".to_string();
        assert!(ctx.is_complete());
    }

    #[test]
    fn whitespace_only_answers_do_not_count() {
        let ctx = StoryContext {
            core_story_concept: "  ".to_string(),
            audience: "a".to_string(),
            intervention_name: "b".to_string(),
            disease_condition: "c".to_string(),
        };
        assert!(!ctx.is_complete());
    }
}
