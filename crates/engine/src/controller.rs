//! The turn controller: one user utterance in, one assistant reply out,
//! with classification and state mutation run to completion in between.

use crate::generate::{GenerateError, Generator};
use crate::intent::{mutation_mode, MutationMode, TurnIntent};
use crate::prompt::{continue_turn, start_turn};
use storyflow_core::{ChatMessage, Phase, Role, Session, SetupQuestion};
use storyflow_parser::{parse_response, ClassifyContext, ClassifyOptions};
use thiserror::Error;
use tracing::debug;

/// Opening assistant message of every session.
pub const GREETING: &str =
    "Do you want to use the currently selected Core Story Concept or provide a new one?";

const CONCEPT_ENTRY_PROMPT: &str =
    "Please enter the Core Story Concept you'd like to use to guide the story flow.";

#[derive(Debug, Error)]
pub enum EngineError {
    /// Empty input is rejected before a turn starts.
    #[error("empty input")]
    EmptyInput,
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// The core story concept used when the user picks the currently
    /// selected one.
    pub default_concept: String,
    pub classify: ClassifyOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_concept: "Plaque inflammation drives cardiovascular events. Direct and safe ways to reduce plaque inflammation are needed. A plaque-targeted anti-inflammatory therapy that inhibits pro-inflammatory macrophages within plaques has the potential to reduce cardiovascular risk on top of current standard of care.".to_string(),
            classify: ClassifyOptions::default(),
        }
    }
}

/// What one completed turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub phase: Phase,
}

pub struct Engine {
    options: EngineOptions,
    generator: Box<dyn Generator>,
}

impl Engine {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self::with_options(EngineOptions::default(), generator)
    }

    pub fn with_options(options: EngineOptions, generator: Box<dyn Generator>) -> Self {
        Self { options, generator }
    }

    /// Name of the backend this engine generates with.
    pub fn backend_name(&self) -> &str {
        self.generator.name()
    }

    /// Run one conversational turn against the session.
    ///
    /// A failed backend call abandons the turn and leaves the session
    /// untouched so the user may retry; on success, classification and
    /// mutation run to completion before this returns.
    pub fn take_turn(
        &self,
        session: &mut Session,
        utterance: &str,
        intent: TurnIntent,
    ) -> Result<TurnOutcome, EngineError> {
        let trimmed = utterance.trim();
        if trimmed.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        match session.phase {
            Phase::ConceptChoice => self.concept_choice(session, trimmed),
            Phase::ConceptEntry => {
                session.context.core_story_concept = trimmed.to_string();
                session.phase = Phase::Setup(SetupQuestion::Audience);
                Ok(self.local_reply(session, trimmed, SetupQuestion::Audience.prompt()))
            }
            Phase::Setup(question) => self.setup_answer(session, trimmed, question),
            _ => self.outline_turn(session, trimmed, intent),
        }
    }

    fn local_reply(&self, session: &mut Session, user: &str, reply: &str) -> TurnOutcome {
        session.history.push(ChatMessage::user(user));
        session.history.push(ChatMessage::assistant(reply));
        TurnOutcome {
            reply: reply.to_string(),
            phase: session.phase,
        }
    }

    fn concept_choice(
        &self,
        session: &mut Session,
        utterance: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let lower = utterance.to_lowercase();
        if lower.contains("current") || lower.contains("selected") || lower.trim() == "yes" {
            session.context.core_story_concept = self.options.default_concept.clone();
            session.phase = Phase::Setup(SetupQuestion::Audience);
            return Ok(self.local_reply(session, utterance, SetupQuestion::Audience.prompt()));
        }
        if lower.contains("new") || lower.contains("provide") {
            session.phase = Phase::ConceptEntry;
            return Ok(self.local_reply(session, utterance, CONCEPT_ENTRY_PROMPT));
        }
        // Unrecognized input: plain conversational content, forwarded
        // without a local transition.
        let turn = continue_turn(&session.context, &session.history, utterance);
        let reply = self.generator.generate(&turn)?;
        Ok(self.local_reply(session, utterance, &reply))
    }

    fn setup_answer(
        &self,
        session: &mut Session,
        answer: &str,
        question: SetupQuestion,
    ) -> Result<TurnOutcome, EngineError> {
        let mut context = session.context.clone();
        match question {
            SetupQuestion::Audience => context.audience = answer.to_string(),
            SetupQuestion::Intervention => context.intervention_name = answer.to_string(),
            SetupQuestion::Disease => context.disease_condition = answer.to_string(),
        }

        if let Some(next) = question.next() {
            session.context = context;
            session.phase = Phase::Setup(next);
            return Ok(self.local_reply(session, answer, next.prompt()));
        }

        // Last setup answer triggers the first generation call. The
        // answer is only committed once the call succeeds, so a failed
        // turn leaves the session unchanged for retry.
        let turn = start_turn(&context);
        let response = self.generator.generate(&turn)?;

        session.context = context;
        session.phase = Phase::AttackPoint;
        self.apply_response(session, answer, &response, TurnIntent::Unspecified);
        Ok(self.local_reply(session, answer, &response))
    }

    fn outline_turn(
        &self,
        session: &mut Session,
        utterance: &str,
        intent: TurnIntent,
    ) -> Result<TurnOutcome, EngineError> {
        let turn = continue_turn(&session.context, &session.history, utterance);
        let response = self.generator.generate(&turn)?;

        self.apply_response(session, utterance, &response, intent);
        Ok(self.local_reply(session, utterance, &response))
    }

    /// Merge everything one response yielded into the session, moving
    /// the phase forward when the content itself indicates the next
    /// stage. Purely conversational responses mutate nothing.
    fn apply_response(
        &self,
        session: &mut Session,
        utterance: &str,
        response: &str,
        intent: TurnIntent,
    ) {
        let ctx = ClassifyContext {
            attack_point_count: session.attack_points.len(),
            phase: session.phase,
        };
        let parsed = parse_response(response, &ctx, &self.options.classify);

        if let Some(text) = parsed.attack_point {
            let last_assistant = session
                .history
                .iter()
                .rev()
                .find(|m| m.role == Role::Assistant)
                .map(|m| m.content.as_str());
            match mutation_mode(intent, utterance, last_assistant) {
                MutationMode::Add => session.add_attack_point(text),
                MutationMode::ModifyLast => session.modify_last_attack_point(text),
            }
            session.phase = Phase::AttackPoint;
        }

        if !parsed.points.is_empty() {
            session.set_points(parsed.points);
            session.phase = Phase::TensionResolution;
        }
        if let Some(conclusion) = parsed.conclusion {
            session.set_conclusion(conclusion);
        }
        if let Some(references) = parsed.references {
            session.set_references(references);
        }
        if let Some(table) = parsed.table {
            session.set_table(table);
            session.phase = Phase::Table;
        }
        if let Some(script) = parsed.script {
            session.set_script(script);
            session.phase = Phase::Script;
        }

        if let Some(question) = &parsed.follow_up {
            if question.to_lowercase().starts_with("how long should") {
                session.phase = Phase::ScriptLength;
            }
        }

        // Self-healing: the numbered rows must mirror the point list.
        session.ensure_table();
        debug!(phase = session.phase.display(), "turn applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{FailingGenerator, MockGenerator};

    fn engine() -> Engine {
        Engine::new(Box::new(MockGenerator))
    }

    fn session_through_setup(engine: &Engine) -> Session {
        let mut session = Session::new();
        session.history.push(ChatMessage::assistant(GREETING));
        engine
            .take_turn(&mut session, "use the currently selected one", TurnIntent::Unspecified)
            .unwrap();
        engine
            .take_turn(&mut session, "cardiologists", TurnIntent::Unspecified)
            .unwrap();
        engine
            .take_turn(&mut session, "orticumab", TurnIntent::Unspecified)
            .unwrap();
        engine
            .take_turn(&mut session, "atherosclerosis", TurnIntent::Unspecified)
            .unwrap();
        session
    }

    #[test]
    fn setup_walks_the_questions_then_generates_the_first_attack_point() {
        let engine = engine();
        let session = session_through_setup(&engine);

        assert_eq!(session.phase, Phase::AttackPoint);
        assert_eq!(session.attack_points.len(), 1);
        assert_eq!(session.attack_points[0].index, 1);
        assert!(!session.context.core_story_concept.is_empty());
        assert_eq!(session.context.audience, "cardiologists");
    }

    #[test]
    fn providing_a_new_concept_goes_through_concept_entry() {
        let engine = engine();
        let mut session = Session::new();
        let outcome = engine
            .take_turn(&mut session, "provide a new one", TurnIntent::Unspecified)
            .unwrap();
        assert_eq!(session.phase, Phase::ConceptEntry);
        assert!(outcome.reply.contains("Core Story Concept"));

        engine
            .take_turn(&mut session, "Hypertension is undertreated.", TurnIntent::Unspecified)
            .unwrap();
        assert_eq!(session.context.core_story_concept, "Hypertension is undertreated.");
        assert_eq!(session.phase, Phase::Setup(SetupQuestion::Audience));
    }

    #[test]
    fn modify_replaces_the_current_attack_point_in_place() {
        let engine = engine();
        let mut session = session_through_setup(&engine);
        let original = session.attack_points[0].text.clone();

        engine
            .take_turn(
                &mut session,
                "modify it to use a younger patient",
                TurnIntent::Unspecified,
            )
            .unwrap();

        assert_eq!(session.attack_points.len(), 1);
        assert_ne!(session.attack_points[0].text, original);
        assert_eq!(session.phase, Phase::AttackPoint);
    }

    #[test]
    fn create_new_appends_a_second_attack_point() {
        let engine = engine();
        let mut session = session_through_setup(&engine);

        engine
            .take_turn(&mut session, "create a new one", TurnIntent::Unspecified)
            .unwrap();

        assert_eq!(session.attack_points.len(), 2);
        assert_eq!(session.attack_points[1].index, 2);
        assert_eq!(session.selection.attack_point, Some(2));
    }

    #[test]
    fn empty_input_is_rejected_before_a_turn_starts() {
        let engine = engine();
        let mut session = Session::new();
        let err = engine
            .take_turn(&mut session, "   ", TurnIntent::Unspecified)
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyInput));
        assert!(session.history.is_empty());
    }

    #[test]
    fn backend_failure_leaves_the_session_unchanged() {
        let failing = Engine::new(Box::new(FailingGenerator));
        let working = engine();
        let mut session = session_through_setup(&working);
        let before = session.clone();

        let err = failing
            .take_turn(&mut session, "create a new one", TurnIntent::Unspecified)
            .unwrap_err();
        assert!(matches!(err, EngineError::Generate(_)));
        assert_eq!(session, before);
    }

    #[test]
    fn conversational_reply_mutates_nothing() {
        let engine = engine();
        let mut session = session_through_setup(&engine);
        let attack_points = session.attack_points.clone();

        // "modify" alone only draws the modification question back.
        let outcome = engine
            .take_turn(&mut session, "modify", TurnIntent::Unspecified)
            .unwrap();
        assert!(outcome.reply.contains("What modifications"));
        assert_eq!(session.attack_points, attack_points);
        assert_eq!(session.phase, Phase::AttackPoint);
    }
}
