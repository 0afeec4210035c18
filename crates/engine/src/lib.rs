//! Turn orchestration for the story flow wizard.
//!
//! One conversational turn at a time: the controller decides whether an
//! utterance is handled locally (concept choice, setup questions) or
//! forwarded to the generative backend, then applies the parsed response
//! to the session atomically.

pub mod controller;
pub mod generate;
pub mod intent;
pub mod prompt;

pub use controller::{Engine, EngineError, EngineOptions, TurnOutcome, GREETING};
pub use generate::{FailingGenerator, GenerateError, Generator, MockGenerator};
pub use intent::{mutation_mode, MutationMode, TurnIntent, MODIFY_PROMPT};
pub use prompt::{continue_turn, start_turn, PromptKind, PromptTurn};
