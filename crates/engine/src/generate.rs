//! Generative backend boundary.
//!
//! The engine only ever sees `generate(prompt) -> text`; transport,
//! retries and latency are the implementation's concern. The mock
//! implementation makes the whole wizard drivable offline.

use crate::prompt::{PromptKind, PromptTurn};
use storyflow_core::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("backend request failed: {0}")]
    Backend(String),
}

/// Black-box text generation: prompt in, raw response out.
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, prompt: &PromptTurn) -> Result<String, GenerateError>;
}

/// Offline backend with canned responses shaped like the real service's
/// output, keyed on the same utterance patterns the live conversation
/// produces.
#[derive(Debug, Default)]
pub struct MockGenerator;

const MOCK_ATTACK: &str = "Attack Point #1\n\nIn the cardiac catheterization lab, Dr. Chen stared at the angiogram of her 52-year-old patient: three stents, optimal medical therapy, LDL at 45 mg/dL, and yet another acute coronary syndrome eighteen months later. Every guideline target had been met, but the intravascular ultrasound showed a thin-cap fibroatheroma dense with inflammatory cells. The cholesterol was silenced; the fire in the arterial wall was not.\n\nWould you like to modify this Attack Point, create a new one, or move on to creating tension-resolution points?";

const MOCK_ATTACK_MODIFIED: &str = "Attack Point #1\n\nAt 34 years old, a marathon runner with a plant-based diet and an LDL of 65 mg/dL lay unconscious in the cardiac ICU after a massive STEMI. No risk calculator had flagged him. The emergency angiogram showed a completely occluded LAD from a plaque that had looked stable months earlier. How do you prevent the unpredictable when inflammation turns a safe plaque into a silent assassin?\n\nWould you like to modify this Attack Point, create a new one, or move on to creating tension-resolution points?";

const MOCK_ATTACK_NEW: &str = "**Attack Point:**\nHypertension, a silent killer, affects millions globally and often goes unnoticed until critical complications arise.\n\nWould you like to move on to creating tension-resolution points? If so, do you want a short narrative (3-5 tension-resolution points), a full narrative (8-12 tension-resolution points), or would you like to specify the number?";

const MOCK_LENGTH_QUESTION: &str = "Would you like a short narrative (3-5 tension-resolution points), full narrative (8-12 tension-resolution points), or would you like to specify the number of tension-resolution points?";

const MOCK_MODIFY_QUESTION: &str = "What modifications would you like to make to the Attack Point?";

const MOCK_OUTLINE: &str = "**Tension-Resolution #1:** Inflammation Beyond Lipids\nTension: Despite LDL targets below 70 mg/dL, patients with established disease keep having recurrent events, so lipid lowering alone is not enough.\nResolution: Persistent plaque inflammation emerges as the missing link, with macrophage activation driving instability independent of cholesterol.\n\n---\n\n**Tension-Resolution #2:** The Macrophage Dilemma\nTension: Pro-inflammatory macrophages inside the plaque release cytokines and proteases that promote rupture and thrombosis.\nResolution: Selectively inhibiting macrophage activation inside the plaque addresses the residual inflammatory risk.\n\n---\n\n**Tension-Resolution #3:** Precision Anti-Inflammatory Therapy\nTension: Systemic anti-inflammatory drugs carry immunosuppressive risk that limits their use in prevention.\nResolution: A plaque-targeted approach quiets inflammation within the lesion while preserving systemic immune function.\n\n---\n\n**Conclusion**\nTreating the inflammation, not only the cholesterol, closes the gap that guideline-directed care leaves open.\n\nReferences\n\n1. Ridker PM, et al. Antiinflammatory therapy with canakinumab for atherosclerotic disease. *N Engl J Med.* 2017;377:1119-1131.\n2. Libby P, et al. Inflammation in atherosclerosis: from pathophysiology to practice. *J Am Coll Cardiol.* 2018;72:2071-2081.\n\nWould you like the tension-resolution points put into a table format?";

const MOCK_TABLE: &str = "| # | Tension | Resolution |\n|---|---------|------------|\n| AP | In the cardiac catheterization lab, three stents and optimal therapy still ended in another acute coronary syndrome. | |\n| 1 | Despite LDL targets below 70 mg/dL, recurrent events continue. | Persistent plaque inflammation is the missing link. |\n| 2 | Pro-inflammatory macrophages promote rupture and thrombosis. | Inhibit macrophage activation inside the plaque. |\n| 3 | Systemic anti-inflammatories are too blunt for prevention. | A plaque-targeted approach spares host defense. |\n| CSC | | Treating the inflammation closes the gap guideline care leaves open. |\n\nWould you like me to write a script based on the above story flow outline that would be suitable for a highly engaging TED talk?";

const MOCK_SCRIPT_LENGTH_QUESTION: &str = "How long should the TED talk be (in minutes)?";

impl MockGenerator {
    fn continue_response(&self, user: &str, last_assistant: &str) -> String {
        let lower = user.to_lowercase();
        let trimmed = lower.trim();

        if trimmed == "modify" {
            return MOCK_MODIFY_QUESTION.to_string();
        }
        if lower.contains("move on") || lower.contains("tension") {
            return MOCK_LENGTH_QUESTION.to_string();
        }
        if (lower.contains("create") && lower.contains("new"))
            || (lower.contains("new") && (lower.contains("attack") || lower.contains("one")))
        {
            return MOCK_ATTACK_NEW.to_string();
        }
        if lower.contains("short") || lower.contains("full") {
            return MOCK_OUTLINE.to_string();
        }
        if lower.contains("table")
            || (lower.contains("yes") && last_assistant.contains("table format"))
        {
            return MOCK_TABLE.to_string();
        }
        if lower.contains("ted")
            || lower.contains("script")
            || (lower.contains("yes") && last_assistant.contains("TED talk"))
        {
            return MOCK_SCRIPT_LENGTH_QUESTION.to_string();
        }
        if let Some(minutes) = trimmed
            .split_whitespace()
            .find_map(|w| w.parse::<u32>().ok())
        {
            return mock_script(minutes);
        }
        // Anything substantial at this point reads as modification
        // instructions for the current attack point.
        if user.len() > 10 {
            return MOCK_ATTACK_MODIFIED.to_string();
        }
        MOCK_MODIFY_QUESTION.to_string()
    }
}

fn mock_script(minutes: u32) -> String {
    format!(
        "# Talk Script: The Hidden Enemy in Your Arteries\n*Duration: {minutes} minutes*\n\n## Opening Hook\nRaise your hand if you know someone who has had a heart attack. Keep it up if they had another one, despite doing everything right. I see a lot of hands still up. That is because we have been fighting only half the battle.\n\n## The Problem\nThree stents, perfect cholesterol, and still another event. Look closer at the plaque: it is not about the cholesterol anymore. It is about the inflammation.\n\n## The Solution\nWhat if we could calm the fire inside the plaque without disarming the immune system? That is precision prevention: target the inflammation, keep the defense.\n\n## Close\nThe next time someone you love faces this disease, remember: it is not just the cholesterol. It is the inflammation. And now we can fight both.\n\nThank you."
    )
}

impl Generator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate(&self, prompt: &PromptTurn) -> Result<String, GenerateError> {
        if prompt.kind == PromptKind::Start {
            return Ok(MOCK_ATTACK.to_string());
        }
        let last_assistant = prompt
            .history
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(self.continue_response(&prompt.user, last_assistant))
    }
}

/// A backend that always fails; used to exercise the abandoned-turn path.
#[derive(Debug, Default)]
pub struct FailingGenerator;

impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    fn generate(&self, _prompt: &PromptTurn) -> Result<String, GenerateError> {
        Err(GenerateError::Backend("connection refused".to_string()))
    }
}
