//! Prompt construction for the generative backend.
//!
//! The system prompts pin down the response formats the parser relies
//! on (header shapes, Tension:/Resolution: labels, AP/CSC table rows),
//! so prompts and parser agree on the wire format.

use storyflow_core::{ChatMessage, StoryContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// First generation call of a session: produce the opening attack point.
    Start,
    /// Every later call: continue the outline conversation.
    Continue,
}

/// One fully assembled backend request.
#[derive(Debug, Clone)]
pub struct PromptTurn {
    pub kind: PromptKind,
    pub system: String,
    pub history: Vec<ChatMessage>,
    pub user: String,
}

fn context_block(ctx: &StoryContext) -> String {
    format!(
        "PARAMETERS PROVIDED:\n- Core Story Concept: {}\n- Audience: {}\n- Intervention Name: {}\n- Disease or Condition: {}",
        ctx.core_story_concept, ctx.audience, ctx.intervention_name, ctx.disease_condition
    )
}

/// Build the opening request: one attack point, with the follow-up
/// question the wizard expects.
pub fn start_turn(ctx: &StoryContext) -> PromptTurn {
    let system = format!(
        "You are a cinematic scientific storyteller crafting clinical narratives for practicing physicians.\n\n{}\n\nCreate one Attack Point: the opening scene that hooks the reader within one breath and leaves a cliff-edge question. Open with a vivid moment, pose or imply the clinical problem, and hint at why traditional thinking is about to be challenged. Keep it under 100 words.\n\nFormat:\n- First line: \"Attack Point #X\" where X is the number of the most recently created Attack Point.\n- Then the attack point text, nothing else.\n\nAfter delivering the attack point, you MUST ask: \"Would you like to modify this Attack Point, create a new one, or move on to creating tension-resolution points?\"",
        context_block(ctx)
    );
    PromptTurn {
        kind: PromptKind::Start,
        system,
        history: Vec::new(),
        user: "Please create the first Attack Point.".to_string(),
    }
}

/// Build a continuation request carrying the full formatting contract
/// for the later outline phases.
pub fn continue_turn(ctx: &StoryContext, history: &[ChatMessage], user: &str) -> PromptTurn {
    let system = format!(
        "You are continuing to help create a story flow outline with an Attack Point and Tension-Resolution points.\n\n{}\n\nGUIDELINES:\n\n1. ATTACK POINT PHASE: if the user wants to modify the Attack Point, ask \"What modifications would you like to make to the Attack Point?\" and then modify accordingly. If they want a new one, create it and uptick its number. If they want to move on, ask whether they want a short narrative (3-5 tension-resolution points), a full narrative (8-12), or a specific number.\n\n2. TENSION-RESOLUTION PHASE: use exactly this template, with dividers (---) between points:\n**Tension-Resolution #1:** (headline, 6 words or fewer)\nTension: (tension text, 50 words or fewer)\nResolution: (resolution text, 50 words or fewer)\n\n3. CONCLUSION: after the points, add a **Conclusion** section tying back to the Core Story Concept, 40 words or fewer.\n\n4. REFERENCES: then add a References section: numbered entries, peer-reviewed literature from the past 10 years, format \"Lastname FN, et al. Title. *J Abbrev.* Year;Volume:Page-Page.\"\n\n5. TABLE: if asked for a table, produce a markdown table with columns number, tension, resolution. First row: \"AP\" with the attack point text in the tension column. Last row: \"CSC\" with the conclusion text in the resolution column.\n\n6. SCRIPT: if asked for a talk script, first ask \"How long should the TED talk be (in minutes)?\" and then write a script of that length.\n\nRespond to the user's latest message, following the conversation flow exactly.",
        context_block(ctx)
    );
    PromptTurn {
        kind: PromptKind::Continue,
        system,
        history: history.to_vec(),
        user: user.to_string(),
    }
}
