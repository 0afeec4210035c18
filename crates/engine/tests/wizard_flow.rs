//! End-to-end wizard walk against the offline backend: concept choice
//! through setup, attack point, tension-resolution points, table, and
//! script.

use storyflow_core::{ChatMessage, Phase, Session};
use storyflow_engine::{Engine, MockGenerator, TurnIntent, GREETING};

fn turn(engine: &Engine, session: &mut Session, utterance: &str) -> String {
    engine
        .take_turn(session, utterance, TurnIntent::Unspecified)
        .unwrap_or_else(|e| panic!("turn {utterance:?} failed: {e}"))
        .reply
}

#[test]
fn full_wizard_walk() {
    let engine = Engine::new(Box::new(MockGenerator));
    let mut session = Session::new();
    session.history.push(ChatMessage::assistant(GREETING));

    // Concept + setup.
    let reply = turn(&engine, &mut session, "use the currently selected one");
    assert_eq!(reply, "What is your Audience?");
    turn(&engine, &mut session, "cardiologists");
    turn(&engine, &mut session, "orticumab");
    let reply = turn(&engine, &mut session, "atherosclerosis");

    // First attack point arrives with the setup's final answer.
    assert_eq!(session.phase, Phase::AttackPoint);
    assert_eq!(session.attack_points.len(), 1);
    assert!(reply.contains("Would you like to modify this Attack Point"));

    // Ask to modify: the backend asks what to change, nothing mutates.
    let reply = turn(&engine, &mut session, "modify");
    assert!(reply.contains("What modifications"));
    assert_eq!(session.attack_points.len(), 1);

    // The answer to the modification prompt rewrites the same point.
    let before = session.attack_points[0].text.clone();
    turn(&engine, &mut session, "use a younger patient example");
    assert_eq!(session.attack_points.len(), 1);
    assert_ne!(session.attack_points[0].text, before);

    // Move on: the backend asks for the narrative length.
    let reply = turn(&engine, &mut session, "move on to tension-resolution points");
    assert!(reply.contains("short narrative"));
    assert_eq!(session.phase, Phase::AttackPoint);

    // Choosing a length yields the outline.
    turn(&engine, &mut session, "short");
    assert_eq!(session.phase, Phase::TensionResolution);
    assert_eq!(session.points.len(), 3);
    assert!(session.conclusion.is_some());
    assert!(session.references.as_deref().is_some_and(|r| r.contains("Ridker")));
    // The derived table already mirrors the points.
    assert_eq!(session.table.beat_row_count(), 3);

    // Table request: the literal table replaces the derived one.
    turn(&engine, &mut session, "yes");
    assert_eq!(session.phase, Phase::Table);
    assert_eq!(session.table.beat_row_count(), 3);
    assert_eq!(session.table.rows.first().map(|r| r.label()), Some("AP".to_string()));

    // Script request: length question first, then the script itself.
    let reply = turn(&engine, &mut session, "yes");
    assert!(reply.contains("How long"));
    assert_eq!(session.phase, Phase::ScriptLength);

    turn(&engine, &mut session, "8");
    assert_eq!(session.phase, Phase::Script);
    assert!(session.script.as_deref().is_some_and(|s| s.contains("8 minutes")));

    // Every phase keeps accepting modification requests.
    turn(&engine, &mut session, "modify");
    assert_eq!(session.attack_points.len(), 1);

    // Reset returns everything to the initial state.
    session.reset();
    assert_eq!(session.phase, Phase::ConceptChoice);
    assert!(session.attack_points.is_empty());
    assert!(session.points.is_empty());
    assert!(session.script.is_none());
    assert!(session.table.is_empty());
}

#[test]
fn selection_export_after_outline() {
    let engine = Engine::new(Box::new(MockGenerator));
    let mut session = Session::new();
    turn(&engine, &mut session, "current");
    turn(&engine, &mut session, "cardiologists");
    turn(&engine, &mut session, "orticumab");
    turn(&engine, &mut session, "atherosclerosis");
    turn(&engine, &mut session, "move on");
    turn(&engine, &mut session, "short");

    session.toggle_beat(1);
    session.toggle_beat(3);

    let exported = session.export_selection();
    let labels: Vec<String> = exported.rows.iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec!["AP", "1", "2", "CSC"]);
    assert_eq!(exported.rows[2].tension(), session.points[2].tension);
}
