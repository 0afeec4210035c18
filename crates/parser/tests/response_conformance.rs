//! Conformance tests over full-shaped backend responses, as the wizard
//! actually receives them.

use storyflow_core::Phase;
use storyflow_parser::{classify, normalize, parse_response, ClassifyContext, ClassifyOptions, SegmentKind};

fn ctx(attack_point_count: usize, phase: Phase) -> ClassifyContext {
    ClassifyContext {
        attack_point_count,
        phase,
    }
}

const ATTACK_RESPONSE: &str = "Attack Point #1\n\nIn the cardiac catheterization lab, the angiogram showed three patent stents and a patient back with another acute coronary syndrome eighteen months later. Every guideline target had been met, yet the culprit plaque was still inflamed.\n\nWould you like to modify this Attack Point, create a new one, or move on to creating tension-resolution points?";

const OUTLINE_RESPONSE: &str = "**Tension-Resolution #1:** Inflammation Beyond Lipids\nTension: Despite optimal lipid lowering, patients with established disease keep having events.\nResolution: Persistent plaque inflammation emerges as the missing driver of recurrence.\n\n---\n\n**Tension-Resolution #2:** The Macrophage Dilemma\nTension: Pro-inflammatory macrophages destabilize plaque from within.\nResolution: Targeting macrophage activation inside the plaque addresses the residual risk.\n\n---\n\n**Tension-Resolution #3:** Precision Anti-Inflammatory Therapy\nTension: Systemic immunosuppression is too blunt an instrument for prevention.\nResolution: A plaque-targeted antibody quiets inflammation while sparing host defense.\n\n---\n\n**Conclusion**\nTreating the inflammation, not only the cholesterol, closes the gap that guideline care leaves open.\n\nReferences\n\n1. Ridker PM, et al. Antiinflammatory therapy for atherosclerotic disease. *N Engl J Med.* 2017;377:1119-1131.\n2. Libby P, et al. Inflammation in atherosclerosis. *J Am Coll Cardiol.* 2018;72:2071-2081.\n\nWould you like the tension-resolution points put into a table format?";

const TABLE_RESPONSE: &str = "| # | Tension | Resolution |\n|---|---------|------------|\n| AP | The angiogram showed three patent stents and another event anyway. | |\n| 1 | Despite optimal lipid lowering, events keep happening. | Plaque inflammation is the missing driver. |\n| 2 | Macrophages destabilize plaque from within. | Target activation inside the plaque. |\n| CSC | | Treating the inflammation closes the gap guideline care leaves open. |\n\nWould you like me to write a script based on the above story flow outline that would be suitable for a highly engaging TED talk?";

#[test]
fn attack_response_parses_to_one_clean_attack_point() {
    let parsed = parse_response(
        ATTACK_RESPONSE,
        &ctx(0, Phase::AttackPoint),
        &ClassifyOptions::default(),
    );

    let text = parsed.attack_point.expect("attack point");
    assert!(text.starts_with("In the cardiac catheterization lab"));
    assert!(!text.contains("Attack Point #"));
    assert!(!text.contains("Would you like"));
    assert!(parsed.follow_up.is_some());
    assert!(parsed.points.is_empty());
}

#[test]
fn outline_response_parses_points_conclusion_and_references() {
    let parsed = parse_response(
        OUTLINE_RESPONSE,
        &ctx(1, Phase::TensionResolution),
        &ClassifyOptions::default(),
    );

    assert_eq!(parsed.points.len(), 3);
    assert_eq!(parsed.points[0].headline, "Inflammation Beyond Lipids");
    assert!(parsed.points[1].tension.starts_with("Pro-inflammatory"));
    assert!(parsed.points[2].resolution.starts_with("A plaque-targeted"));

    let conclusion = parsed.conclusion.expect("conclusion");
    assert!(conclusion.starts_with("Treating the inflammation"));
    assert!(!conclusion.contains("References"));

    let references = parsed.references.expect("references");
    assert!(references.contains("Ridker PM"));
    assert!(references.contains("Libby P"));

    assert!(
        parsed
            .follow_up
            .is_some_and(|q| q.contains("table format"))
    );
}

#[test]
fn table_response_short_circuits_classification() {
    let segments = classify(
        TABLE_RESPONSE,
        &ctx(1, Phase::TensionResolution),
        &ClassifyOptions::default(),
    );
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].kind, SegmentKind::Table);

    let parsed = parse_response(
        TABLE_RESPONSE,
        &ctx(1, Phase::TensionResolution),
        &ClassifyOptions::default(),
    );
    let table = parsed.table.expect("table");
    assert_eq!(table.rows.len(), 4);
    assert_eq!(table.beat_row_count(), 2);
    assert_eq!(table.rows[0].label(), "AP");
    assert_eq!(table.rows[3].label(), "CSC");
    assert!(parsed.attack_point.is_none());
    assert!(parsed.conclusion.is_none());
}

#[test]
fn script_response_is_captured_whole() {
    let raw = "# Talk Script: The Hidden Enemy in Your Arteries\n\nRaise your hand if you know someone who has had a heart attack. Keep it up if they had another one, despite doing everything right.\n\nThat is because we have been fighting only half the battle.";
    let parsed = parse_response(raw, &ctx(1, Phase::ScriptLength), &ClassifyOptions::default());
    let script = parsed.script.expect("script");
    assert!(script.contains("half the battle"));
    assert!(parsed.attack_point.is_none());
}

#[test]
fn normalize_is_a_fixed_point_over_real_responses() {
    for raw in [ATTACK_RESPONSE, OUTLINE_RESPONSE, TABLE_RESPONSE] {
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }
}
