use crate::config::CliConfig;
use crate::open_store;
use anyhow::Result;

pub fn run_show(id: &str, config: &CliConfig) -> Result<()> {
    let store = open_store(config)?;
    let mut session = store.load_session(id)?;

    println!("Session {}", session.session_id);
    println!("Phase: {}", session.phase.display());
    println!();
    println!("Audience: {}", session.context.audience);
    println!("Intervention: {}", session.context.intervention_name);
    println!("Disease/Condition: {}", session.context.disease_condition);
    if !session.context.core_story_concept.is_empty() {
        println!("Core Story Concept: {}", session.context.core_story_concept);
    }

    for ap in &session.attack_points {
        let marker = if session.selection.attack_point == Some(ap.index) {
            "*"
        } else {
            " "
        };
        println!();
        println!("{marker} Attack Point #{}", ap.index);
        println!("  {}", ap.text);
    }

    for (i, point) in session.points.iter().enumerate() {
        let index = (i + 1) as u32;
        let marker = if session.selection.beats.contains(&index) {
            "*"
        } else {
            " "
        };
        println!();
        println!("{marker} Tension-Resolution #{index}: {}", point.headline);
        println!("  Tension: {}", point.tension);
        println!("  Resolution: {}", point.resolution);
    }

    if let Some(conclusion) = &session.conclusion {
        println!();
        println!("Conclusion: {conclusion}");
    }
    if let Some(references) = &session.references {
        println!();
        println!("References:");
        println!("{references}");
    }

    session.ensure_table();
    if !session.table.is_empty() {
        println!();
        print!("{}", session.table.to_markdown());
    }

    if session.script.is_some() {
        println!();
        println!("(a talk script is available; export it with the chat's /export)");
    }

    Ok(())
}
