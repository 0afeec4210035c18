use crate::config::CliConfig;
use crate::open_store;
use anyhow::Result;

pub fn run_list(config: &CliConfig) -> Result<()> {
    let store = open_store(config)?;

    let sessions = store.list_sessions()?;
    println!("Sessions ({}):", sessions.len());
    for session in &sessions {
        println!(
            "  {}  {}  phase: {}, attack points: {}, points: {}",
            session.session_id,
            session.updated_at.format("%Y-%m-%d %H:%M"),
            session.phase.display(),
            session.attack_points.len(),
            session.points.len(),
        );
    }

    let outlines = store.list_outlines()?;
    println!();
    println!("Saved outlines ({}):", outlines.len());
    for outline in &outlines {
        println!(
            "  {}  {}  audience: {}, points: {}",
            outline.id,
            outline.saved_at.format("%Y-%m-%d %H:%M"),
            outline.context.audience,
            outline.points.len(),
        );
    }

    Ok(())
}
