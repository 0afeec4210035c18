use crate::config::CliConfig;
use crate::open_store;
use anyhow::{Context, Result};
use std::path::Path;
use storyflow_core::{OutlineTable, TableRow};
use storyflow_store::{SavedOutline, StoreError};

/// Export a saved outline (or a session's current selection) as a
/// markdown pipe table.
pub fn run_export(id: &str, out: Option<&Path>, config: &CliConfig) -> Result<()> {
    let store = open_store(config)?;

    let table = match store.load_outline(id) {
        Ok(outline) => outline_table(&outline),
        Err(StoreError::NotFound(_)) => store.load_session(id)?.export_selection(),
        Err(err) => return Err(err.into()),
    };

    let markdown = table.to_markdown();
    match out {
        Some(path) => {
            std::fs::write(path, &markdown)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(())
}

/// Project a saved outline into table rows: the attack point row when
/// one was selected, the saved points renumbered from 1, and the
/// conclusion row when present.
fn outline_table(outline: &SavedOutline) -> OutlineTable {
    let mut rows = Vec::new();
    if let Some(ap) = &outline.attack_point {
        rows.push(TableRow::Attack {
            tension: ap.text.clone(),
        });
    }
    for (i, point) in outline.points.iter().enumerate() {
        rows.push(TableRow::Beat {
            number: (i + 1) as u32,
            tension: point.tension.clone(),
            resolution: point.resolution.clone(),
        });
    }
    if let Some(conclusion) = outline.conclusion.as_deref() {
        if !conclusion.trim().is_empty() {
            rows.push(TableRow::Concept {
                resolution: conclusion.trim().to_string(),
            });
        }
    }
    OutlineTable { rows }
}
