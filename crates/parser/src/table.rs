//! Literal markdown pipe-table detection and parsing.

use storyflow_core::{OutlineTable, TableRow};
use tracing::debug;

/// Find the first contiguous block of pipe-table lines in a response.
///
/// A table line begins and ends with `|`; a block needs at least two such
/// lines (header plus one more) to count.
pub fn find_table_block(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.lines().collect();
    let mut start = None;
    for (i, line) in lines.iter().enumerate() {
        if is_table_line(line) {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start {
            if i - s >= 2 {
                return Some(lines[s..i].join("\n"));
            }
            start = None;
        }
    }
    match start {
        Some(s) if lines.len() - s >= 2 => Some(lines[s..].join("\n")),
        _ => None,
    }
}

fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

/// True for the `|---|---|` style separator row.
fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim().trim_start_matches('|').trim_end_matches('|');
    trimmed.split('|').map(|c| c.trim().to_string()).collect()
}

/// Parse a pipe-table block into outline rows.
///
/// The first line is the header row and is skipped, as are separator
/// rows. Every data row is normalized to exactly three columns (padded
/// with empty strings or truncated). First-column values map into the
/// row union: "AP", a number, "CSC"; anything else becomes a numbered
/// row at its position so the row-count invariant still holds.
pub fn parse_table(block: &str) -> OutlineTable {
    let mut rows = Vec::new();
    let mut beat_number = 0u32;

    for (i, line) in block.lines().enumerate() {
        if i == 0 {
            continue;
        }
        let mut cells = split_cells(line);
        if is_separator_row(&cells) {
            continue;
        }
        cells.resize(3, String::new());
        cells.truncate(3);

        let label = cells[0].clone();
        if label.eq_ignore_ascii_case("ap") {
            rows.push(TableRow::Attack {
                tension: cells[1].clone(),
            });
        } else if label.to_ascii_uppercase().starts_with("CSC") {
            // A "CSC <text>" first cell carries its trailing text in the
            // resolution column; the label itself stays bare.
            let trailing = label[3..].trim().to_string();
            let resolution = if cells[2].is_empty() {
                trailing
            } else {
                cells[2].clone()
            };
            rows.push(TableRow::Concept { resolution });
        } else if let Ok(number) = label.parse::<u32>() {
            beat_number = number;
            rows.push(TableRow::Beat {
                number,
                tension: cells[1].clone(),
                resolution: cells[2].clone(),
            });
        } else {
            beat_number += 1;
            debug!(label = %label, "unlabeled table row, numbering by position");
            rows.push(TableRow::Beat {
                number: beat_number,
                tension: cells[1].clone(),
                resolution: cells[2].clone(),
            });
        }
    }

    OutlineTable { rows }
}
