use crate::outline::{AttackPoint, TensionResolutionPoint};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// One row of the tabular outline projection.
///
/// A closed union: the attack-point row (label "AP"), the numbered
/// tension-resolution rows, and the core-story-concept row (label "CSC").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableRow {
    Attack {
        tension: String,
    },
    Beat {
        number: u32,
        tension: String,
        resolution: String,
    },
    Concept {
        resolution: String,
    },
}

impl TableRow {
    pub fn label(&self) -> String {
        match self {
            Self::Attack { .. } => "AP".to_string(),
            Self::Beat { number, .. } => number.to_string(),
            Self::Concept { .. } => "CSC".to_string(),
        }
    }

    pub fn tension(&self) -> &str {
        match self {
            Self::Attack { tension } | Self::Beat { tension, .. } => tension,
            Self::Concept { .. } => "",
        }
    }

    pub fn resolution(&self) -> &str {
        match self {
            Self::Attack { .. } => "",
            Self::Beat { resolution, .. } | Self::Concept { resolution } => resolution,
        }
    }
}

/// Derived tabular projection of the outline.
///
/// Invariant: the number of `Beat` rows equals the number of
/// tension-resolution points in the owning session. A violation is
/// repaired by a full rebuild, never surfaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutlineTable {
    pub rows: Vec<TableRow>,
}

static ATTACK_HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\**\s*attack point\s*#?\d*\s*\**:?\s*$").expect("attack header pattern")
});

static FOLLOW_UP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^would you like\b").expect("follow-up pattern"));

/// Strip a leading "Attack Point #N" header line and a trailing
/// follow-up question line if either survived into the stored text.
fn strip_attack_decoration(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    if lines
        .first()
        .is_some_and(|l| ATTACK_HEADER_LINE.is_match(l.trim()))
    {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines
        .last()
        .is_some_and(|l| FOLLOW_UP_LINE.is_match(l.trim()))
    {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

impl OutlineTable {
    /// Rebuild the table from the source collections.
    ///
    /// Row 0 carries the attack point (the selected one when a selection
    /// exists, otherwise the most recent), rows 1..N mirror the
    /// tension-resolution points in order, and the final row carries the
    /// conclusion. Idempotent: deriving twice yields identical tables.
    pub fn derive(
        attack_points: &[AttackPoint],
        selected_attack: Option<u32>,
        points: &[TensionResolutionPoint],
        conclusion: Option<&str>,
    ) -> Self {
        let attack_text = selected_attack
            .and_then(|index| attack_points.iter().find(|ap| ap.index == index))
            .or_else(|| attack_points.last())
            .map(|ap| strip_attack_decoration(&ap.text))
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(points.len() + 2);
        rows.push(TableRow::Attack {
            tension: attack_text,
        });
        for (i, point) in points.iter().enumerate() {
            rows.push(TableRow::Beat {
                number: (i + 1) as u32,
                tension: point.tension.clone(),
                resolution: point.resolution.clone(),
            });
        }
        rows.push(TableRow::Concept {
            resolution: conclusion.unwrap_or_default().trim().to_string(),
        });

        Self { rows }
    }

    pub fn beat_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, TableRow::Beat { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a markdown pipe table in the outline's display format.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("| # | Tension | Resolution |\n|---|---------|------------|\n");
        for row in &self.rows {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                row.label(),
                row.tension(),
                row.resolution()
            ));
        }
        out
    }
}
