use crate::outline::{AttackPoint, ChatMessage, StoryContext, TensionResolutionPoint};
use crate::phase::Phase;
use crate::table::{OutlineTable, TableRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Export selection: at most one attack point, any subset of
/// tension-resolution points. Indices are 1-based.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_point: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub beats: BTreeSet<u32>,
}

/// The aggregate root for one guided conversation.
///
/// Owns every outline collection; all mutation goes through the operation
/// surface below, once per conversational turn. `reset` returns every
/// field to its initial empty state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    #[serde(default)]
    pub context: StoryContext,
    #[serde(default)]
    pub attack_points: Vec<AttackPoint>,
    #[serde(default)]
    pub points: Vec<TensionResolutionPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    #[serde(default)]
    pub table: OutlineTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            context: StoryContext::default(),
            attack_points: Vec::new(),
            points: Vec::new(),
            conclusion: None,
            references: None,
            table: OutlineTable::default(),
            script: None,
            selection: Selection::default(),
            phase: Phase::default(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Append a new attack point and select it as current.
    pub fn add_attack_point(&mut self, text: impl Into<String>) {
        let index = self.attack_points.len() as u32 + 1;
        self.attack_points.push(AttackPoint {
            index,
            text: text.into(),
        });
        self.selection.attack_point = Some(index);
        self.touch();
    }

    /// Replace the text of the most recent attack point in place.
    /// Earlier entries are never altered; no-op when the list is empty.
    pub fn modify_last_attack_point(&mut self, text: impl Into<String>) {
        if let Some(last) = self.attack_points.last_mut() {
            last.text = text.into();
            self.touch();
        }
    }

    /// Wholesale replace the tension-resolution list. The backend returns
    /// the complete current set each turn, never a delta.
    pub fn set_points(&mut self, points: Vec<TensionResolutionPoint>) {
        self.points = points;
        self.touch();
    }

    pub fn set_conclusion(&mut self, text: impl Into<String>) {
        self.conclusion = Some(text.into());
        self.touch();
    }

    pub fn set_references(&mut self, text: impl Into<String>) {
        self.references = Some(text.into());
        self.touch();
    }

    pub fn set_script(&mut self, text: impl Into<String>) {
        self.script = Some(text.into());
        self.touch();
    }

    /// Install a table parsed directly from a backend response.
    pub fn set_table(&mut self, table: OutlineTable) {
        self.table = table;
        self.touch();
    }

    // ── Selection surface ───────────────────────────────────────────────

    /// Select an attack point for export. Exclusive: replaces any prior
    /// attack-point selection. Out-of-range indices are ignored.
    pub fn select_attack_point(&mut self, index: u32) {
        if self.attack_points.iter().any(|ap| ap.index == index) {
            self.selection.attack_point = Some(index);
        }
    }

    pub fn deselect_attack_point(&mut self) {
        self.selection.attack_point = None;
    }

    /// Toggle a tension-resolution point in the export selection.
    /// Out-of-range indices are ignored.
    pub fn toggle_beat(&mut self, index: u32) {
        if index == 0 || index as usize > self.points.len() {
            return;
        }
        if !self.selection.beats.remove(&index) {
            self.selection.beats.insert(index);
        }
    }

    // ── Table invariant ─────────────────────────────────────────────────

    /// True when the table's numbered rows no longer mirror the
    /// tension-resolution list.
    pub fn table_out_of_sync(&self) -> bool {
        self.table.beat_row_count() != self.points.len()
    }

    /// Rebuild the table from the source collections when the row-count
    /// invariant is violated. Self-healing; never an error.
    pub fn ensure_table(&mut self) {
        if self.table_out_of_sync() {
            self.rebuild_table();
        }
    }

    /// Unconditionally re-derive the table from the source collections.
    pub fn rebuild_table(&mut self) {
        self.table = OutlineTable::derive(
            &self.attack_points,
            self.selection.attack_point,
            &self.points,
            self.conclusion.as_deref(),
        );
        self.touch();
    }

    // ── Export ──────────────────────────────────────────────────────────

    /// Project the current selection into a table: the AP row when an
    /// attack point is selected, the selected tension-resolution rows
    /// renumbered densely from 1 in their original order, and the CSC row
    /// whenever a conclusion exists.
    pub fn export_selection(&self) -> OutlineTable {
        let mut rows = Vec::new();

        if let Some(index) = self.selection.attack_point {
            if let Some(ap) = self.attack_points.iter().find(|ap| ap.index == index) {
                rows.push(TableRow::Attack {
                    tension: ap.text.clone(),
                });
            }
        }

        let mut number = 0u32;
        for (i, point) in self.points.iter().enumerate() {
            if self.selection.beats.contains(&((i + 1) as u32)) {
                number += 1;
                rows.push(TableRow::Beat {
                    number,
                    tension: point.tension.clone(),
                    resolution: point.resolution.clone(),
                });
            }
        }

        if let Some(conclusion) = self.conclusion.as_deref() {
            if !conclusion.trim().is_empty() {
                rows.push(TableRow::Concept {
                    resolution: conclusion.trim().to_string(),
                });
            }
        }

        OutlineTable { rows }
    }

    /// Clear every collection and return the phase to its initial value.
    pub fn reset(&mut self) {
        self.context = StoryContext::default();
        self.attack_points.clear();
        self.points.clear();
        self.conclusion = None;
        self.references = None;
        self.table = OutlineTable::default();
        self.script = None;
        self.selection = Selection::default();
        self.phase = Phase::ConceptChoice;
        self.history.clear();
        self.touch();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
