//! JSON persistence for sessions and saved outlines.
//!
//! Sessions are serialized whole after every completed turn; saved
//! outlines capture a selection snapshot for later export. One file per
//! record under the data directory; a corrupted file is skipped with a
//! warning during listing, never fatal.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use storyflow_core::{AttackPoint, Session, StoryContext, TensionResolutionPoint};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine a data directory for this platform")]
    NoDataDir,
    #[error("no record with id {0}")]
    NotFound(String),
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid record at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A selection snapshot saved for later export, mirroring what the
/// export surface needs: context, the chosen attack point, the chosen
/// points, and the closing material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedOutline {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub context: StoryContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_point: Option<AttackPoint>,
    #[serde(default)]
    pub points: Vec<TensionResolutionPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

impl SavedOutline {
    /// Snapshot the session's current selection.
    pub fn from_session(session: &Session) -> Self {
        let attack_point = session
            .selection
            .attack_point
            .and_then(|i| session.attack_points.iter().find(|ap| ap.index == i))
            .cloned();
        let points = session
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| session.selection.beats.contains(&((*i + 1) as u32)))
            .map(|(_, p)| p.clone())
            .collect();
        Self {
            id: Uuid::new_v4().to_string(),
            saved_at: Utc::now(),
            context: session.context.clone(),
            attack_point,
            points,
            conclusion: session.conclusion.clone(),
            references: session.references.clone(),
        }
    }
}

/// File-backed store rooted at a data directory.
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open the store at the platform data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("io", "storyflow", "storyflow").ok_or(StoreError::NoDataDir)?;
        Self::open(dirs.data_dir())
    }

    /// Open the store at an explicit root, creating it as needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        for sub in ["sessions", "outlines"] {
            let dir = root.join(sub);
            fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.root.join("sessions").join(format!("{id}.json"))
    }

    fn outline_path(&self, id: &str) -> PathBuf {
        self.root.join("outlines").join(format!("{id}.json"))
    }

    // ── Sessions ────────────────────────────────────────────────────────

    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        write_json(&self.session_path(&session.session_id), session)
    }

    pub fn load_session(&self, id: &str) -> Result<Session, StoreError> {
        read_json(&self.session_path(id), id)
    }

    pub fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        remove(&self.session_path(id), id)
    }

    /// All readable sessions, newest first. Unreadable files are
    /// skipped with a warning.
    pub fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let mut sessions: Vec<Session> = list_json(&self.root.join("sessions"))?;
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    // ── Saved outlines ──────────────────────────────────────────────────

    pub fn save_outline(&self, outline: &SavedOutline) -> Result<(), StoreError> {
        write_json(&self.outline_path(&outline.id), outline)
    }

    pub fn load_outline(&self, id: &str) -> Result<SavedOutline, StoreError> {
        read_json(&self.outline_path(id), id)
    }

    pub fn delete_outline(&self, id: &str) -> Result<(), StoreError> {
        remove(&self.outline_path(id), id)
    }

    pub fn list_outlines(&self) -> Result<Vec<SavedOutline>, StoreError> {
        let mut outlines: Vec<SavedOutline> = list_json(&self.root.join("outlines"))?;
        outlines.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(outlines)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path, id: &str) -> Result<T, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(id.to_string()));
    }
    let body = fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&body).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn remove(path: &Path, id: &str) -> Result<(), StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(id.to_string()));
    }
    fs::remove_file(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn list_json<T: for<'de> Deserialize<'de>>(dir: &Path) -> Result<Vec<T>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable record");
                continue;
            }
        };
        match serde_json::from_slice(&body) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping corrupted record");
            }
        }
    }
    Ok(records)
}
