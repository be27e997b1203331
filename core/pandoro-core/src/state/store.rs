//! File-backed session state persistence.
//!
//! # Defensive Design
//!
//! The state file is a cache of the provider's task list plus a few session
//! fields, so anything unreadable is treated like a missing file instead of
//! failing the invocation:
//! - Missing file (first run) → `None`
//! - Empty file → `None`, log warning
//! - Corrupt JSON or wrong shape → `None`, log warning
//!
//! A saved state with no tasks and no timer is still `Some`. Only genuine I/O
//! failures (permissions, disk errors) are reported.
//!
//! # Atomic Writes
//!
//! Saves go through [`crate::atomic::write_atomic`]. Concurrent invocations are
//! not locked against each other; the last completed save wins.

use fs_err as fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::atomic::write_atomic;
use crate::error::{PandoroError, Result};

use super::types::{SessionState, StateFile};

pub struct StateStore {
    file_path: PathBuf,
}

impl StateStore {
    pub fn new(file_path: &Path) -> Self {
        StateStore {
            file_path: file_path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// The saved state, or `None` when there is no usable file.
    pub fn load(&self) -> Result<Option<SessionState>> {
        let content = match fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.file_path.display(), "No state file");
                return Ok(None);
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                tracing::warn!(error = %err, "State file is not UTF-8, ignoring it");
                return Ok(None);
            }
            Err(source) => {
                return Err(PandoroError::Io {
                    context: "Failed to read state file".to_string(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            tracing::warn!(path = %self.file_path.display(), "Empty state file, ignoring it");
            return Ok(None);
        }

        match serde_json::from_str::<StateFile>(&content) {
            Ok(file) => Ok(Some(SessionState::from(file))),
            Err(e) => {
                tracing::warn!(
                    path = %self.file_path.display(),
                    error = %e,
                    "Failed to parse state file, ignoring it"
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        let content =
            serde_json::to_vec(&StateFile::from(state)).map_err(|source| PandoroError::Json {
                context: "Failed to serialize state".to_string(),
                source,
            })?;

        write_atomic(&self.file_path, &content)?;
        tracing::debug!(
            path = %self.file_path.display(),
            status = ?state.status(),
            current = ?state.current,
            tasks = state.tasks.len(),
            "State saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::{Slot, SlotKind};
    use tempfile::tempdir;

    fn sample_state() -> SessionState {
        SessionState {
            current: Some("b".to_string()),
            slot: Some(Slot {
                kind: SlotKind::Work,
                started_at: 1_704_067_200,
            }),
            tasks: [("c", "Third"), ("a", "First"), ("b", "Second")]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_persistence_round_trip() {
        let temp = tempdir().unwrap();
        let store = StateStore::new(&temp.path().join("state.json"));

        store.save(&sample_state()).unwrap();

        assert_eq!(store.load().unwrap(), Some(sample_state()));
    }

    #[test]
    fn test_load_nonexistent_file_returns_none() {
        let temp = tempdir().unwrap();
        let store = StateStore::new(&temp.path().join("nonexistent.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_load_empty_file_returns_none() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("empty.json");
        std::fs::write(&file, "  \n").unwrap();

        assert_eq!(StateStore::new(&file).load().unwrap(), None);
    }

    #[test]
    fn test_load_corrupt_json_returns_none() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("corrupt.json");
        std::fs::write(&file, "{invalid json}").unwrap();

        assert_eq!(StateStore::new(&file).load().unwrap(), None);
    }

    #[test]
    fn test_load_wrong_shape_returns_none() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("shape.json");
        std::fs::write(&file, r#"{"tasks":["not","a","map"]}"#).unwrap();

        assert_eq!(StateStore::new(&file).load().unwrap(), None);
    }

    #[test]
    fn test_load_reads_files_written_by_older_versions() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("pandoro");
        std::fs::write(
            &file,
            r#"{"current": "a", "status": "break", "time": 42, "tasks": {"a": "Write", "b": "Read"}}"#,
        )
        .unwrap();

        let state = StateStore::new(&file).load().unwrap().unwrap();
        assert_eq!(state.current.as_deref(), Some("a"));
        assert_eq!(
            state.slot,
            Some(Slot {
                kind: SlotKind::Break,
                started_at: 42
            })
        );
        assert_eq!(state.tasks.title("b"), Some("Read"));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp = tempdir().unwrap();
        let store = StateStore::new(&temp.path().join("state.json"));

        store.save(&sample_state()).unwrap();
        store.save(&SessionState::default()).unwrap();

        let count = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(count, 1);
        assert_eq!(store.load().unwrap(), Some(SessionState::default()));
    }
}
