//! Storage configuration and path management for Pandoro.
//!
//! Every file the tool touches is resolved here so that tests can point the
//! whole tool at a temporary home directory with [`StorageConfig::with_home`].
//!
//! ```text
//! ~/.pandororc                   configuration (JSON)
//! ~/.pandoro/state.json          session state
//! ~/.pandoro/logs/               log files
//! ~/.config/pandoro/token.json   Google authorized-user token
//! ```

use std::path::{Path, PathBuf};

use crate::error::{PandoroError, Result};

/// Central configuration for all Pandoro storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    home: PathBuf,
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves paths under the current user's home directory.
    pub fn from_home_dir() -> Result<Self> {
        let home = dirs::home_dir().ok_or(PandoroError::HomeDirNotFound)?;
        Ok(Self::with_home(home))
    }

    /// Creates a StorageConfig rooted at a custom home directory.
    /// Used for testing with temp directories.
    pub fn with_home(home: PathBuf) -> Self {
        let root = home.join(".pandoro");
        Self { home, root }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Root directory for Pandoro data (default: ~/.pandoro).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the configuration file (~/.pandororc).
    pub fn config_file(&self) -> PathBuf {
        self.home.join(".pandororc")
    }

    /// Path to state.json (current task, timer slot, task snapshot).
    pub fn state_file(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Default location of the Google authorized-user token.
    pub fn google_token_file(&self) -> PathBuf {
        self.home.join(".config").join("pandoro").join("token.json")
    }

    /// Expands a leading `~/` against the configured home directory.
    pub fn expand(&self, path: &str) -> PathBuf {
        match path.strip_prefix("~/") {
            Some(rest) => self.home.join(rest),
            None => PathBuf::from(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_hang_off_home() {
        let storage = StorageConfig::with_home(PathBuf::from("/home/me"));
        assert_eq!(storage.config_file(), PathBuf::from("/home/me/.pandororc"));
        assert_eq!(
            storage.state_file(),
            PathBuf::from("/home/me/.pandoro/state.json")
        );
        assert_eq!(storage.logs_dir(), PathBuf::from("/home/me/.pandoro/logs"));
        assert_eq!(
            storage.google_token_file(),
            PathBuf::from("/home/me/.config/pandoro/token.json")
        );
    }

    #[test]
    fn test_expand_tilde() {
        let storage = StorageConfig::with_home(PathBuf::from("/home/me"));
        assert_eq!(
            storage.expand("~/secrets/token.json"),
            PathBuf::from("/home/me/secrets/token.json")
        );
        assert_eq!(storage.expand("/etc/token.json"), PathBuf::from("/etc/token.json"));
    }
}
