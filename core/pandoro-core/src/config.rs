//! Configuration loading (`~/.pandororc`).
//!
//! ```json
//! {
//!   "type": "trello",
//!   "key": "...", "token": "...",
//!   "todo-list": "...", "done-list": "...",
//!   "work-minutes": 25, "break-minutes": 5
//! }
//! ```
//!
//! `type` defaults to `trello`. A Google setup uses `"type": "google"` with
//! `list-id` and optionally `token-file`.

use fs_err as fs;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PandoroError, Result};
use crate::state::SlotDurations;
use crate::storage::StorageConfig;

/// API key and token, enough to browse boards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrelloCredentials {
    pub key: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrelloConfig {
    pub credentials: TrelloCredentials,
    pub todo_list: String,
    pub done_list: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub list_id: String,
    pub token_file: PathBuf,
}

/// Which task provider backs the to-do list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    Trello(TrelloConfig),
    Google(GoogleConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: ProviderConfig,
    pub durations: SlotDurations,
    /// Icon path for Alfred list items.
    pub alfred_icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    #[serde(rename = "type")]
    provider_type: Option<String>,
    key: Option<String>,
    token: Option<String>,
    todo_list: Option<String>,
    done_list: Option<String>,
    list_id: Option<String>,
    token_file: Option<String>,
    work_minutes: Option<u32>,
    break_minutes: Option<u32>,
    alfred_icon: Option<String>,
}

fn required(
    value: Option<String>,
    key: &'static str,
    provider: &'static str,
) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(PandoroError::ConfigMissingKey { key, provider })
}

fn minutes(value: Option<u32>, default_secs: i64, key: &str, path: &Path) -> Result<i64> {
    match value {
        None => Ok(default_secs),
        Some(0) => Err(PandoroError::ConfigMalformed {
            path: path.to_path_buf(),
            details: format!("{} must be greater than zero", key),
        }),
        Some(m) => Ok(i64::from(m) * 60),
    }
}

fn trello_credentials(key: Option<String>, token: Option<String>) -> Result<TrelloCredentials> {
    Ok(TrelloCredentials {
        key: required(key, "key", "trello")?,
        token: required(token, "token", "trello")?,
    })
}

fn read_config_file(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(PandoroError::ConfigNotFound(path.to_path_buf()))
        }
        Err(source) => Err(PandoroError::Io {
            context: "Failed to read configuration".to_string(),
            source,
        }),
    }
}

fn parse_raw(content: &str, path: &Path) -> Result<RawConfig> {
    serde_json::from_str(content).map_err(|e| PandoroError::ConfigMalformed {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

/// Reads only the Trello key and token, for looking up board list ids
/// before `todo-list`/`done-list` are configured.
pub fn load_trello_credentials(storage: &StorageConfig) -> Result<TrelloCredentials> {
    let path = storage.config_file();
    let raw = parse_raw(&read_config_file(&path)?, &path)?;
    match raw.provider_type.as_deref().unwrap_or("trello") {
        "trello" => trello_credentials(raw.key, raw.token),
        _ => Err(PandoroError::Unsupported {
            provider: "google",
            operation: "listing Trello boards",
        }),
    }
}

impl Config {
    /// Loads the configuration file named by `storage`.
    pub fn load(storage: &StorageConfig) -> Result<Self> {
        let path = storage.config_file();
        Self::parse(&read_config_file(&path)?, &path, storage)
    }

    /// Parses configuration text. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path, storage: &StorageConfig) -> Result<Self> {
        let raw = parse_raw(content, path)?;

        let provider_type = raw.provider_type.as_deref().unwrap_or("trello");
        let provider = match provider_type {
            "trello" => ProviderConfig::Trello(TrelloConfig {
                credentials: trello_credentials(raw.key, raw.token)?,
                todo_list: required(raw.todo_list, "todo-list", "trello")?,
                done_list: required(raw.done_list, "done-list", "trello")?,
            }),
            "google" => ProviderConfig::Google(GoogleConfig {
                list_id: required(raw.list_id, "list-id", "google")?,
                token_file: raw
                    .token_file
                    .as_deref()
                    .map(|p| storage.expand(p))
                    .unwrap_or_else(|| storage.google_token_file()),
            }),
            other => return Err(PandoroError::UnknownProvider(other.to_string())),
        };

        let durations = SlotDurations {
            work: minutes(raw.work_minutes, SlotDurations::default().work, "work-minutes", path)?,
            brk: minutes(raw.break_minutes, SlotDurations::default().brk, "break-minutes", path)?,
        };

        Ok(Config {
            provider,
            durations,
            alfred_icon: raw.alfred_icon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage() -> StorageConfig {
        StorageConfig::with_home(PathBuf::from("/home/me"))
    }

    fn parse(content: &str) -> Result<Config> {
        Config::parse(content, Path::new("/home/me/.pandororc"), &storage())
    }

    #[test]
    fn test_type_defaults_to_trello() {
        let config =
            parse(r#"{"key":"k","token":"t","todo-list":"todo","done-list":"done"}"#).unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Trello(TrelloConfig {
                credentials: TrelloCredentials {
                    key: "k".into(),
                    token: "t".into(),
                },
                todo_list: "todo".into(),
                done_list: "done".into(),
            })
        );
        assert_eq!(config.durations, SlotDurations::default());
        assert_eq!(config.alfred_icon, None);
    }

    #[test]
    fn test_google_uses_default_token_file() {
        let config = parse(r#"{"type":"google","list-id":"L1"}"#).unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Google(GoogleConfig {
                list_id: "L1".into(),
                token_file: PathBuf::from("/home/me/.config/pandoro/token.json"),
            })
        );
    }

    #[test]
    fn test_google_token_file_override_expands_tilde() {
        let config =
            parse(r#"{"type":"google","list-id":"L1","token-file":"~/tok.json"}"#).unwrap();
        match config.provider {
            ProviderConfig::Google(google) => {
                assert_eq!(google.token_file, PathBuf::from("/home/me/tok.json"))
            }
            other => panic!("expected google provider, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_names_the_key() {
        let err = parse(r#"{"key":"k","token":"t","todo-list":"todo"}"#).unwrap_err();
        assert!(matches!(
            err,
            PandoroError::ConfigMissingKey {
                key: "done-list",
                provider: "trello"
            }
        ));
        assert!(err.is_config());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let err = parse(r#"{"type":"google","list-id":"  "}"#).unwrap_err();
        assert!(matches!(err, PandoroError::ConfigMissingKey { key: "list-id", .. }));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = parse(r#"{"type":"asana"}"#).unwrap_err();
        assert!(matches!(err, PandoroError::UnknownProvider(ref t) if t == "asana"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = parse("{not json").unwrap_err();
        assert!(matches!(err, PandoroError::ConfigMalformed { .. }));
    }

    #[test]
    fn test_duration_overrides() {
        let config = parse(
            r#"{"type":"google","list-id":"L","work-minutes":50,"break-minutes":10,"alfred-icon":"/icons/panda.png"}"#,
        )
        .unwrap();
        assert_eq!(config.durations, SlotDurations { work: 3000, brk: 600 });
        assert_eq!(config.alfred_icon.as_deref(), Some("/icons/panda.png"));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = parse(r#"{"type":"google","list-id":"L","work-minutes":0}"#).unwrap_err();
        assert!(matches!(err, PandoroError::ConfigMalformed { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_home(temp.path().to_path_buf());
        let err = Config::load(&storage).unwrap_err();
        assert!(matches!(err, PandoroError::ConfigNotFound(_)));
    }

    #[test]
    fn test_trello_credentials_without_lists() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_home(temp.path().to_path_buf());
        std::fs::write(storage.config_file(), r#"{"key":"k","token":"t"}"#).unwrap();

        assert!(Config::load(&storage).is_err());
        assert_eq!(
            load_trello_credentials(&storage).unwrap(),
            TrelloCredentials {
                key: "k".into(),
                token: "t".into()
            }
        );
    }

    #[test]
    fn test_trello_credentials_rejected_for_google() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_home(temp.path().to_path_buf());
        std::fs::write(storage.config_file(), r#"{"type":"google","list-id":"L"}"#).unwrap();

        let err = load_trello_credentials(&storage).unwrap_err();
        assert!(matches!(err, PandoroError::Unsupported { .. }));
    }

    #[test]
    fn test_load_reads_pandororc() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_home(temp.path().to_path_buf());
        std::fs::write(
            storage.config_file(),
            r#"{"type":"google","list-id":"L"}"#,
        )
        .unwrap();

        let config = Config::load(&storage).unwrap();
        assert!(matches!(config.provider, ProviderConfig::Google(_)));
    }
}
