//! Error types for pandoro-core operations.

use std::path::PathBuf;

/// All errors that can occur in pandoro-core operations.
///
/// Corrupt state files are not represented here: the store treats them as
/// missing, and the session rebuilds the task list from the provider.
#[derive(Debug, thiserror::Error)]
pub enum PandoroError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Configuration file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration key missing: {key} (required by the {provider} provider)")]
    ConfigMissingKey {
        key: &'static str,
        provider: &'static str,
    },

    #[error("Unknown provider type in configuration: {0}")]
    UnknownProvider(String),

    #[error("Google token file unusable: {path}: {details}")]
    TokenFile { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Provider Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Provider request failed: {context}: {details}")]
    ProviderTransport { context: String, details: String },

    #[error("Provider rejected request: {context}: HTTP {status}: {body}")]
    ProviderStatus {
        context: String,
        status: u16,
        body: String,
    },

    #[error("Provider response malformed: {context}: {details}")]
    ProviderResponse { context: String, details: String },

    /// The task was marked completed but the follow-up clear failed.
    /// The remote list still shows it as a completed item.
    #[error("Task {task_id} was marked completed but clearing completed tasks failed: {details}")]
    PartialCompletion { task_id: String, details: String },

    #[error("Operation not supported by the {provider} provider: {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Desktop Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Desktop command failed: {command}: {details}")]
    Desktop { command: String, details: String },
}

impl PandoroError {
    /// True for errors caused by the configuration rather than by a command.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PandoroError::HomeDirNotFound
                | PandoroError::ConfigNotFound(_)
                | PandoroError::ConfigMalformed { .. }
                | PandoroError::ConfigMissingKey { .. }
                | PandoroError::UnknownProvider(_)
                | PandoroError::TokenFile { .. }
        )
    }

    /// True for any failure reported by, or while talking to, the task provider.
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            PandoroError::ProviderTransport { .. }
                | PandoroError::ProviderStatus { .. }
                | PandoroError::ProviderResponse { .. }
                | PandoroError::PartialCompletion { .. }
        )
    }
}

/// Convenience type alias for Results using PandoroError.
pub type Result<T> = std::result::Result<T, PandoroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(PandoroError::UnknownProvider("asana".into()).is_config());
        assert!(!PandoroError::UnknownProvider("asana".into()).is_provider());

        let err = PandoroError::ProviderStatus {
            context: "fetch cards".into(),
            status: 401,
            body: "invalid key".into(),
        };
        assert!(err.is_provider());
        assert_eq!(
            err.to_string(),
            "Provider rejected request: fetch cards: HTTP 401: invalid key"
        );
    }
}
