//! Google Tasks backend.
//!
//! Authentication uses an authorized-user token file (the format written by
//! Google's client libraries after the OAuth consent flow):
//!
//! ```json
//! { "token": "...", "refresh_token": "...", "client_id": "...",
//!   "client_secret": "...", "token_uri": "https://oauth2.googleapis.com/token",
//!   "expiry": "2024-01-01T12:00:00.000000Z" }
//! ```
//!
//! The access token is loaded on first use and refreshed when it is missing
//! or about to expire; the refreshed token is written back atomically.
//!
//! Completing a task takes two calls (mark completed, then clear completed
//! items). They are not transactional: if the clear fails the task stays
//! completed-but-visible and [`PandoroError::PartialCompletion`] is returned.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::path::Path;

use super::http::{agent, read_json, request_error};
use super::{due_timestamp, TaskProvider};
use crate::atomic::write_atomic;
use crate::config::GoogleConfig;
use crate::error::{PandoroError, Result};
use crate::state::TaskList;

const DEFAULT_BASE_URL: &str = "https://tasks.googleapis.com";
const MAX_RESULTS: &str = "100";
/// Refresh tokens this close to expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;
/// Upper bound on a server-supplied `expires_in`.
const MAX_EXPIRES_IN_SECS: i64 = 7 * 24 * 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuthorizedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    refresh_token: String,
    client_id: String,
    client_secret: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry: Option<String>,
    /// Scopes, account and anything else the token file carries.
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthorizedUser {
    /// The access token if it is still usable at `now`.
    fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        match self.expiry.as_deref() {
            None => Some(token),
            Some(expiry) => {
                let expiry = DateTime::parse_from_rfc3339(expiry).ok()?;
                (expiry.with_timezone(&Utc) - Duration::seconds(EXPIRY_MARGIN_SECS) > now)
                    .then_some(token)
            }
        }
    }

    fn apply_refresh(&mut self, refreshed: RefreshResponse, now: DateTime<Utc>) {
        let expires_in = refreshed.expires_in.clamp(0, MAX_EXPIRES_IN_SECS);
        self.expiry = Some(
            (now + Duration::seconds(expires_in))
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        );
        self.token = Some(refreshed.access_token);
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TaskItems {
    #[serde(default)]
    items: Vec<TaskItem>,
}

#[derive(Debug, Deserialize)]
struct TaskItem {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    status: Option<String>,
}

/// Open items ordered by their position field.
fn items_to_tasks(mut items: Vec<TaskItem>) -> TaskList {
    items.retain(|item| item.status.as_deref() != Some("completed"));
    items.sort_by(|a, b| a.position.cmp(&b.position));
    items.into_iter().map(|item| (item.id, item.title)).collect()
}

fn insert_body(title: &str, due: Option<NaiveDate>) -> serde_json::Value {
    match due {
        Some(due) => serde_json::json!({ "title": title, "due": due_timestamp(due) }),
        None => serde_json::json!({ "title": title }),
    }
}

fn load_token_file(path: &Path) -> Result<AuthorizedUser> {
    let content = fs::read_to_string(path).map_err(|e| PandoroError::TokenFile {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| PandoroError::TokenFile {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

pub struct GoogleTasks {
    config: GoogleConfig,
    base_url: String,
    agent: ureq::Agent,
    access_token: OnceCell<String>,
}

impl GoogleTasks {
    pub fn new(config: GoogleConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(config: GoogleConfig, base_url: &str) -> Self {
        Self {
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: agent(),
            access_token: OnceCell::new(),
        }
    }

    fn list_url(&self, path: &str) -> String {
        format!(
            "{}/tasks/v1/lists/{}{}",
            self.base_url, self.config.list_id, path
        )
    }

    fn bearer(&self) -> Result<String> {
        if let Some(token) = self.access_token.get() {
            return Ok(format!("Bearer {}", token));
        }
        let token = self.load_access_token()?;
        let header = format!("Bearer {}", token);
        let _ = self.access_token.set(token);
        Ok(header)
    }

    fn load_access_token(&self) -> Result<String> {
        let path = &self.config.token_file;
        let mut user = load_token_file(path)?;
        let now = Utc::now();
        if let Some(token) = user.valid_token(now) {
            return Ok(token.to_string());
        }

        tracing::info!(path = %path.display(), "Refreshing Google access token");
        let context = "refresh access token";
        let response = self
            .agent
            .post(&user.token_uri)
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", user.refresh_token.as_str()),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
            ])
            .map_err(|e| request_error(context, e))?;
        let refreshed: RefreshResponse = read_json(context, response)?;
        let token = refreshed.access_token.clone();
        user.apply_refresh(refreshed, now);

        let content = serde_json::to_vec_pretty(&user).map_err(|source| PandoroError::Json {
            context: "Failed to serialize token file".to_string(),
            source,
        })?;
        if let Err(err) = write_atomic(path, &content) {
            // The token still works for this invocation; the next one refreshes again.
            tracing::warn!(error = %err, "Failed to save refreshed Google token");
        }
        Ok(token)
    }
}

impl TaskProvider for GoogleTasks {
    fn name(&self) -> &'static str {
        "google"
    }

    fn fetch_tasks(&self) -> Result<TaskList> {
        let context = "list tasks";
        let response = self
            .agent
            .get(&self.list_url("/tasks"))
            .query("maxResults", MAX_RESULTS)
            .set("Authorization", &self.bearer()?)
            .call()
            .map_err(|e| request_error(context, e))?;
        let items: TaskItems = read_json(context, response)?;
        Ok(items_to_tasks(items.items))
    }

    fn create_task(&self, title: &str, due: Option<NaiveDate>) -> Result<()> {
        self.agent
            .post(&self.list_url("/tasks"))
            .set("Authorization", &self.bearer()?)
            .send_json(insert_body(title, due))
            .map_err(|e| request_error("insert task", e))?;
        Ok(())
    }

    fn complete_task(&self, task_id: &str) -> Result<()> {
        let bearer = self.bearer()?;
        self.agent
            .request("PATCH", &self.list_url(&format!("/tasks/{}", task_id)))
            .set("Authorization", &bearer)
            .send_json(serde_json::json!({ "status": "completed" }))
            .map_err(|e| request_error("mark task completed", e))?;

        self.agent
            .post(&self.list_url("/clear"))
            .set("Authorization", &bearer)
            .call()
            .map_err(|e| {
                let err = request_error("clear completed tasks", e);
                tracing::error!(task = %task_id, error = %err, "Task completed but not cleared");
                PandoroError::PartialCompletion {
                    task_id: task_id.to_string(),
                    details: err.to_string(),
                }
            })?;
        Ok(())
    }
}
