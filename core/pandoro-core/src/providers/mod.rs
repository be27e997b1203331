//! Remote task lists.
//!
//! A provider owns one "to-do" list and exposes three operations: fetch the
//! open tasks, add a task at the top, and move a task out of the list. The
//! concrete backend is chosen once at startup from [`ProviderConfig`].
//!
//! All calls are blocking request/response with no retries. Any non-success
//! response aborts the command that triggered it.

mod google;
mod http;
mod trello;

pub use google::GoogleTasks;
pub use trello::{BoardList, Trello, TrelloBoards};

use chrono::NaiveDate;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::state::TaskList;

/// Operations the session needs from a task list backend.
pub trait TaskProvider {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// All open tasks in the to-do list, in provider order.
    fn fetch_tasks(&self) -> Result<TaskList>;

    /// Adds a task at the top of the to-do list.
    fn create_task(&self, title: &str, due: Option<NaiveDate>) -> Result<()>;

    /// Moves a task out of the to-do list.
    fn complete_task(&self, task_id: &str) -> Result<()>;
}

/// The configured backend.
pub enum Provider {
    Trello(Trello),
    Google(GoogleTasks),
}

impl Provider {
    pub fn from_config(config: &ProviderConfig) -> Self {
        match config {
            ProviderConfig::Trello(trello) => Provider::Trello(Trello::new(trello.clone())),
            ProviderConfig::Google(google) => Provider::Google(GoogleTasks::new(google.clone())),
        }
    }

    fn inner(&self) -> &dyn TaskProvider {
        match self {
            Provider::Trello(trello) => trello,
            Provider::Google(google) => google,
        }
    }
}

impl TaskProvider for Provider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn fetch_tasks(&self) -> Result<TaskList> {
        let tasks = self.inner().fetch_tasks()?;
        tracing::debug!(provider = self.name(), count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    fn create_task(&self, title: &str, due: Option<NaiveDate>) -> Result<()> {
        self.inner().create_task(title, due)?;
        tracing::info!(provider = self.name(), title = %title, due = ?due, "Created task");
        Ok(())
    }

    fn complete_task(&self, task_id: &str) -> Result<()> {
        self.inner().complete_task(task_id)?;
        tracing::info!(provider = self.name(), task = %task_id, "Completed task");
        Ok(())
    }
}

/// Due dates are sent as midnight UTC of the chosen day.
pub(crate) fn due_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}
