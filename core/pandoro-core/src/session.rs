//! Command dispatch: load state, apply one command or tick, persist.
//!
//! Every invocation of the binary builds one [`Session`] and calls either
//! [`Session::tick`] (no arguments) or [`Session::run`] (a sub-command).
//!
//! - A tick persists only when a slot expired and flipped.
//! - A command always persists, and only after every step succeeded, so a
//!   failed provider call leaves the file as it was.
//! - Without a usable state file (first run, or a corrupt file) the task list
//!   is fetched from the provider before anything else happens. A saved state
//!   with no tasks is used as is.

use crate::clock::Clock;
use crate::desktop::Desktop;
use crate::due::parse_new_task;
use crate::error::Result;
use crate::providers::TaskProvider;
use crate::render::{alfred_items, build_menu, Menu};
use crate::state::{SessionState, SlotDurations, SlotKind, StateStore};

const NEW_TASK_PROMPT: &str = "New task";
const NEW_TASK_ADDED: &str = "New task added";

/// A state-changing (or state-reading) sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Switch {
        task_id: String,
    },
    /// Completes `task_id` (the current task if `None`) and moves on to `next_id`.
    Complete {
        task_id: Option<String>,
        next_id: String,
    },
    Start(SlotKind),
    Pause,
    Refresh,
    /// Creates a task from `title`, or from a dialog when `None`.
    Create {
        title: Option<String>,
    },
    Current,
    Alfred,
}

pub struct Session<'a> {
    store: &'a StateStore,
    provider: &'a dyn TaskProvider,
    desktop: &'a dyn Desktop,
    clock: &'a dyn Clock,
    durations: SlotDurations,
    alfred_icon: Option<String>,
}

impl<'a> Session<'a> {
    pub fn new(
        store: &'a StateStore,
        provider: &'a dyn TaskProvider,
        desktop: &'a dyn Desktop,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            provider,
            desktop,
            clock,
            durations: SlotDurations::default(),
            alfred_icon: None,
        }
    }

    pub fn with_durations(mut self, durations: SlotDurations) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_alfred_icon(mut self, icon: Option<String>) -> Self {
        self.alfred_icon = icon;
        self
    }

    fn load(&self) -> Result<SessionState> {
        if let Some(state) = self.store.load()? {
            return Ok(state);
        }
        tracing::info!(provider = self.provider.name(), "No saved state, fetching tasks");
        let mut state = SessionState::default();
        self.refresh(&mut state)?;
        Ok(state)
    }

    fn refresh(&self, state: &mut SessionState) -> Result<()> {
        state.replace_tasks(self.provider.fetch_tasks()?);
        Ok(())
    }

    fn notify(&self, message: &str) {
        if let Err(err) = self.desktop.notify(message) {
            tracing::warn!(error = %err, message, "Notification failed");
        }
    }

    /// Advances an expired slot (persisting and notifying if it flips) and
    /// returns the menu to display.
    pub fn tick(&self) -> Result<Menu> {
        let mut state = self.load()?;
        let now = self.clock.epoch();

        if let Some(transition) = state.advance(&self.durations, now) {
            tracing::info!(
                from = %transition.from,
                to = %transition.to,
                at = transition.at,
                "Slot expired"
            );
            self.store.save(&state)?;
            self.notify(transition.message());
        }

        Ok(build_menu(&state, &self.durations, now))
    }

    /// Applies `command` and persists the result. Returns text to print, if
    /// the command produces any.
    pub fn run(&self, command: Command) -> Result<Option<String>> {
        let mut state = self.load()?;
        tracing::debug!(command = ?command, "Running command");

        let output = match command {
            Command::Switch { task_id } => {
                state.switch_task(task_id);
                None
            }
            Command::Complete { task_id, next_id } => {
                self.complete(&mut state, task_id, next_id)?;
                None
            }
            Command::Start(kind) => {
                if state.start(kind, self.clock.epoch()) {
                    tracing::info!(kind = %kind, "Slot started");
                }
                None
            }
            Command::Pause => {
                if state.pause() {
                    tracing::info!("Timer paused");
                }
                None
            }
            Command::Refresh => {
                self.refresh(&mut state)?;
                None
            }
            Command::Create { title } => {
                self.create(&mut state, title)?;
                None
            }
            Command::Current => Some(state.current.clone().unwrap_or_default()),
            Command::Alfred => {
                Some(alfred_items(&state, self.alfred_icon.as_deref()).to_string())
            }
        };

        self.store.save(&state)?;
        Ok(output)
    }

    fn complete(
        &self,
        state: &mut SessionState,
        task_id: Option<String>,
        next_id: String,
    ) -> Result<()> {
        let Some(task_id) = task_id.or_else(|| state.current.clone()) else {
            tracing::warn!("No task given and no current task; nothing to complete");
            return Ok(());
        };

        self.provider.complete_task(&task_id)?;
        state.switch_task(next_id);
        self.refresh(state)
    }

    fn create(&self, state: &mut SessionState, title: Option<String>) -> Result<()> {
        let (input, prompted) = match title {
            Some(title) => (Some(title), false),
            None => (self.desktop.prompt_text(NEW_TASK_PROMPT)?, true),
        };

        let task = input
            .as_deref()
            .and_then(|input| parse_new_task(input, self.clock.today()));
        if let Some(task) = &task {
            self.provider.create_task(&task.title, task.due)?;
        }

        self.refresh(state)?;

        if prompted && task.is_some() {
            self.notify(NEW_TASK_ADDED);
        }
        Ok(())
    }
}
