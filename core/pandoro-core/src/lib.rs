//! # pandoro-core
//!
//! Core library for Pandoro, a menu-bar Pomodoro timer wired to a Trello or
//! Google Tasks to-do list.
//!
//! ## Design Principles
//!
//! - **Synchronous**: every invocation is a short-lived process; no async runtime.
//! - **Graceful degradation**: a missing or corrupt state file starts empty,
//!   refilled from the provider.
//! - **Injected edges**: provider, desktop and clock are traits so the session
//!   logic runs in tests without network or a window server.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pandoro_core::*;
//!
//! let storage = StorageConfig::from_home_dir()?;
//! let config = Config::load(&storage)?;
//! let provider = Provider::from_config(&config.provider);
//! let store = StateStore::new(&storage.state_file());
//! let session = Session::new(&store, &provider, &Osascript::default(), &SystemClock);
//! print!("{}", session.tick()?.render("pandoro"));
//! ```

pub mod atomic;
pub mod clock;
pub mod config;
pub mod desktop;
pub mod due;
pub mod error;
pub mod providers;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;

pub use clock::{Clock, SystemClock};
pub use config::{
    load_trello_credentials, Config, GoogleConfig, ProviderConfig, TrelloConfig, TrelloCredentials,
};
pub use desktop::{Desktop, Osascript};
pub use due::{parse_new_task, NewTask};
pub use error::{PandoroError, Result};
pub use providers::{BoardList, GoogleTasks, Provider, TaskProvider, Trello, TrelloBoards};
pub use render::{Menu, MenuItem};
pub use session::{Command, Session};
pub use state::{SessionState, Slot, SlotDurations, SlotKind, StateStore, Task, TaskList};
pub use storage::StorageConfig;
