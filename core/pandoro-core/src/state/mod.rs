//! Session state: the persisted timer/task tracker.
//!
//! # Module Structure
//!
//! - [`types`]: `SessionState`, slots, the ordered task snapshot, wire format
//! - [`machine`]: timer transitions and remaining-time arithmetic
//! - [`store`]: reads/writes the JSON state file (`~/.pandoro/state.json`)

pub mod machine;
mod store;
pub mod types;

pub use machine::{SlotDurations, Transition, DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};
pub use store::StateStore;
pub use types::{SessionState, Slot, SlotKind, Task, TaskList};
