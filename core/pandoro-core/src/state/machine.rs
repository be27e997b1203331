//! Timer and task transitions on [`SessionState`].
//!
//! ```text
//!            work                 slot expired (tick)
//!   Idle ──────────▶ Working ─────────────────────────▶ OnBreak
//!    ▲  ──────────▶    │ ▲  ◀───────────────────────────   │
//!    │     break       │ │       slot expired (tick)       │
//!    └──── pause ──────┴─┴──────────── pause ──────────────┘
//! ```
//!
//! Starting the mode that is already running keeps the original start time.
//! Task commands (switch, complete, refresh) never touch the slot.

use super::types::{SessionState, Slot, SlotKind, TaskList};

pub const DEFAULT_WORK_SECS: i64 = 25 * 60;
pub const DEFAULT_BREAK_SECS: i64 = 5 * 60;

/// Length of each slot kind, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDurations {
    pub work: i64,
    pub brk: i64,
}

impl Default for SlotDurations {
    fn default() -> Self {
        SlotDurations {
            work: DEFAULT_WORK_SECS,
            brk: DEFAULT_BREAK_SECS,
        }
    }
}

impl SlotDurations {
    pub fn of(&self, kind: SlotKind) -> i64 {
        match kind {
            SlotKind::Work => self.work,
            SlotKind::Break => self.brk,
        }
    }
}

/// An automatic slot change detected during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SlotKind,
    pub to: SlotKind,
    pub at: i64,
}

impl Transition {
    /// Text of the desktop notification announcing this transition.
    pub fn message(&self) -> &'static str {
        match self.to {
            SlotKind::Break => "Time for break",
            SlotKind::Work => "Time for work",
        }
    }
}

/// Saturates: `time` comes from the state file and may be anything.
fn slot_remaining(slot: Slot, durations: &SlotDurations, now: i64) -> i64 {
    slot.started_at
        .saturating_add(durations.of(slot.kind))
        .saturating_sub(now)
}

impl SessionState {
    /// Seconds left in the running slot, `None` when idle. Negative once the
    /// slot has overrun.
    pub fn remaining(&self, durations: &SlotDurations, now: i64) -> Option<i64> {
        self.slot.map(|slot| slot_remaining(slot, durations, now))
    }

    /// Starts a work or break slot. Returns true if the clock was (re)started;
    /// asking for the mode that is already running changes nothing.
    pub fn start(&mut self, kind: SlotKind, now: i64) -> bool {
        if self.status() == Some(kind) {
            return false;
        }
        self.slot = Some(Slot {
            kind,
            started_at: now,
        });
        true
    }

    /// Stops the timer. Returns false if it was already idle.
    pub fn pause(&mut self) -> bool {
        self.slot.take().is_some()
    }

    pub fn switch_task(&mut self, task_id: impl Into<String>) {
        self.current = Some(task_id.into());
    }

    /// Replaces the task snapshot, keeping current task and timer.
    pub fn replace_tasks(&mut self, tasks: TaskList) {
        self.tasks = tasks;
    }

    /// Flips an expired slot to the other kind, starting it at `now`.
    ///
    /// At most one transition happens per call: a timer left running for
    /// hours moves to the adjacent phase, it does not replay missed ones.
    pub fn advance(&mut self, durations: &SlotDurations, now: i64) -> Option<Transition> {
        let slot = self.slot?;
        if slot_remaining(slot, durations, now) > 0 {
            return None;
        }

        let to = slot.kind.other();
        self.slot = Some(Slot {
            kind: to,
            started_at: now,
        });
        Some(Transition {
            from: slot.kind,
            to,
            at: now,
        })
    }
}
