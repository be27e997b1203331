//! Menu-bar output (xbar/BitBar plugin protocol).
//!
//! ```text
//!  \e[32m12:34\e[0m - Write spec           | trim=false image=<base64 icon>
//! ---
//! Complete and continue...
//! -- Review PR |bash="/path/pandoro" param1=complete param2=A param3=B terminal=false length=50
//! Switch...
//! -- Review PR |bash="/path/pandoro" param1=switch param2=B terminal=false length=50
//! New task... |bash="/path/pandoro" param1=create terminal=false
//! Take a break |bash="/path/pandoro" param1=break terminal=false
//! ---
//! Pause |bash="/path/pandoro" param1=pause terminal=false
//! Refresh |bash="/path/pandoro" param1=refresh terminal=false
//! ```

use std::fmt::Write as _;

use crate::state::{SessionState, SlotDurations, SlotKind};

const WORK_COLOR: &str = "\x1b[32m";
const BREAK_COLOR: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

const TITLE_WIDTH: usize = 20;
const ELLIPSIS: char = '…';
const SUBMENU_LENGTH: u32 = 50;

static ICON: &str = include_str!("../assets/panda.png.b64");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Separator,
    /// Non-clickable parent of a submenu.
    Header(String),
    /// Re-runs the program with `args` when clicked.
    Action {
        label: String,
        args: Vec<String>,
        nested: bool,
    },
}

impl MenuItem {
    fn action(label: &str, args: &[&str]) -> Self {
        MenuItem::Action {
            label: label.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            nested: false,
        }
    }

    fn task(title: &str, args: Vec<String>) -> Self {
        MenuItem::Action {
            label: title.to_string(),
            args,
            nested: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    /// Text shown in the menu bar itself.
    pub status: String,
    pub items: Vec<MenuItem>,
}

/// `MM:SS`; overrun time shows as `00:00`.
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Cuts long titles to the fixed width (plus an ellipsis) and pads short ones.
pub fn fit_title(title: &str) -> String {
    if title.chars().count() > TITLE_WIDTH {
        let mut cut: String = title.chars().take(TITLE_WIDTH).collect();
        cut.push(ELLIPSIS);
        cut
    } else {
        format!("{:<width$}", title, width = TITLE_WIDTH)
    }
}

/// Status text: empty when idle, colored countdown otherwise, plus the
/// current task while working.
pub fn status_line(state: &SessionState, durations: &SlotDurations, now: i64) -> String {
    let (Some(kind), Some(remaining)) = (state.status(), state.remaining(durations, now)) else {
        return String::new();
    };

    let color = match kind {
        SlotKind::Work => WORK_COLOR,
        SlotKind::Break => BREAK_COLOR,
    };
    let mut line = format!(" {}{}{}", color, format_clock(remaining), RESET);

    if kind == SlotKind::Work {
        line.push_str(" - ");
        line.push_str(&fit_title(state.current_title().unwrap_or("")));
    }
    line
}

/// A header followed by its entries; nothing at all when there are none.
fn push_submenu(
    items: &mut Vec<MenuItem>,
    header: &str,
    entries: impl Iterator<Item = MenuItem>,
) {
    let mut entries = entries.peekable();
    if entries.peek().is_some() {
        items.push(MenuItem::Header(header.to_string()));
        items.extend(entries);
    }
}

pub fn build_menu(state: &SessionState, durations: &SlotDurations, now: i64) -> Menu {
    let status = state.status();
    let current = state.current.as_deref();
    let mut items = Vec::new();

    if let (Some(SlotKind::Work), Some(current_id)) = (status, current) {
        push_submenu(
            &mut items,
            "Complete and continue...",
            state.tasks.others(current).map(|task| {
                MenuItem::task(
                    &task.title,
                    vec!["complete".into(), current_id.to_string(), task.id.clone()],
                )
            }),
        );
    }

    push_submenu(
        &mut items,
        "Switch...",
        state
            .tasks
            .others(current)
            .map(|task| MenuItem::task(&task.title, vec!["switch".into(), task.id.clone()])),
    );

    items.push(MenuItem::action("New task...", &["create"]));
    if status != Some(SlotKind::Work) {
        items.push(MenuItem::action("Get to work", &["work"]));
    }
    if status != Some(SlotKind::Break) {
        items.push(MenuItem::action("Take a break", &["break"]));
    }
    items.push(MenuItem::Separator);
    if status.is_some() {
        items.push(MenuItem::action("Pause", &["pause"]));
    }
    items.push(MenuItem::action("Refresh", &["refresh"]));

    Menu {
        status: status_line(state, durations, now),
        items,
    }
}

impl Menu {
    /// Protocol text; `program` is the executable that menu actions re-run.
    pub fn render(&self, program: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}| trim=false image={}", self.status, ICON.trim());
        out.push_str("---\n");

        for item in &self.items {
            match item {
                MenuItem::Separator => out.push_str("---\n"),
                MenuItem::Header(label) => {
                    let _ = writeln!(out, "{}", label);
                }
                MenuItem::Action {
                    label,
                    args,
                    nested,
                } => {
                    if *nested {
                        out.push_str("-- ");
                    }
                    let _ = write!(out, "{} |bash=\"{}\"", label, program);
                    for (i, arg) in args.iter().enumerate() {
                        let _ = write!(out, " param{}={}", i + 1, arg);
                    }
                    out.push_str(" terminal=false");
                    if *nested {
                        let _ = write!(out, " length={}", SUBMENU_LENGTH);
                    }
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// Alfred script-filter JSON listing every task except the current one.
pub fn alfred_items(state: &SessionState, icon: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = state
        .tasks
        .others(state.current.as_deref())
        .map(|task| {
            let mut item = serde_json::json!({ "title": task.title, "arg": task.id });
            if let Some(icon) = icon {
                item["icon"] = serde_json::json!({ "path": icon });
            }
            item
        })
        .collect();
    serde_json::json!({ "items": items })
}
