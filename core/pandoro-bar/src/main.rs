//! pandoro: menu-bar Pomodoro timer backed by a Trello or Google Tasks list.
//!
//! Run with no arguments by an xbar/BitBar-style host on a short interval.
//! Each menu action re-invokes this binary with a sub-command.
//!
//! ## Subcommands
//!
//! - (none): advance the timer and print the menu
//! - `switch`, `complete`: change the current task
//! - `work`, `break`, `pause`: drive the timer
//! - `refresh`, `create`: talk to the task provider
//! - `current`, `alfred`: read-only output for scripts and Alfred
//! - `lists`: print the lists of a Trello board, for setting up `~/.pandororc`

mod logging;

use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pandoro_core::{
    load_trello_credentials, Command, Config, Osascript, PandoroError, Provider, Result,
    Session, SlotKind, StateStore, StorageConfig, SystemClock, TrelloBoards,
};

#[derive(Parser)]
#[command(name = "pandoro")]
#[command(about = "Pomodoro timer and to-do list for the menu bar")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Make a task the current one
    Switch {
        #[arg(value_name = "TASK_ID")]
        task_id: String,
    },

    /// Complete a task (the current one if only NEXT_ID is given) and switch to NEXT_ID
    #[command(alias = "done")]
    Complete {
        /// [TASK_ID] NEXT_ID
        #[arg(value_name = "ID", num_args = 1..=2, required = true)]
        ids: Vec<String>,
    },

    /// Start a work slot
    Work,

    /// Start a break slot
    Break,

    /// Stop the timer
    Pause,

    /// Re-fetch the task list
    Refresh,

    /// Create a task; prompts for a title when none is given.
    /// A trailing "tomorrow" or YYYY-MM-DD sets the due date.
    Create {
        #[arg(value_name = "TITLE", allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Print the current task id
    Current,

    /// Print the task list as Alfred script-filter JSON
    #[command(alias = "alfred-list")]
    Alfred,

    /// Print the lists on a Trello board as `name: id`
    Lists {
        #[arg(value_name = "BOARD_ID")]
        board_id: String,
    },
}

impl Commands {
    fn into_session_command(self) -> Option<Command> {
        let command = match self {
            Commands::Switch { task_id } => Command::Switch { task_id },
            Commands::Complete { mut ids } => {
                let next_id = ids.pop()?;
                Command::Complete {
                    task_id: ids.pop(),
                    next_id,
                }
            }
            Commands::Work => Command::Start(SlotKind::Work),
            Commands::Break => Command::Start(SlotKind::Break),
            Commands::Pause => Command::Pause,
            Commands::Refresh => Command::Refresh,
            Commands::Create { words } => Command::Create {
                title: (!words.is_empty()).then(|| words.join(" ")),
            },
            Commands::Current => Command::Current,
            Commands::Alfred => Command::Alfred,
            Commands::Lists { .. } => return None,
        };
        Some(command)
    }
}

/// Path the menu uses to call back into this binary.
fn program_path() -> String {
    env::current_exe()
        .ok()
        .and_then(|path| path.to_str().map(str::to_string))
        .unwrap_or_else(|| "pandoro".to_string())
}

fn print_board_lists(storage: &StorageConfig, board_id: &str) -> Result<()> {
    let credentials = load_trello_credentials(storage)?;
    for list in TrelloBoards::new(credentials).board_lists(board_id)? {
        println!("{}: {}", list.name, list.id);
    }
    Ok(())
}

fn run(command: Option<Commands>, storage: Option<StorageConfig>) -> Result<()> {
    let storage = storage.ok_or(PandoroError::HomeDirNotFound)?;

    if let Some(Commands::Lists { board_id }) = &command {
        return print_board_lists(&storage, board_id);
    }

    let config = Config::load(&storage)?;
    let provider = Provider::from_config(&config.provider);
    let store = StateStore::new(&storage.state_file());
    let desktop = Osascript::default();
    let clock = SystemClock;
    let session = Session::new(&store, &provider, &desktop, &clock)
        .with_durations(config.durations)
        .with_alfred_icon(config.alfred_icon);

    match command.and_then(Commands::into_session_command) {
        None => print!("{}", session.tick()?.render(&program_path())),
        Some(command) => {
            if let Some(output) = session.run(command)? {
                println!("{}", output);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let storage = StorageConfig::from_home_dir().ok();
    let _logging_guard = logging::init(storage.as_ref().map(|s| s.logs_dir()).as_deref());

    match run(cli.command, storage) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "pandoro failed");
            eprintln!("pandoro: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<Command> {
        let cli = Cli::try_parse_from(std::iter::once("pandoro").chain(args.iter().copied()))
            .unwrap();
        cli.command.and_then(Commands::into_session_command)
    }

    #[test]
    fn test_no_args_is_tick() {
        assert!(Cli::try_parse_from(["pandoro"]).unwrap().command.is_none());
    }

    #[test]
    fn test_complete_with_one_id_uses_current() {
        assert_eq!(
            parse(&["complete", "B"]),
            Some(Command::Complete {
                task_id: None,
                next_id: "B".into()
            })
        );
    }

    #[test]
    fn test_done_alias_with_two_ids() {
        assert_eq!(
            parse(&["done", "A", "B"]),
            Some(Command::Complete {
                task_id: Some("A".into()),
                next_id: "B".into()
            })
        );
    }

    #[test]
    fn test_complete_rejects_three_ids() {
        assert!(Cli::try_parse_from(["pandoro", "complete", "A", "B", "C"]).is_err());
    }

    #[test]
    fn test_create_joins_words() {
        assert_eq!(
            parse(&["create", "Buy", "milk", "tomorrow"]),
            Some(Command::Create {
                title: Some("Buy milk tomorrow".into())
            })
        );
        assert_eq!(parse(&["create"]), Some(Command::Create { title: None }));
    }

    #[test]
    fn test_timer_commands() {
        assert_eq!(parse(&["work"]), Some(Command::Start(SlotKind::Work)));
        assert_eq!(parse(&["break"]), Some(Command::Start(SlotKind::Break)));
        assert_eq!(parse(&["pause"]), Some(Command::Pause));
    }

    #[test]
    fn test_alfred_list_alias() {
        assert_eq!(parse(&["alfred-list"]), Some(Command::Alfred));
    }

    #[test]
    fn test_lists_is_not_a_session_command() {
        assert_eq!(parse(&["lists", "board"]), None);
    }
}
