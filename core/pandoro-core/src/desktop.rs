//! Desktop notifications and text prompts.
//!
//! The session only needs two things from the desktop: show a notification,
//! and ask the user for a line of text. [`Osascript`] does both on macOS by
//! piping AppleScript to `osascript`; tests substitute a recording fake.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{PandoroError, Result};

pub trait Desktop {
    /// Shows a notification. Blocks until it has been posted.
    fn notify(&self, message: &str) -> Result<()>;

    /// Asks for a line of text. `None` when the dialog was cancelled or left
    /// empty.
    fn prompt_text(&self, title: &str) -> Result<Option<String>>;
}

/// AppleScript-backed desktop integration.
pub struct Osascript {
    app_title: String,
}

impl Default for Osascript {
    fn default() -> Self {
        Self {
            app_title: "Pandoro".to_string(),
        }
    }
}

/// Escapes text for use inside an AppleScript string literal.
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn notification_script(message: &str, app_title: &str) -> String {
    format!(
        "display notification {} with title {} sound name \"default\"",
        quote(message),
        quote(app_title)
    )
}

fn dialog_script(title: &str) -> String {
    format!(
        "set theString to text returned of (display dialog {} default answer \"\" buttons {{\"OK\",\"Cancel\"}} default button 1)",
        quote(title)
    )
}

/// Output of one `osascript` run.
struct ScriptOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

fn run_osascript(script: &str) -> Result<ScriptOutput> {
    let command_error = |details: String| PandoroError::Desktop {
        command: "osascript".to_string(),
        details,
    };

    let mut child = Command::new("osascript")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| command_error(format!("failed to start: {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(script.as_bytes())
            .map_err(|e| command_error(format!("failed to write script: {}", e)))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| command_error(format!("failed to wait: {}", e)))?;

    Ok(ScriptOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

impl Desktop for Osascript {
    fn notify(&self, message: &str) -> Result<()> {
        let output = run_osascript(&notification_script(message, &self.app_title))?;
        if !output.success {
            return Err(PandoroError::Desktop {
                command: "display notification".to_string(),
                details: output.stderr,
            });
        }
        Ok(())
    }

    fn prompt_text(&self, title: &str) -> Result<Option<String>> {
        let output = run_osascript(&dialog_script(title))?;
        if !output.success {
            // Cancel makes osascript exit with "User canceled. (-128)".
            tracing::debug!(stderr = %output.stderr, "Dialog dismissed");
            return Ok(None);
        }
        Ok(Some(output.stdout).filter(|text| !text.is_empty()))
    }
}
