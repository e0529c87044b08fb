//! Launching the external coding agent and the system clipboard.
//!
//! The agent CLI is configured (`agent_command` in the user config) and
//! treated as an opaque collaborator: chai builds the prompt, grants
//! directories, records the terminal session, and gets out of the way.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, warn};

/// Clipboard tools probed in order; first one that accepts stdin wins.
const CLIPBOARD_COMMANDS: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
];

/// Copy text to the system clipboard. Returns `true` on success.
pub fn copy_to_clipboard(text: &str) -> bool {
    for candidate in CLIPBOARD_COMMANDS {
        let Some((program, args)) = candidate.split_first() else {
            continue;
        };
        let spawned = Command::new(program)
            .args(args.iter())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let Ok(mut child) = spawned else {
            continue;
        };
        if let Some(stdin) = child.stdin.as_mut() {
            if stdin.write_all(text.as_bytes()).is_err() {
                continue;
            }
        }
        match child.wait() {
            Ok(status) if status.success() => {
                debug!(tool = program, "prompt copied to clipboard");
                return true;
            }
            _ => {}
        }
    }
    false
}

/// Run the agent CLI interactively under `script`, recording the
/// terminal session to `transcript`.
///
/// Returns `Ok(true)` when the agent exits cleanly, `Ok(false)` when it
/// reports failure. `NO_COLOR=1` keeps the recording readable.
///
/// # Errors
///
/// Returns an error when neither `script` nor the agent can be spawned
/// (typically: not installed).
pub fn invoke_interactive(
    agent_command: &str,
    add_dirs: &[String],
    transcript: &Path,
) -> Result<bool> {
    let mut agent_argv: Vec<String> = vec![agent_command.to_string()];
    for dir in add_dirs {
        agent_argv.push("--add-dir".to_string());
        agent_argv.push(dir.clone());
    }

    // `script` argument order differs: Linux wants the command behind
    // `-c` as a single string, BSD/macOS takes it as trailing argv.
    let mut command = Command::new("script");
    command.arg("-q").arg(transcript);
    if cfg!(target_os = "linux") {
        command.arg("-c").arg(shell_join(&agent_argv));
    } else {
        command.args(&agent_argv);
    }
    command.env("NO_COLOR", "1");

    debug!(agent = agent_command, dirs = add_dirs.len(), "starting agent session");
    let status = command
        .status()
        .with_context(|| format!("failed to launch `script` around '{agent_command}'"))?;

    if !status.success() {
        warn!(code = ?status.code(), "agent session exited with failure");
    }
    Ok(status.success())
}

/// The shell command line for running the agent manually (do mode).
#[must_use]
pub fn manual_command(agent_command: &str, add_dirs: &[String]) -> String {
    let mut argv: Vec<String> = vec!["NO_COLOR=1".to_string(), agent_command.to_string()];
    for dir in add_dirs {
        argv.push("--add-dir".to_string());
        argv.push(format!("'{dir}'"));
    }
    argv.join(" ")
}

fn shell_join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.chars().all(|c| c.is_alphanumeric() || "-_./".contains(c)) {
                arg.clone()
            } else {
                format!("'{}'", arg.replace('\'', "'\\''"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{manual_command, shell_join};

    #[test]
    fn shell_join_quotes_only_when_needed() {
        let argv = vec![
            "claude".to_string(),
            "--add-dir".to_string(),
            "/home/me/my project".to_string(),
        ];
        assert_eq!(
            shell_join(&argv),
            "claude --add-dir '/home/me/my project'"
        );
    }

    #[test]
    fn shell_join_escapes_single_quotes() {
        let argv = vec!["echo".to_string(), "it's".to_string()];
        assert_eq!(shell_join(&argv), r"echo 'it'\''s'");
    }

    #[test]
    fn manual_command_lists_dirs() {
        let cmd = manual_command("claude", &["/srv/app".to_string()]);
        assert_eq!(cmd, "NO_COLOR=1 claude --add-dir '/srv/app'");
    }
}
