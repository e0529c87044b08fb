//! `chai session` — the interactive loop.
//!
//! Shows ranked recommendations, then reads commands until quit:
//! a bare number works on that recommendation, `do`/`plan` start the
//! agent on a task, `done` completes one, `list` and `more` inspect the
//! queue. The recommendation list is an owned snapshot held here and
//! addressed by index; it is refreshed after every mutation.

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::Utc;
use clap::Args;
use tracing::debug;

use chai_core::config::UserConfig;
use chai_core::{Store, TodoManager};

use crate::cmd::next::{RecommendationRow, recommendation_rows};
use crate::{agent, prompt, transcript};

#[derive(Args, Debug, Default)]
pub struct SessionArgs {}

/// Execute `chai session`.
///
/// # Errors
///
/// Fails when the store cannot be read on startup; errors inside the
/// loop are reported and the loop continues.
pub fn run_session(_args: &SessionArgs, space: &Path, config: &UserConfig) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    run_session_loop(&mut input, &mut out, space, config)
}

fn run_session_loop(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    space: &Path,
    config: &UserConfig,
) -> anyhow::Result<()> {
    writeln!(out, "chai interactive session")?;
    writeln!(out, "{:=<40}", "")?;

    let mut manager = TodoManager::open(Store::in_space(space))?;
    let mut rec_count = config.recommendations_count;

    let mut recommendations = recommendation_rows(&manager, rec_count);
    display_recommendations(out, &recommendations)?;
    display_help(out)?;

    loop {
        write!(out, "chai> ")?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(out, "\nGoodbye!")?;
            break;
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        let (action, arg) = match command.split_once(char::is_whitespace) {
            Some((action, arg)) => (action.to_lowercase(), arg.trim().to_string()),
            None => (command.to_lowercase(), String::new()),
        };

        match action.as_str() {
            "quit" | "exit" | "q" => {
                writeln!(out, "Goodbye!")?;
                break;
            }

            "list" => {
                for item in manager.filter(false) {
                    writeln!(out, "[{}] {}", item.slug, item.display_text)?;
                }
            }

            "more" => {
                rec_count += 3;
                recommendations = recommendation_rows(&manager, rec_count);
                display_recommendations(out, &recommendations)?;
            }

            "do" if !arg.is_empty() => {
                if handle_task(input, out, &mut manager, space, config, &arg, false)? {
                    recommendations = refresh(&mut manager, rec_count)?;
                    display_recommendations(out, &recommendations)?;
                }
            }

            "plan" if !arg.is_empty() => {
                if handle_task(input, out, &mut manager, space, config, &arg, true)? {
                    recommendations = refresh(&mut manager, rec_count)?;
                    display_recommendations(out, &recommendations)?;
                }
            }

            "done" if !arg.is_empty() => {
                complete_task(input, out, &mut manager, &arg)?;
                recommendations = refresh(&mut manager, rec_count)?;
                display_recommendations(out, &recommendations)?;
            }

            _ if action.chars().all(|c| c.is_ascii_digit()) => {
                let index: usize = action.parse().unwrap_or(0);
                match recommendations.get(index.wrapping_sub(1)) {
                    Some(row) => {
                        let slug = row.slug.clone();
                        if handle_task(input, out, &mut manager, space, config, &slug, false)? {
                            recommendations = refresh(&mut manager, rec_count)?;
                            display_recommendations(out, &recommendations)?;
                        }
                    }
                    None => writeln!(
                        out,
                        "Invalid number. Choose 1-{}",
                        recommendations.len()
                    )?,
                }
            }

            _ => {
                writeln!(out, "Unknown command: {command}")?;
                writeln!(out, "Type 'quit' to exit or a number to select a task.")?;
            }
        }
    }

    Ok(())
}

/// Work on a resolved task. Returns `true` when the queue changed and
/// the recommendations should refresh.
fn handle_task(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    manager: &mut TodoManager,
    space: &Path,
    config: &UserConfig,
    token: &str,
    planning: bool,
) -> anyhow::Result<bool> {
    let (id, slug, text, display_text) = match manager.resolve(token) {
        Ok(item) => (
            item.id,
            item.slug.clone(),
            item.text.clone(),
            item.display_text.clone(),
        ),
        Err(err) => {
            writeln!(out, "{err}")?;
            return Ok(false);
        }
    };

    writeln!(out, "\nWorking on: {display_text}")?;

    if planning {
        writeln!(out, "Entering planning mode...\n")?;
        let success = plan_task(out, space, config, &slug, &text, &display_text)?;
        writeln!(out)?;

        if !success {
            writeln!(out, "Task execution had issues.")?;
            return Ok(false);
        }

        if confirm(input, out, "Mark task as done?")? {
            let notes = ask(input, out, "Any notes about the implementation?")?;
            match manager.mark_done(id, &notes, Utc::now()) {
                Ok(_) => writeln!(out, "Completed: {display_text}")?,
                Err(err) => writeln!(out, "{err}")?,
            }
            return Ok(true);
        }
        return Ok(false);
    }

    // Do mode: hand the prompt over and keep the session free.
    let built = prompt::build_prompt(space, &text, false);
    if agent::copy_to_clipboard(&built.prompt) {
        writeln!(out, "\nPrompt copied to clipboard!")?;
    } else {
        writeln!(out, "\n{:=<50}", "")?;
        writeln!(out, "COPY THIS PROMPT:")?;
        writeln!(out, "{:=<50}", "")?;
        writeln!(out, "{}", built.prompt)?;
        writeln!(out, "{:=<50}", "")?;
    }
    if !built.add_dirs.is_empty() {
        writeln!(out, "Directories to grant: {}", built.add_dirs.join(", "))?;
    }
    writeln!(
        out,
        "Run in another terminal: {}",
        agent::manual_command(&config.agent_command, &built.add_dirs)
    )?;
    writeln!(out, "When done, run: chai done {slug}")?;
    Ok(false)
}

/// Planning mode: build the prompt, record the agent session, clean the
/// transcript, and link it from the planning log.
fn plan_task(
    out: &mut dyn Write,
    space: &Path,
    config: &UserConfig,
    slug: &str,
    text: &str,
    display_text: &str,
) -> anyhow::Result<bool> {
    let built = prompt::build_prompt(space, text, true);

    let now = Utc::now();
    let log_file = prompt::save_planning_log(space, slug, display_text, &built.prompt, now)?;
    writeln!(out, "Planning log: {}", log_file.display())?;

    let transcript_file = log_file.with_extension("transcript.txt");

    if agent::copy_to_clipboard(&built.prompt) {
        writeln!(out, "Prompt copied to clipboard! Paste it when the agent starts.")?;
    } else {
        writeln!(out, "\n{:=<50}", "")?;
        writeln!(out, "COPY THIS PROMPT:")?;
        writeln!(out, "{:=<50}", "")?;
        writeln!(out, "{}", built.prompt)?;
        writeln!(out, "{:=<50}", "")?;
    }

    if !built.add_dirs.is_empty() {
        writeln!(out, "Directories added: {}", built.add_dirs.join(", "))?;
    }
    writeln!(out, "Session will be recorded to: {}\n", transcript_file.display())?;

    let success = match agent::invoke_interactive(
        &config.agent_command,
        &built.add_dirs,
        &transcript_file,
    ) {
        Ok(success) => success,
        Err(err) => {
            writeln!(out, "{err:#}")?;
            writeln!(out, "Is '{}' installed?", config.agent_command)?;
            return Ok(false);
        }
    };

    if transcript_file.exists() {
        transcript::clean_transcript(&transcript_file)?;
        append_transcript_reference(&log_file, &transcript_file)?;
        debug!(path = %transcript_file.display(), "transcript cleaned");
    }

    Ok(success)
}

fn append_transcript_reference(log_file: &Path, transcript_file: &Path) -> io::Result<()> {
    use std::fs::OpenOptions;
    let mut file = OpenOptions::new().append(true).open(log_file)?;
    writeln!(
        file,
        "\n## Session Transcript\n\nSee: {}",
        transcript_file.display()
    )
}

fn complete_task(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    manager: &mut TodoManager,
    token: &str,
) -> anyhow::Result<()> {
    let (id, display_text, recurring) = match manager.resolve(token) {
        Ok(item) => (item.id, item.display_text.clone(), item.recurrence.is_some()),
        Err(err) => {
            writeln!(out, "{err}")?;
            return Ok(());
        }
    };

    let notes = ask(input, out, "Any notes?")?;
    match manager.mark_done(id, &notes, Utc::now()) {
        Ok(successor) => {
            writeln!(out, "Completed: {display_text}")?;
            if recurring {
                if let Some(next) = successor {
                    writeln!(
                        out,
                        "Recurring task - new instance [{}] due {}",
                        next.slug,
                        next.due.map(|due| due.to_string()).unwrap_or_default()
                    )?;
                }
            }
        }
        Err(err) => writeln!(out, "{err}")?,
    }
    Ok(())
}

fn refresh(
    manager: &mut TodoManager,
    rec_count: usize,
) -> anyhow::Result<Vec<RecommendationRow>> {
    // Re-read in case another process touched the store meanwhile.
    manager.load()?;
    Ok(recommendation_rows(manager, rec_count))
}

fn display_recommendations(
    out: &mut dyn Write,
    recommendations: &[RecommendationRow],
) -> io::Result<()> {
    if recommendations.is_empty() {
        return writeln!(out, "No pending tasks found.");
    }

    writeln!(out, "\nRecommended tasks:")?;
    writeln!(out, "{:-<40}", "")?;
    for row in recommendations {
        writeln!(out, "{}. [{}] {}", row.rank, row.slug, row.display_text)?;
        writeln!(out, "   Score: {:.2} - {}", row.score, row.reason)?;
    }
    writeln!(out, "{:-<40}", "")
}

fn display_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "\nCommands:")?;
    writeln!(out, "  <number>     - Work on recommended task")?;
    writeln!(out, "  do <token>   - Work on specific task")?;
    writeln!(out, "  plan <token> - Plan a vague task")?;
    writeln!(out, "  done <token> - Mark task as done")?;
    writeln!(out, "  list         - Show all pending tasks")?;
    writeln!(out, "  more         - Show more recommendations")?;
    writeln!(out, "  quit         - Exit session")?;
    writeln!(out)
}

fn read_line(input: &mut dyn BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn confirm(input: &mut dyn BufRead, out: &mut dyn Write, question: &str) -> anyhow::Result<bool> {
    write!(out, "{question} [y/N] ")?;
    out.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn ask(input: &mut dyn BufRead, out: &mut dyn Write, question: &str) -> anyhow::Result<String> {
    write!(out, "{question} ")?;
    out.flush()?;
    Ok(read_line(input)?.unwrap_or_default().trim().to_string())
}
