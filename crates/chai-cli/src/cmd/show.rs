//! `chai show` — display full details of a single task.
//!
//! The token may be a numeric id, a slug, or a unique slug prefix.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;

use chai_core::{Store, TodoManager};

use crate::cmd::fail_core;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task to display: id, slug, or unique slug prefix.
    pub token: String,
}

/// Full task detail as returned in JSON output.
#[derive(Debug, Serialize)]
struct ShowTask {
    id: u64,
    slug: String,
    text: String,
    display_text: String,
    done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recurrence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<String>,
    created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<String>,
}

/// Execute `chai show <token>`.
///
/// # Errors
///
/// Fails when the store cannot be read or the token does not resolve to
/// exactly one task.
pub fn run_show(args: &ShowArgs, output: OutputMode, space: &Path) -> anyhow::Result<()> {
    let manager =
        TodoManager::open(Store::in_space(space)).map_err(|err| fail_core(output, &err))?;

    let item = manager
        .resolve(&args.token)
        .map_err(|err| fail_core(output, &err))?;

    let task = ShowTask {
        id: item.id,
        slug: item.slug.clone(),
        text: item.text.clone(),
        display_text: item.display_text.clone(),
        done: item.done,
        notes: item.notes.clone(),
        recurrence: item.recurrence.map(|rule| rule.to_string()),
        due: item.due.map(|due| due.to_string()),
        created: item.created.to_rfc3339(),
        completed_at: item.completed_at.map(|ts| ts.to_rfc3339()),
    };

    render_mode(
        output,
        &task,
        |task, w| render_show_text(task, w),
        |task, w| render_show_pretty(task, w),
    )
}

fn render_show_pretty(task: &ShowTask, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Task {}", task.id))?;
    writeln!(w, "{}", task.display_text)?;
    writeln!(w)?;
    pretty_kv(w, "slug", &task.slug)?;
    pretty_kv(w, "state", if task.done { "done" } else { "open" })?;
    if let Some(due) = &task.due {
        pretty_kv(w, "due", due)?;
    }
    if let Some(rule) = &task.recurrence {
        pretty_kv(w, "repeats", rule)?;
    }
    pretty_kv(w, "created", &task.created)?;
    if let Some(completed) = &task.completed_at {
        pretty_kv(w, "completed", completed)?;
    }
    if let Some(notes) = &task.notes {
        writeln!(w)?;
        pretty_section(w, "Notes")?;
        for line in notes.lines() {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

fn render_show_text(task: &ShowTask, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id:         {}", task.id)?;
    writeln!(w, "slug:       {}", task.slug)?;
    writeln!(w, "state:      {}", if task.done { "done" } else { "open" })?;
    writeln!(w, "text:       {}", task.text)?;
    if let Some(due) = &task.due {
        writeln!(w, "due:        {due}")?;
    }
    if let Some(rule) = &task.recurrence {
        writeln!(w, "repeats:    {rule}")?;
    }
    writeln!(w, "created:    {}", task.created)?;
    if let Some(completed) = &task.completed_at {
        writeln!(w, "completed:  {completed}")?;
    }
    if let Some(notes) = &task.notes {
        writeln!(w, "notes:      {notes}")?;
    }
    Ok(())
}
