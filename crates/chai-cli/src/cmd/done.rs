//! `chai done` — mark a task complete.
//!
//! Completing a recurring task spawns its successor; the new instance is
//! reported so the user sees the next due date immediately.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use clap::Args;
use serde::Serialize;

use chai_core::{Store, TodoManager};

use crate::cmd::fail_core;
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Task to complete: id, slug, or unique slug prefix.
    pub token: String,

    /// Completion notes to record on the task.
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct DoneReport {
    completed_id: u64,
    completed_slug: String,
    display_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    successor: Option<SuccessorReport>,
}

#[derive(Debug, Serialize)]
struct SuccessorReport {
    id: u64,
    slug: String,
    due: String,
}

/// Execute `chai done <token>`.
///
/// # Errors
///
/// Fails when the token does not resolve, the task is already done, or
/// the completed state cannot be persisted.
pub fn run_done(args: &DoneArgs, output: OutputMode, space: &Path) -> anyhow::Result<()> {
    let mut manager =
        TodoManager::open(Store::in_space(space)).map_err(|err| fail_core(output, &err))?;

    let (id, slug) = {
        let item = manager
            .resolve(&args.token)
            .map_err(|err| fail_core(output, &err))?;
        (item.id, item.slug.clone())
    };

    let notes = args.notes.as_deref().unwrap_or_default();
    let successor = manager
        .mark_done(id, notes, Utc::now())
        .map_err(|err| fail_core(output, &err))?;

    let display_text = manager
        .get(id)
        .map(|item| item.display_text.clone())
        .unwrap_or_default();

    let report = DoneReport {
        completed_id: id,
        completed_slug: slug,
        display_text,
        successor: successor.map(|item| SuccessorReport {
            id: item.id,
            slug: item.slug,
            due: item.due.map(|due| due.to_string()).unwrap_or_default(),
        }),
    };

    render_mode(
        output,
        &report,
        |report, w| render_done_text(report, w),
        |report, w| render_done_pretty(report, w),
    )
}

fn render_done_pretty(report: &DoneReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Completed: {}", report.display_text)?;
    if let Some(next) = &report.successor {
        writeln!(
            w,
            "Recurring task - new instance [{}] due {}",
            next.slug, next.due
        )?;
    }
    Ok(())
}

fn render_done_text(report: &DoneReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}  done  {}",
        report.completed_id, report.completed_slug
    )?;
    if let Some(next) = &report.successor {
        writeln!(w, "{}  spawned  {}  due={}", next.id, next.slug, next.due)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::DoneArgs;

    #[test]
    fn done_args_parses_token_and_notes() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: DoneArgs,
        }
        let w = Wrapper::parse_from(["test", "water-plants", "--notes", "repotted the fern"]);
        assert_eq!(w.args.token, "water-plants");
        assert_eq!(w.args.notes.as_deref(), Some("repotted the fern"));
    }
}
