//! `chai list` — list tasks with filtering.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;

use chai_core::{Store, TodoManager};

use crate::cmd::fail_core;
use crate::output::{OutputMode, pretty_rule, render_mode};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show completed tasks instead of pending ones.
    #[arg(long)]
    pub done: bool,

    /// Show every task regardless of state.
    #[arg(long, conflicts_with = "done")]
    pub all: bool,

    /// Maximum tasks to show.
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
struct ListRow {
    id: u64,
    slug: String,
    status: &'static str,
    display_text: String,
}

#[derive(Debug, Serialize)]
struct ListReport {
    tasks: Vec<ListRow>,
}

/// Execute `chai list`.
///
/// # Errors
///
/// Fails when the store cannot be read.
pub fn run_list(args: &ListArgs, output: OutputMode, space: &Path) -> anyhow::Result<()> {
    let manager =
        TodoManager::open(Store::in_space(space)).map_err(|err| fail_core(output, &err))?;

    let tasks: Vec<ListRow> = manager
        .items()
        .iter()
        .filter(|item| args.all || item.done == args.done)
        .take(args.limit)
        .map(|item| ListRow {
            id: item.id,
            slug: item.slug.clone(),
            status: if item.done { "done" } else { "open" },
            display_text: item.display_text.clone(),
        })
        .collect();

    let report = ListReport { tasks };
    render_mode(
        output,
        &report,
        |report, w| {
            for row in &report.tasks {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    row.id, row.status, row.slug, row.display_text
                )?;
            }
            Ok(())
        },
        |report, w| render_list_pretty(report, w),
    )
}

fn render_list_pretty(report: &ListReport, w: &mut dyn Write) -> std::io::Result<()> {
    if report.tasks.is_empty() {
        return writeln!(w, "No tasks found.");
    }

    writeln!(w, "{:>4}  {:<6}  {:<24}  TASK", "ID", "STATE", "SLUG")?;
    pretty_rule(w)?;
    for row in &report.tasks {
        writeln!(
            w,
            "{:>4}  {:<6}  {:<24}  {}",
            row.id, row.status, row.slug, row.display_text
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ListArgs;

    #[test]
    fn list_args_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ListArgs,
        }
        let w = Wrapper::parse_from(["test"]);
        assert!(!w.args.done);
        assert!(!w.args.all);
        assert_eq!(w.args.limit, 50);
    }
}
