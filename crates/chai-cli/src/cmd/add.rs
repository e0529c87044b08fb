//! `chai add` — create a new task.

use std::io::Write;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;

use chai_core::error::ErrorCode;
use chai_core::model::recurrence::Recurrence;
use chai_core::{Store, TodoManager};

use crate::cmd::{fail, fail_core};
use crate::output::{CliError, OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task text; trailing `!` markers raise priority.
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<String>,

    /// Recurrence rule, e.g. "every 3 days", "every weekday", "monthly".
    #[arg(long = "every", value_name = "RULE")]
    pub every: Option<String>,
}

/// The created task as reported back to the caller.
#[derive(Debug, Serialize)]
struct CreatedTask {
    id: u64,
    slug: String,
    display_text: String,
}

/// Execute `chai add`.
///
/// # Errors
///
/// Fails on an unparsable due date or recurrence rule, or when the store
/// cannot be written.
pub fn run_add(args: &AddArgs, output: OutputMode, space: &Path) -> anyhow::Result<()> {
    let text = args.text.join(" ");

    let due = match &args.due {
        None => None,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return Err(fail(
                    output,
                    CliError::with_details(
                        format!("invalid due date '{raw}'"),
                        "use the form YYYY-MM-DD, e.g. --due 2024-06-01",
                        "invalid_due_date",
                    ),
                ));
            }
        },
    };

    let recurrence = match &args.every {
        None => None,
        Some(raw) => match raw.parse::<Recurrence>() {
            Ok(rule) => Some(rule),
            Err(err) => {
                let code = ErrorCode::InvalidRecurrence;
                return Err(fail(
                    output,
                    CliError::with_details(
                        err.to_string(),
                        code.hint().unwrap_or_default(),
                        code.code(),
                    ),
                ));
            }
        },
    };

    let mut manager = TodoManager::open(Store::in_space(space))
        .map_err(|err| fail_core(output, &err))?;
    let item = manager
        .add(&text, due, recurrence, Utc::now())
        .map_err(|err| fail_core(output, &err))?;

    let created = CreatedTask {
        id: item.id,
        slug: item.slug.clone(),
        display_text: item.display_text.clone(),
    };
    render_mode(
        output,
        &created,
        |task, w| writeln!(w, "{}  created  [{}] {}", task.id, task.slug, task.display_text),
        |task, w| writeln!(w, "Added [{}] {}", task.slug, task.display_text),
    )
}
