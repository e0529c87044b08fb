//! `chai next` — ranked recommendations for what to work on.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use clap::Args;
use serde::Serialize;

use chai_core::config::UserConfig;
use chai_core::{Store, TodoManager};
use chai_triage::get_recommendations;

use crate::cmd::fail_core;
use crate::output::{OutputMode, pretty_rule, render, render_mode};

#[derive(Args, Debug)]
pub struct NextArgs {
    /// How many recommendations to show (default from config).
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

/// One ranked recommendation as rendered to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRow {
    pub rank: usize,
    pub id: u64,
    pub slug: String,
    pub display_text: String,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
struct NextReport {
    recommendations: Vec<RecommendationRow>,
}

#[derive(Debug, Serialize)]
struct EmptyNext {
    message: String,
}

/// Score the pending set and collect the top `count` as owned rows.
///
/// The rows outlive the manager borrow, so the session loop can hold a
/// snapshot across mutations.
pub fn recommendation_rows(manager: &TodoManager, count: usize) -> Vec<RecommendationRow> {
    get_recommendations(manager, Utc::now(), count)
        .iter()
        .enumerate()
        .map(|(idx, entry)| RecommendationRow {
            rank: idx + 1,
            id: entry.item.id,
            slug: entry.item.slug.clone(),
            display_text: entry.item.display_text.clone(),
            score: entry.score,
            reason: entry.reason.clone(),
        })
        .collect()
}

/// Execute `chai next`.
///
/// # Errors
///
/// Fails when the store cannot be read.
pub fn run_next(
    args: &NextArgs,
    output: OutputMode,
    space: &Path,
    config: &UserConfig,
) -> anyhow::Result<()> {
    let manager =
        TodoManager::open(Store::in_space(space)).map_err(|err| fail_core(output, &err))?;

    let count = args.count.unwrap_or(config.recommendations_count);
    let rows = recommendation_rows(&manager, count);

    if rows.is_empty() {
        let empty = EmptyNext {
            message: "No pending tasks found.".to_string(),
        };
        return render(output, &empty, |value, w| writeln!(w, "{}", value.message));
    }

    let report = NextReport {
        recommendations: rows,
    };
    render_mode(
        output,
        &report,
        |report, w| render_next_text(report, w),
        |report, w| render_next_pretty(report, w),
    )
}

fn score_bar(score: f64) -> String {
    const WIDTH: usize = 20;

    let normalized = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else if score == f64::INFINITY {
        1.0
    } else {
        // NaN and negative infinity render as empty.
        0.0
    };

    let filled = (normalized * WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(WIDTH - filled))
}

fn render_next_pretty(report: &NextReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Recommended tasks")?;
    pretty_rule(w)?;
    for row in &report.recommendations {
        writeln!(w, "{}. [{}] {}", row.rank, row.slug, row.display_text)?;
        writeln!(
            w,
            "   [{}] {:.2} - {}",
            score_bar(row.score),
            row.score,
            row.reason
        )?;
    }
    pretty_rule(w)?;
    Ok(())
}

fn render_next_text(report: &NextReport, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &report.recommendations {
        writeln!(
            w,
            "rank={}  {}  score={:.4}  {}  why={}",
            row.rank, row.id, row.score, row.slug, row.reason
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NextArgs, score_bar};

    #[test]
    fn next_args_count_is_optional() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: NextArgs,
        }
        assert!(Wrapper::parse_from(["test"]).args.count.is_none());
        assert_eq!(
            Wrapper::parse_from(["test", "-n", "5"]).args.count,
            Some(5)
        );
    }

    #[test]
    fn score_bar_clamps_to_unit_range() {
        assert_eq!(score_bar(0.0), "░".repeat(20));
        assert_eq!(score_bar(1.5), "█".repeat(20));
        assert_eq!(score_bar(f64::NAN), "░".repeat(20));
    }
}
