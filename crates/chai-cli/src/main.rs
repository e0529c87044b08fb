#![forbid(unsafe_code)]

mod agent;
mod cmd;
mod output;
mod prompt;
mod transcript;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chai: personal task assistant",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format override.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for --format json).
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Tasks",
        about = "Add a new task",
        long_about = "Add a new task to the space, with optional due date and recurrence.",
        after_help = "EXAMPLES:\n    # A one-shot task\n    chai add \"file taxes\" --due 2024-04-15\n\n    # A recurring chore; trailing ! raises priority\n    chai add \"water plants!\" --due 2024-06-01 --every \"3 days\"\n\n    # Emit machine-readable output\n    chai add \"file taxes\" --json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tasks",
        long_about = "List tasks, pending by default.",
        after_help = "EXAMPLES:\n    # Pending tasks\n    chai list\n\n    # Completed tasks\n    chai list --done\n\n    # Everything\n    chai list --all --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one task",
        long_about = "Show full details for a single task by id, slug, or slug prefix.",
        after_help = "EXAMPLES:\n    # Show by slug\n    chai show water-plants\n\n    # A unique prefix works too\n    chai show water\n\n    # Or the numeric id\n    chai show 3"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Mark a task as done",
        long_about = "Mark a task as done. A recurring task spawns its next instance.",
        after_help = "EXAMPLES:\n    # Complete a task\n    chai done water-plants\n\n    # Record completion notes\n    chai done water-plants --notes \"repotted the fern too\""
    )]
    Done(cmd::done::DoneArgs),

    #[command(
        next_help_heading = "Recommend",
        about = "Recommend what to work on next",
        long_about = "Rank pending tasks by due pressure, waiting time, and priority markers.",
        after_help = "EXAMPLES:\n    # Top recommendations\n    chai next\n\n    # Ask for more\n    chai next -n 10\n\n    # Emit machine-readable output\n    chai next --json"
    )]
    Next(cmd::next::NextArgs),

    #[command(
        next_help_heading = "Recommend",
        about = "Interactive session",
        long_about = "Interactive loop: recommendations, agent handoff, and completion.",
        after_help = "EXAMPLES:\n    # Start a session\n    chai session"
    )]
    Session(cmd::session::SessionArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    chai completions bash\n\n    # Generate zsh completions\n    chai completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHAI_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "chai=debug,info"
        } else {
            "chai=info,warn"
        })
    });

    let format = env::var("CHAI_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = chai_core::config::load_user_config()?;
    let space = chai_core::config::space_dir(&config);
    let output = output::resolve_output_mode(cli.format, cli.json);

    match cli.command {
        Commands::Add(ref args) => cmd::add::run_add(args, output, &space),
        Commands::List(ref args) => cmd::list::run_list(args, output, &space),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &space),
        Commands::Done(ref args) => cmd::done::run_done(args, output, &space),
        Commands::Next(ref args) => cmd::next::run_next(args, output, &space, &config),
        Commands::Session(ref args) => cmd::session::run_session(args, &space, &config),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}
