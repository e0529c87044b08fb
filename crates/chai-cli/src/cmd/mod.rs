//! Command handlers for the `chai` binary.

pub mod add;
pub mod completions;
pub mod done;
pub mod list;
pub mod next;
pub mod session;
pub mod show;

use chai_core::error::CoreError;

use crate::output::{CliError, OutputMode, render_error};

/// Render a core error in the requested mode and turn it into the
/// command's failure value.
pub(crate) fn fail_core(output: OutputMode, err: &CoreError) -> anyhow::Error {
    let cli_err = CliError::from_core(err);
    if let Err(render_err) = render_error(output, &cli_err) {
        return render_err;
    }
    anyhow::anyhow!("{}", cli_err.message)
}

/// Render a structured CLI error and turn it into the command's failure
/// value.
pub(crate) fn fail(output: OutputMode, cli_err: CliError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &cli_err) {
        return render_err;
    }
    anyhow::anyhow!("{}", cli_err.message)
}
