//! Command dispatch and handler modules.

mod convert;
mod inspect;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert {
            solution,
            output,
            stdout,
            strict,
            exclude,
        } => convert::exec(solution.as_deref(), output, stdout, strict, exclude),
        Command::Inspect { solution, json } => inspect::exec(solution.as_deref(), json),
    }
}
