use miette::Result;
use std::path::{Path, PathBuf};

use slnmake_ops::ops_convert::{self, ConvertOptions, ConvertResult};
use slnmake_ops::ops_locate::locate_solution;
use slnmake_util::errors::SlnmakeError;
use slnmake_util::progress;

pub fn exec(
    solution: Option<&Path>,
    output: Option<PathBuf>,
    stdout: bool,
    strict: bool,
    exclude: Vec<String>,
) -> Result<()> {
    let cwd = std::env::current_dir().map_err(SlnmakeError::Io)?;
    let solution_path = locate_solution(solution, &cwd)?;
    tracing::debug!("using solution {}", solution_path.display());

    let options = ConvertOptions {
        output: output.map(|p| if p.is_absolute() { p } else { cwd.join(p) }),
        to_stdout: stdout,
        strict,
        exclude,
    };

    match ops_convert::convert(&solution_path, &options)? {
        ConvertResult::Written {
            path,
            targets,
            warnings,
        } => {
            let summary = if warnings.is_empty() {
                format!("{targets} target(s) -> {}", path.display())
            } else {
                format!(
                    "{targets} target(s) -> {} ({} warning(s))",
                    path.display(),
                    warnings.len()
                )
            };
            progress::status("Finished", &summary);
        }
        ConvertResult::Printed { text, .. } => print!("{text}"),
    }
    Ok(())
}
