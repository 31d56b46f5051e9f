//! Operation: find and parse the solution a command works on.

use std::path::{Path, PathBuf};

use slnmake_core::solution::{parse_solution, SolutionRecord};
use slnmake_util::errors::SlnmakeError;
use slnmake_util::fs::files_with_extension;

/// Resolve the solution file to use.
///
/// An explicit file is used as-is; an explicit directory, or `cwd` when
/// nothing is given, must contain exactly one `.sln` file.
pub fn locate_solution(explicit: Option<&Path>, cwd: &Path) -> miette::Result<PathBuf> {
    let candidate = match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => cwd.to_path_buf(),
    };

    if candidate.is_file() {
        return Ok(candidate);
    }
    if !candidate.is_dir() {
        return Err(SlnmakeError::SolutionNotFound {
            message: format!("{} does not exist", candidate.display()),
        }
        .into());
    }

    let mut found = files_with_extension(&candidate, "sln").map_err(SlnmakeError::Io)?;
    match found.len() {
        0 => Err(SlnmakeError::SolutionNotFound {
            message: format!("no .sln file found in {}", candidate.display()),
        }
        .into()),
        1 => Ok(found.remove(0)),
        _ => {
            let names: Vec<String> = found
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            Err(SlnmakeError::SolutionNotFound {
                message: format!(
                    "{} contains several solutions ({}), pass one explicitly",
                    candidate.display(),
                    names.join(", ")
                ),
            }
            .into())
        }
    }
}

/// Read and parse a solution file.
pub fn load_solution(path: &Path) -> miette::Result<SolutionRecord> {
    let text = std::fs::read_to_string(path).map_err(SlnmakeError::Io)?;
    parse_solution(&text).map_err(|source| {
        SlnmakeError::InvalidSolution {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

/// Directory the solution's relative paths are resolved against.
pub fn solution_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."))
}
