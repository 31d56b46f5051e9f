//! Operation: convert a solution into a `CMakeLists.txt`.

use std::path::{Path, PathBuf};

use slnmake_core::config::ConvertConfig;
use slnmake_generator::{render_cmake, GenerationWarning, RenderOptions};
use slnmake_resolver::{assemble_with, AssembleOptions};
use slnmake_util::errors::SlnmakeError;
use slnmake_util::fs::ensure_dir;
use slnmake_util::progress;

use crate::fs_loader::FsLoader;
use crate::ops_locate::{load_solution, solution_dir};

/// Command-line overrides for a conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Output path; defaults to `[output] file-name` next to the solution.
    pub output: Option<PathBuf>,
    /// Return the text instead of writing it.
    pub to_stdout: bool,
    /// Fail when the generator reports any warning.
    pub strict: bool,
    /// Extra exclude patterns, added to those in `slnmake.toml`.
    pub exclude: Vec<String>,
}

/// Result of a convert operation.
#[derive(Debug)]
pub enum ConvertResult {
    Written {
        path: PathBuf,
        targets: usize,
        warnings: Vec<GenerationWarning>,
    },
    Printed {
        text: String,
        warnings: Vec<GenerationWarning>,
    },
}

/// Convert the solution at `solution_path`.
pub fn convert(solution_path: &Path, options: &ConvertOptions) -> miette::Result<ConvertResult> {
    let file_name = solution_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| solution_path.display().to_string());
    progress::status("Converting", &file_name);

    let solution = load_solution(solution_path)?;
    let dir = solution_dir(solution_path);

    let mut config = ConvertConfig::load(&dir)?;
    config.projects.exclude.extend(options.exclude.iter().cloned());
    let assemble_options = AssembleOptions {
        exclude: config.projects.exclude_set()?,
    };

    let assembled = assemble_with(&solution, &FsLoader::new(&dir), &assemble_options)?;
    for name in &assembled.excluded {
        progress::status_info("Excluded", name);
    }

    let rendered = render_cmake(&assembled, &RenderOptions::from(&config));
    for warning in &rendered.warnings {
        progress::status_warn("Warning", &warning.to_string());
    }
    if options.strict && !rendered.warnings.is_empty() {
        return Err(SlnmakeError::Generation {
            message: format!("{} warning(s) in strict mode", rendered.warnings.len()),
        }
        .into());
    }

    if options.to_stdout {
        return Ok(ConvertResult::Printed {
            text: rendered.text,
            warnings: rendered.warnings,
        });
    }

    let path = options
        .output
        .clone()
        .unwrap_or_else(|| dir.join(&config.output.file_name));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).map_err(SlnmakeError::Io)?;
    }
    std::fs::write(&path, &rendered.text).map_err(SlnmakeError::Io)?;
    tracing::debug!("wrote {} bytes to {}", rendered.text.len(), path.display());

    let targets = assembled
        .projects
        .iter()
        .filter(|p| p.record.target_type.is_known())
        .count();
    Ok(ConvertResult::Written {
        path,
        targets,
        warnings: rendered.warnings,
    })
}
