//! Operation: describe a solution without writing anything.

use std::fmt::Write;
use std::path::Path;

use serde::Serialize;
use slnmake_core::config::ConvertConfig;
use slnmake_core::target::{Linkage, TargetType};
use slnmake_resolver::{assemble_with, AssembleOptions, AssembledProject, AssembledSolution};
use slnmake_util::errors::SlnmakeError;

use crate::fs_loader::FsLoader;
use crate::ops_locate::{load_solution, solution_dir};

/// Summary of an assembled solution.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub solution: String,
    pub format_version: Option<String>,
    pub configurations: Vec<String>,
    pub projects: Vec<ProjectSummary>,
    pub build_order: Vec<String>,
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub identifier: String,
    pub path: String,
    pub target_type: TargetType,
    pub sources: Vec<String>,
    pub configurations: Vec<String>,
    /// Names of the projects this one depends on.
    pub dependencies: Vec<String>,
}

/// Load, parse and assemble the solution at `solution_path`.
pub fn inspect(solution_path: &Path) -> miette::Result<InspectReport> {
    let solution = load_solution(solution_path)?;
    let dir = solution_dir(solution_path);
    let config = ConvertConfig::load(&dir)?;
    let options = AssembleOptions {
        exclude: config.projects.exclude_set()?,
    };
    let assembled = assemble_with(&solution, &FsLoader::new(&dir), &options)?;
    Ok(InspectReport::from_assembled(&assembled))
}

impl InspectReport {
    pub fn from_assembled(assembled: &AssembledSolution) -> Self {
        let projects = assembled
            .projects
            .iter()
            .map(|p| summarize(p, assembled))
            .collect();
        Self {
            solution: assembled.solution.name.clone(),
            format_version: assembled.solution.format_version.clone(),
            configurations: assembled.solution.solution_configurations.clone(),
            projects,
            build_order: assembled
                .build_order()
                .iter()
                .map(|p| p.name().to_string())
                .collect(),
            excluded: assembled.excluded.clone(),
        }
    }

    pub fn to_json(&self) -> miette::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SlnmakeError::Generic {
                message: format!("Failed to serialize report: {e}"),
            }
            .into()
        })
    }

    /// Human-readable listing.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "Solution: {}", self.solution);
        if let Some(version) = &self.format_version {
            let _ = write!(out, " (format {version})");
        }
        out.push('\n');
        if !self.configurations.is_empty() {
            let _ = writeln!(out, "Configurations: {}", self.configurations.join(", "));
        }

        out.push_str("\nProjects:\n");
        for project in &self.projects {
            let _ = writeln!(
                out,
                "  {} [{}] {}",
                project.name,
                describe(project.target_type),
                project.path
            );
            let _ = write!(out, "      {} source(s)", project.sources.len());
            if !project.configurations.is_empty() {
                let _ = write!(out, "; configurations: {}", project.configurations.join(", "));
            }
            out.push('\n');
            if !project.dependencies.is_empty() {
                let _ = writeln!(out, "      depends on: {}", project.dependencies.join(", "));
            }
        }
        if !self.excluded.is_empty() {
            let _ = writeln!(out, "\nExcluded: {}", self.excluded.join(", "));
        }
        let _ = writeln!(out, "\nBuild order: {}", self.build_order.join(", "));
        out
    }
}

fn summarize(project: &AssembledProject, assembled: &AssembledSolution) -> ProjectSummary {
    let dependencies = assembled
        .graph()
        .dependencies_of(project.identifier())
        .into_iter()
        .filter_map(|id| assembled.project(id))
        .map(|p| p.name().to_string())
        .collect();
    ProjectSummary {
        name: project.name().to_string(),
        identifier: project.identifier().to_string(),
        path: project.reference.manifest_path().display().to_string(),
        target_type: project.record.target_type,
        sources: project.record.sources.iter().map(|s| s.path.clone()).collect(),
        configurations: project
            .record
            .configuration_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        dependencies,
    }
}

fn describe(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Executable => "executable",
        TargetType::Library(Linkage::Static) => "static library",
        TargetType::Library(Linkage::Shared) => "shared library",
        TargetType::Unknown => "unknown",
    }
}
