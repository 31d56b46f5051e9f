//! Joins a parsed solution with its parsed projects.

use std::collections::HashSet;

use globset::GlobSet;
use slnmake_core::loader::ProjectLoader;
use slnmake_core::project::{parse_project, ProjectRecord};
use slnmake_core::solution::{normalize_id, ProjectReference, SolutionRecord};
use slnmake_util::errors::AssemblyError;

use crate::graph::{ProjectGraph, ProjectNode};

/// A solution reference joined with its parsed project manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledProject {
    pub reference: ProjectReference,
    pub record: ProjectRecord,
}

impl AssembledProject {
    pub fn name(&self) -> &str {
        &self.reference.name
    }

    pub fn identifier(&self) -> &str {
        &self.reference.identifier
    }
}

/// A fully loaded solution. Never partially populated.
#[derive(Debug, Clone)]
pub struct AssembledSolution {
    /// The solution record, with excluded projects removed and project-level
    /// references merged into `dependencies`.
    pub solution: SolutionRecord,
    /// Loaded projects in declaration order. Solution folders are not loaded.
    pub projects: Vec<AssembledProject>,
    /// Names of projects dropped by exclude patterns.
    pub excluded: Vec<String>,
    graph: ProjectGraph,
}

impl AssembledSolution {
    /// Look up a loaded project; identifiers compare case-insensitively.
    pub fn project(&self, identifier: &str) -> Option<&AssembledProject> {
        let identifier = normalize_id(identifier);
        self.projects.iter().find(|p| p.identifier() == identifier)
    }

    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    /// Loaded projects, dependencies first.
    pub fn build_order(&self) -> Vec<&AssembledProject> {
        // Acyclic: checked during assembly.
        self.graph
            .build_order()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|node: &ProjectNode| self.project(&node.identifier))
            .collect()
    }
}

/// Options for [`assemble_with`].
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Projects whose names match are dropped before loading.
    pub exclude: GlobSet,
}

/// Assemble `solution` using `loader` to fetch each project manifest.
pub fn assemble(
    solution: &SolutionRecord,
    loader: &dyn ProjectLoader,
) -> Result<AssembledSolution, AssemblyError> {
    assemble_with(solution, loader, &AssembleOptions::default())
}

/// Assemble with exclude patterns applied.
///
/// Referential integrity is checked against the full solution before any
/// project is loaded or excluded.
pub fn assemble_with(
    solution: &SolutionRecord,
    loader: &dyn ProjectLoader,
    options: &AssembleOptions,
) -> Result<AssembledSolution, AssemblyError> {
    validate_references(solution)?;

    let mut solution = solution.clone();
    let excluded = apply_excludes(&mut solution, &options.exclude);

    let mut projects = Vec::new();
    for reference in solution.projects.iter().filter(|r| !r.is_solution_folder()) {
        projects.push(load_project(reference, loader)?);
    }

    let known: HashSet<String> = solution
        .projects
        .iter()
        .map(|p| p.identifier.clone())
        .collect();
    let dropped = excluded_ids(&excluded);
    for project in &projects {
        for target in &project.record.references {
            if known.contains(target) {
                solution.add_dependency(project.identifier(), target, None);
            } else if !dropped.contains(target.as_str()) {
                return Err(AssemblyError::DanglingReference {
                    identifier: target.clone(),
                    context: format!("ProjectReference in '{}'", project.name()),
                });
            }
        }
    }

    let mut graph = ProjectGraph::new();
    for project in &projects {
        graph.add_project(project.identifier(), project.name());
    }
    for edge in &solution.dependencies {
        if !graph.add_dependency(&edge.from, &edge.to) {
            tracing::debug!("dependency {} -> {} skipped: not a loaded project", edge.from, edge.to);
        }
    }
    graph.build_order()?;

    tracing::debug!(
        "assembled solution '{}': {} projects, {} edges",
        solution.name,
        projects.len(),
        solution.dependencies.len()
    );
    Ok(AssembledSolution {
        solution,
        projects,
        excluded: excluded.into_iter().map(|(_, name)| name).collect(),
        graph,
    })
}

fn excluded_ids(excluded: &[(String, String)]) -> HashSet<&str> {
    excluded.iter().map(|(id, _)| id.as_str()).collect()
}

/// Every dependency endpoint and configuration identifier must name a
/// declared project.
fn validate_references(solution: &SolutionRecord) -> Result<(), AssemblyError> {
    let known: HashSet<&str> = solution
        .projects
        .iter()
        .map(|p| p.identifier.as_str())
        .collect();

    for edge in &solution.dependencies {
        for end in [&edge.from, &edge.to] {
            if !known.contains(end.as_str()) {
                return Err(AssemblyError::DanglingReference {
                    identifier: end.clone(),
                    context: "ProjectDependencies".to_string(),
                });
            }
        }
    }
    for identifier in solution.configurations.keys() {
        if !known.contains(identifier.as_str()) {
            return Err(AssemblyError::DanglingReference {
                identifier: identifier.clone(),
                context: "ProjectConfigurationPlatforms".to_string(),
            });
        }
    }
    Ok(())
}

/// Drop references matching `exclude` along with their edges and
/// configuration entries. Returns `(identifier, name)` of each dropped project.
fn apply_excludes(solution: &mut SolutionRecord, exclude: &GlobSet) -> Vec<(String, String)> {
    if exclude.is_empty() {
        return Vec::new();
    }
    let mut dropped = Vec::new();
    solution.projects.retain(|p| {
        let keep = !exclude.is_match(&p.name);
        if !keep {
            tracing::debug!("excluding project '{}'", p.name);
            dropped.push((p.identifier.clone(), p.name.clone()));
        }
        keep
    });
    let ids = excluded_ids(&dropped);
    solution
        .dependencies
        .retain(|e| !ids.contains(e.from.as_str()) && !ids.contains(e.to.as_str()));
    solution.dependency_tags.retain(|k, _| !ids.contains(k.as_str()));
    solution.configurations.retain(|k, _| !ids.contains(k.as_str()));
    dropped
}

fn load_project(
    reference: &ProjectReference,
    loader: &dyn ProjectLoader,
) -> Result<AssembledProject, AssemblyError> {
    let path = reference.manifest_path();
    tracing::debug!("loading project '{}' from {}", reference.name, path.display());
    let text = loader
        .load(&path)
        .map_err(|e| AssemblyError::UnresolvedProject {
            name: reference.name.clone(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let record = parse_project(&text).map_err(|source| AssemblyError::InvalidProject {
        name: reference.name.clone(),
        source,
    })?;
    Ok(AssembledProject {
        reference: reference.clone(),
        record,
    })
}
