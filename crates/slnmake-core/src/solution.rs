//! Solution manifest (`.sln`) parsing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use slnmake_util::errors::ParseError;
use slnmake_util::fs::normalize_separators;

use crate::scan::{self, ProjectDecl, SolutionLine};

/// Project type id Visual Studio uses for solution folders.
pub const SOLUTION_FOLDER_TYPE: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";

/// Project type id of native C++ projects.
pub const VCXPROJ_TYPE: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";

const PROJECT_CONFIGURATION_PLATFORMS: &str = "ProjectConfigurationPlatforms";
const SOLUTION_CONFIGURATION_PLATFORMS: &str = "SolutionConfigurationPlatforms";
const PROJECT_DEPENDENCIES: &str = "ProjectDependencies";

/// Canonical form of a project identifier. Identifiers compare
/// case-insensitively.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}

/// A project declared in the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReference {
    pub name: String,
    /// Manifest path relative to the solution, as written in the solution.
    pub path: String,
    pub identifier: String,
    pub type_id: String,
}

impl ProjectReference {
    /// Manifest path with `/` separators.
    pub fn manifest_path(&self) -> PathBuf {
        PathBuf::from(normalize_separators(&self.path))
    }

    /// Directory holding the manifest, relative to the solution; empty when
    /// the manifest sits next to the solution.
    pub fn directory(&self) -> String {
        let normalized = normalize_separators(&self.path);
        match normalized.rsplit_once('/') {
            Some((dir, _)) => dir.to_string(),
            None => String::new(),
        }
    }

    pub fn is_solution_folder(&self) -> bool {
        self.type_id.eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE)
    }
}

/// `from` depends on `to`. Both ends are project identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub tag: Option<String>,
}

/// The parsed representation of a solution manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolutionRecord {
    pub name: String,
    pub format_version: Option<String>,
    pub projects: Vec<ProjectReference>,
    pub dependencies: Vec<DependencyEdge>,
    /// Dependency key → classification tag from `[<tag>]`.
    pub dependency_tags: BTreeMap<String, Option<String>>,
    /// Identifier → configuration key (`Debug|Win32.ActiveCfg`) → value.
    pub configurations: BTreeMap<String, BTreeMap<String, String>>,
    pub solution_configurations: Vec<String>,
}

impl SolutionRecord {
    /// Look up a reference by identifier (case-insensitive).
    pub fn reference(&self, identifier: &str) -> Option<&ProjectReference> {
        let id = normalize_id(identifier);
        self.projects.iter().find(|p| p.identifier == id)
    }

    /// Raw configuration value for `identifier` and a full key such as
    /// `Debug|Win32.ActiveCfg`.
    pub fn configuration(&self, identifier: &str, key: &str) -> Option<&str> {
        self.configurations
            .get(&normalize_id(identifier))?
            .get(key)
            .map(String::as_str)
    }

    /// Project configuration that is active when the solution is built in
    /// `solution_config` (e.g. `Debug|Win32`).
    pub fn active_configuration(&self, identifier: &str, solution_config: &str) -> Option<&str> {
        self.configuration(identifier, &format!("{solution_config}.ActiveCfg"))
    }

    /// Identifiers of the projects `identifier` depends on, in declaration order.
    pub fn dependencies_of(&self, identifier: &str) -> Vec<&str> {
        let id = normalize_id(identifier);
        self.dependencies
            .iter()
            .filter(|e| e.from == id)
            .map(|e| e.to.as_str())
            .collect()
    }

    /// Add an edge unless an identical one exists. Self-edges are ignored.
    pub fn add_dependency(&mut self, from: &str, to: &str, tag: Option<String>) {
        let (from, to) = (normalize_id(from), normalize_id(to));
        if from == to || self.dependencies.iter().any(|e| e.from == from && e.to == to) {
            return;
        }
        self.dependencies.push(DependencyEdge { from, to, tag });
    }
}

#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    TopLevel,
    Project { index: usize },
    ProjectSection { index: usize, kind: &'a str, opened: usize },
    Global,
    GlobalSection { kind: &'a str, opened: usize, in_global: bool },
}

/// Parse solution manifest text into a [`SolutionRecord`].
///
/// The header is the first line after blank lines and the solution preamble
/// (format banner, `#` comments, `VisualStudioVersion` lines). A header that
/// is itself a project declaration names the solution after that project;
/// any other header must carry a quoted name.
pub fn parse_solution(text: &str) -> Result<SolutionRecord, ParseError> {
    let mut record = SolutionRecord::default();
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
    let mut scope = Scope::TopLevel;

    let mut last_line = 0;
    loop {
        let Some((n, line)) = lines.next() else {
            return Err(ParseError::MalformedHeader {
                line: last_line + 1,
                expected: "a header line with a quoted name".to_string(),
            });
        };
        last_line = n;
        match scan::classify_solution_line(line) {
            SolutionLine::Blank | SolutionLine::Preamble => continue,
            SolutionLine::Banner { version } => {
                record.format_version = Some(version.to_string());
            }
            SolutionLine::Project(decl) => {
                record.name = decl.name.to_string();
                scope = open_project(&mut record, &decl, n)?;
                break;
            }
            SolutionLine::MalformedProject => return Err(malformed_declaration(n)),
            _ => {
                let name = scan::outer_quoted(line).ok_or_else(|| ParseError::MalformedHeader {
                    line: n,
                    expected: "a header line with a quoted name".to_string(),
                })?;
                record.name = name.to_string();
                break;
            }
        }
    }

    for (n, line) in lines {
        scope = step(&mut record, scope, n, line)?;
    }

    match scope {
        Scope::ProjectSection { kind, opened, .. } => Err(ParseError::UnterminatedSection {
            line: opened,
            section: format!("ProjectSection({kind})"),
        }),
        Scope::GlobalSection { kind, opened, .. } => Err(ParseError::UnterminatedSection {
            line: opened,
            section: format!("GlobalSection({kind})"),
        }),
        _ => {
            tracing::debug!(
                "parsed solution '{}': {} projects, {} dependency edges",
                record.name,
                record.projects.len(),
                record.dependencies.len()
            );
            Ok(record)
        }
    }
}

fn step<'a>(
    record: &mut SolutionRecord,
    scope: Scope<'a>,
    n: usize,
    line: &'a str,
) -> Result<Scope<'a>, ParseError> {
    let kind = scan::classify_solution_line(line);
    if kind == SolutionLine::Blank {
        return Ok(scope);
    }

    match scope {
        Scope::ProjectSection {
            index,
            kind: section,
            ..
        } => {
            if kind == SolutionLine::EndProjectSection {
                return Ok(Scope::Project { index });
            }
            if section == PROJECT_DEPENDENCIES {
                let dep = scan::dependency_line(line).ok_or_else(|| {
                    ParseError::MalformedSectionLine {
                        line: n,
                        section: PROJECT_DEPENDENCIES.to_string(),
                        expected: "<key> = <value> [<tag>]".to_string(),
                    }
                })?;
                let from = record.projects[index].identifier.clone();
                let tag = dep.tag.map(str::to_string);
                record
                    .dependency_tags
                    .insert(normalize_id(dep.value), tag.clone());
                record.add_dependency(&from, dep.value, tag);
            }
            Ok(scope)
        }
        Scope::GlobalSection {
            kind: section,
            in_global,
            ..
        } => {
            if kind == SolutionLine::EndGlobalSection {
                return Ok(if in_global {
                    Scope::Global
                } else {
                    Scope::TopLevel
                });
            }
            match section {
                PROJECT_CONFIGURATION_PLATFORMS => {
                    let cfg = scan::config_platform_line(line).ok_or_else(|| {
                        ParseError::MalformedSectionLine {
                            line: n,
                            section: PROJECT_CONFIGURATION_PLATFORMS.to_string(),
                            expected: "<identifier>.<configuration>.<suffix> = <value>".to_string(),
                        }
                    })?;
                    record
                        .configurations
                        .entry(normalize_id(cfg.identifier))
                        .or_default()
                        .insert(cfg.key.to_string(), cfg.value.to_string());
                }
                SOLUTION_CONFIGURATION_PLATFORMS => {
                    let (key, _) = scan::assignment(line).ok_or_else(|| {
                        ParseError::MalformedSectionLine {
                            line: n,
                            section: SOLUTION_CONFIGURATION_PLATFORMS.to_string(),
                            expected: "<configuration> = <configuration>".to_string(),
                        }
                    })?;
                    if !record.solution_configurations.iter().any(|c| c == key) {
                        record.solution_configurations.push(key.to_string());
                    }
                }
                _ => {}
            }
            Ok(scope)
        }
        Scope::TopLevel | Scope::Project { .. } | Scope::Global => match kind {
            SolutionLine::Project(decl) => open_project(record, &decl, n),
            SolutionLine::MalformedProject => Err(malformed_declaration(n)),
            SolutionLine::EndProject => Ok(Scope::TopLevel),
            SolutionLine::ProjectSection { kind } => match scope {
                Scope::Project { index } => Ok(Scope::ProjectSection {
                    index,
                    kind,
                    opened: n,
                }),
                _ => Err(ParseError::MalformedSectionLine {
                    line: n,
                    section: format!("ProjectSection({kind})"),
                    expected: "a ProjectSection inside a Project block".to_string(),
                }),
            },
            SolutionLine::Global => Ok(Scope::Global),
            SolutionLine::EndGlobal => Ok(Scope::TopLevel),
            SolutionLine::GlobalSection { kind } => Ok(Scope::GlobalSection {
                kind,
                opened: n,
                in_global: matches!(scope, Scope::Global),
            }),
            _ => Ok(scope),
        },
    }
}

fn open_project<'a>(
    record: &mut SolutionRecord,
    decl: &ProjectDecl<'_>,
    n: usize,
) -> Result<Scope<'a>, ParseError> {
    let identifier = normalize_id(decl.identifier);
    if record.projects.iter().any(|p| p.identifier == identifier) {
        return Err(ParseError::MalformedSectionLine {
            line: n,
            section: "Project declarations".to_string(),
            expected: format!("a unique project identifier, {identifier} is declared twice"),
        });
    }
    tracing::debug!("solution declares project '{}' at {}", decl.name, decl.path);
    record.projects.push(ProjectReference {
        name: decl.name.to_string(),
        path: decl.path.to_string(),
        identifier,
        type_id: normalize_id(decl.type_id),
    });
    Ok(Scope::Project {
        index: record.projects.len() - 1,
    })
}

fn malformed_declaration(n: usize) -> ParseError {
    ParseError::MalformedSectionLine {
        line: n,
        section: "Project declarations".to_string(),
        expected: r#"Project("{TYPE}") = "Name", "Path", "{ID}""#.to_string(),
    }
}
