//! Target statements, one per buildable project.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use slnmake_core::target::{Linkage, TargetType};
use slnmake_resolver::AssembledSolution;

/// What a statement declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Executable,
    Library(Linkage),
}

impl StatementKind {
    /// `None` for target types that have no statement.
    pub fn from_target_type(target_type: TargetType) -> Option<Self> {
        match target_type {
            TargetType::Executable => Some(Self::Executable),
            TargetType::Library(linkage) => Some(Self::Library(linkage)),
            TargetType::Unknown => None,
        }
    }
}

/// One executable or library declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStatement {
    pub name: String,
    pub identifier: String,
    pub kind: StatementKind,
    /// Project directory relative to the solution; empty at the root.
    pub directory: String,
    /// Sources relative to the project directory, in parse order.
    pub sources: Vec<String>,
}

impl BuildStatement {
    /// Sources relative to the solution directory.
    pub fn source_paths(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| join_dir(&self.directory, s))
            .collect()
    }

    /// The `add_executable` / `add_library` line.
    pub fn directive(&self) -> String {
        let mut tokens = vec![quote_token(&self.name).into_owned()];
        let command = match self.kind {
            StatementKind::Executable => "add_executable",
            StatementKind::Library(linkage) => {
                tokens.push(linkage.cmake_keyword().to_string());
                "add_library"
            }
        };
        tokens.extend(self.source_paths().iter().map(|s| quote_token(s).into_owned()));
        format!("{command}({})", tokens.join(" "))
    }
}

/// Something the generator skipped or degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GenerationWarning {
    /// The project's target type could not be inferred; no statement emitted.
    UnknownTargetType { project: String },
    /// A setting used a build-system macro with no CMake equivalent and was
    /// dropped.
    UnresolvedMacro {
        project: String,
        value: String,
        name: String,
    },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTargetType { project } => {
                write!(f, "project '{project}' has no known target type and was skipped")
            }
            Self::UnresolvedMacro {
                project,
                value,
                name,
            } => write!(
                f,
                "project '{project}': dropped '{value}', macro $({name}) has no CMake equivalent"
            ),
        }
    }
}

/// Ordered statements plus the warnings collected while producing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildDescription {
    pub statements: Vec<BuildStatement>,
    pub warnings: Vec<GenerationWarning>,
}

impl BuildDescription {
    /// Statement lines joined with `\n`, without a trailing newline.
    pub fn to_directives(&self) -> String {
        self.statements
            .iter()
            .map(BuildStatement::directive)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn statement(&self, identifier: &str) -> Option<&BuildStatement> {
        self.statements.iter().find(|s| s.identifier == identifier)
    }
}

/// Produce one statement per project of known type, in declaration order.
pub fn generate(assembled: &AssembledSolution) -> BuildDescription {
    let mut description = BuildDescription::default();
    for project in &assembled.projects {
        let Some(kind) = StatementKind::from_target_type(project.record.target_type) else {
            tracing::warn!("project '{}' has an unknown target type, skipping", project.name());
            description.warnings.push(GenerationWarning::UnknownTargetType {
                project: project.name().to_string(),
            });
            continue;
        };
        description.statements.push(BuildStatement {
            name: project.name().to_string(),
            identifier: project.identifier().to_string(),
            kind,
            directory: project.reference.directory(),
            sources: project.record.sources.iter().map(|s| s.path.clone()).collect(),
        });
    }
    tracing::debug!(
        "generated {} statements, {} warnings",
        description.statements.len(),
        description.warnings.len()
    );
    description
}

pub(crate) fn join_dir(directory: &str, path: &str) -> String {
    if directory.is_empty() {
        path.to_string()
    } else {
        format!("{directory}/{path}")
    }
}

/// Quote a CMake argument if it contains whitespace, `;` or characters
/// that would otherwise end an unquoted argument.
pub(crate) fn quote_token(token: &str) -> Cow<'_, str> {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ';' | '(' | ')' | '"' | '#' | '\\'));
    if needs_quotes {
        Cow::Owned(quote(token))
    } else {
        Cow::Borrowed(token)
    }
}

/// Always-quoted CMake argument.
pub(crate) fn quote(token: &str) -> String {
    format!("\"{}\"", token.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(kind: StatementKind, directory: &str, sources: &[&str]) -> BuildStatement {
        BuildStatement {
            name: "NAME".to_string(),
            identifier: "{ID}".to_string(),
            kind,
            directory: directory.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn executable_directive() {
        let s = statement(StatementKind::Executable, "", &["a.cpp", "b.cpp"]);
        assert_eq!(s.directive(), "add_executable(NAME a.cpp b.cpp)");
    }

    #[test]
    fn library_directive_carries_linkage() {
        let s = statement(StatementKind::Library(Linkage::Shared), "", &["x.cpp"]);
        assert_eq!(s.directive(), "add_library(NAME SHARED x.cpp)");
    }

    #[test]
    fn sources_are_prefixed_and_quoted() {
        let s = statement(
            StatementKind::Library(Linkage::Static),
            "Core",
            &["src/core.cpp", "src/math utils.cpp"],
        );
        assert_eq!(
            s.directive(),
            r#"add_library(NAME STATIC Core/src/core.cpp "Core/src/math utils.cpp")"#
        );
    }

    #[test]
    fn statement_without_sources() {
        let s = statement(StatementKind::Executable, "App", &[]);
        assert_eq!(s.directive(), "add_executable(NAME)");
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(quote_token("plain.cpp"), "plain.cpp");
        assert_eq!(quote_token("a;b"), "\"a;b\"");
        assert_eq!(quote_token(""), "\"\"");
        assert_eq!(quote_token("say \"hi\""), r#""say \"hi\"""#);
    }

    #[test]
    fn warnings_display() {
        let w = GenerationWarning::UnknownTargetType {
            project: "Docs".to_string(),
        };
        assert_eq!(
            w.to_string(),
            "project 'Docs' has no known target type and was skipped"
        );
    }
}
