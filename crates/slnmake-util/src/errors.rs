use miette::Diagnostic;
use thiserror::Error;

/// A defect in solution or project manifest text.
///
/// Every variant carries the 1-based line number of the offending line and a
/// short description of the shape that was expected there. A parse error is
/// fatal for the manifest being parsed; no partial record is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    /// The header line does not carry a quoted name.
    #[error("line {line}: malformed header, expected {expected}")]
    #[diagnostic(
        code(slnmake::parse::header),
        help("The first line after the solution preamble must contain a quoted name")
    )]
    MalformedHeader { line: usize, expected: String },

    /// A line inside a solution section does not match the section's shape.
    #[error("line {line}: malformed line in {section}, expected {expected}")]
    #[diagnostic(code(slnmake::parse::section_line))]
    MalformedSectionLine {
        line: usize,
        section: String,
        expected: String,
    },

    /// A configuration line in a project manifest is missing a marker.
    #[error("line {line}: malformed configuration line, expected {expected}")]
    #[diagnostic(code(slnmake::parse::config_line))]
    MalformedConfigLine { line: usize, expected: String },

    /// A `<ClCompile Include=...>` item is malformed.
    #[error("line {line}: malformed source entry, expected {expected}")]
    #[diagnostic(code(slnmake::parse::source_entry))]
    MalformedSourceEntry { line: usize, expected: String },

    /// A section was opened but its end marker never appeared.
    #[error("line {line}: {section} is never closed")]
    #[diagnostic(code(slnmake::parse::unterminated))]
    UnterminatedSection { line: usize, section: String },
}

impl ParseError {
    /// Line number the error points at.
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedHeader { line, .. }
            | Self::MalformedSectionLine { line, .. }
            | Self::MalformedConfigLine { line, .. }
            | Self::MalformedSourceEntry { line, .. }
            | Self::UnterminatedSection { line, .. } => *line,
        }
    }
}

/// Failure to assemble a solution graph. Assembly is all-or-nothing.
#[derive(Debug, Error, Diagnostic)]
pub enum AssemblyError {
    /// The loader could not produce text for a referenced project.
    #[error("project '{name}' could not be loaded from {path}: {reason}")]
    #[diagnostic(
        code(slnmake::assemble::unresolved),
        help("Check that the path in the solution file exists relative to the solution")
    )]
    UnresolvedProject {
        name: String,
        path: String,
        reason: String,
    },

    /// A configuration key or dependency edge names an unknown project.
    #[error("{context} references unknown project {identifier}")]
    #[diagnostic(code(slnmake::assemble::dangling))]
    DanglingReference { identifier: String, context: String },

    /// A referenced project manifest failed to parse.
    #[error("project '{name}' is invalid")]
    #[diagnostic(code(slnmake::assemble::invalid_project))]
    InvalidProject {
        name: String,
        #[source]
        #[diagnostic_source]
        source: ParseError,
    },

    /// Project dependencies form a cycle.
    #[error("dependency cycle between projects: {}", projects.join(" -> "))]
    #[diagnostic(code(slnmake::assemble::cycle))]
    DependencyCycle { projects: Vec<String> },
}

/// Application-level error for slnmake operations.
#[derive(Debug, Error, Diagnostic)]
pub enum SlnmakeError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid `slnmake.toml`.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check slnmake.toml for syntax errors"))]
    Config { message: String },

    /// No solution file could be selected.
    #[error("{message}")]
    #[diagnostic(
        code(slnmake::solution_not_found),
        help("Pass the path of a .sln file, or run from the directory that contains one")
    )]
    SolutionNotFound { message: String },

    /// The solution manifest failed to parse.
    #[error("failed to parse solution {path}")]
    InvalidSolution {
        path: String,
        #[source]
        #[diagnostic_source]
        source: ParseError,
    },

    /// Generation finished with warnings while running in strict mode.
    #[error("Generation failed: {message}")]
    Generation { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
