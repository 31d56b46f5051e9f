//! Full `CMakeLists.txt` rendering.
//!
//! The file sits next to the solution, so every path is written relative to
//! `${CMAKE_CURRENT_SOURCE_DIR}` and per-configuration settings become
//! `$<CONFIG:...>` generator expressions.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use slnmake_core::config::ConvertConfig;
use slnmake_core::project::ProjectRecord;
use slnmake_resolver::{AssembledProject, AssembledSolution};

use crate::statement::{generate, join_dir, quote, quote_token, BuildStatement, GenerationWarning, StatementKind};

const SOURCE_DIR: &str = "${CMAKE_CURRENT_SOURCE_DIR}";
const CONFIG_GENEX: &str = "$<CONFIG>";

static MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\((?P<name>[A-Za-z_][A-Za-z0-9_.]*)\)").expect("valid regex"));

/// What to include in the rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub cmake_minimum: String,
    pub languages: Vec<String>,
    pub per_file_options: bool,
    pub configuration_settings: bool,
    pub link_dependencies: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&ConvertConfig::default())
    }
}

impl From<&ConvertConfig> for RenderOptions {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            cmake_minimum: config.output.cmake_minimum.clone(),
            languages: config.output.languages.clone(),
            per_file_options: config.generate.per_file_options,
            configuration_settings: config.generate.configuration_settings,
            link_dependencies: config.generate.link_dependencies,
        }
    }
}

/// Rendered file text and every warning raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCMake {
    pub text: String,
    pub warnings: Vec<GenerationWarning>,
}

/// Render `assembled` as a complete `CMakeLists.txt`.
pub fn render_cmake(assembled: &AssembledSolution, options: &RenderOptions) -> RenderedCMake {
    let description = generate(assembled);
    let mut renderer = Renderer {
        out: String::new(),
        warnings: description.warnings.clone(),
    };

    let _ = writeln!(
        renderer.out,
        "cmake_minimum_required(VERSION {})",
        options.cmake_minimum
    );
    let mut project_line = format!("project({}", quote_token(&assembled.solution.name));
    if !options.languages.is_empty() {
        let _ = write!(project_line, " LANGUAGES {}", options.languages.join(" "));
    }
    let _ = writeln!(renderer.out, "{project_line})");

    for statement in &description.statements {
        let Some(project) = assembled.project(&statement.identifier) else {
            continue;
        };
        renderer.out.push('\n');
        let _ = writeln!(renderer.out, "{}", statement.directive());
        if options.per_file_options {
            renderer.source_properties(statement, project);
        }
        if options.configuration_settings {
            renderer.configuration_settings(statement, project);
        }
        if options.link_dependencies {
            renderer.links(statement, assembled, &description.statements);
        }
    }

    RenderedCMake {
        text: renderer.out,
        warnings: renderer.warnings,
    }
}

struct Renderer {
    out: String,
    warnings: Vec<GenerationWarning>,
}

impl Renderer {
    fn source_properties(&mut self, statement: &BuildStatement, project: &AssembledProject) {
        for source in &project.record.sources {
            let mut items: Vec<String> = Vec::new();
            if let Some(opts) = &source.additional_options {
                items.extend(self.translate_options(statement, opts));
            }
            for (key, opts) in &source.conditional_options {
                let config = configuration_name(&project.record, key);
                items.extend(
                    self.translate_options(statement, opts)
                        .iter()
                        .map(|o| config_genex(&config, o)),
                );
            }
            if items.is_empty() {
                continue;
            }
            let path = join_dir(&statement.directory, &source.path);
            let _ = writeln!(
                self.out,
                "set_source_files_properties({} PROPERTIES COMPILE_OPTIONS {})",
                quote_token(&path),
                quote(&items.join(";"))
            );
        }
    }

    fn configuration_settings(&mut self, statement: &BuildStatement, project: &AssembledProject) {
        let mut definitions = Vec::new();
        let mut includes = Vec::new();
        let mut options = Vec::new();
        let mut seen = BTreeSet::new();

        for settings in project.record.configurations.values() {
            if settings.compile.is_empty() || !seen.insert(settings.name.as_str()) {
                continue;
            }
            let config = settings.name.as_str();
            for def in &settings.compile.definitions {
                if let Some(def) = self.translate(statement, def) {
                    definitions.push(config_genex(config, &def));
                }
            }
            for dir in &settings.compile.include_dirs {
                if let Some(dir) = self.translate(statement, dir) {
                    includes.push(config_genex(config, &anchor_path(&statement.directory, &dir)));
                }
            }
            if let Some(opts) = &settings.compile.additional_options {
                for opt in self.translate_options(statement, opts) {
                    options.push(config_genex(config, &opt));
                }
            }
        }

        self.target_block("target_compile_definitions", &statement.name, &definitions);
        self.target_block("target_include_directories", &statement.name, &includes);
        self.target_block("target_compile_options", &statement.name, &options);
    }

    fn links(
        &mut self,
        statement: &BuildStatement,
        assembled: &AssembledSolution,
        statements: &[BuildStatement],
    ) {
        let mut libraries = Vec::new();
        let mut ordering = Vec::new();
        for dep in assembled.graph().dependencies_of(&statement.identifier) {
            let Some(target) = statements.iter().find(|s| s.identifier == dep) else {
                continue;
            };
            let name = quote_token(&target.name).into_owned();
            match target.kind {
                StatementKind::Library(_) => libraries.push(name),
                StatementKind::Executable => ordering.push(name),
            }
        }
        let target = quote_token(&statement.name);
        if !libraries.is_empty() {
            let _ = writeln!(
                self.out,
                "target_link_libraries({target} PRIVATE {})",
                libraries.join(" ")
            );
        }
        if !ordering.is_empty() {
            let _ = writeln!(self.out, "add_dependencies({target} {})", ordering.join(" "));
        }
    }

    fn target_block(&mut self, command: &str, target: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        let _ = writeln!(self.out, "{command}({} PRIVATE", quote_token(target));
        for item in items {
            let _ = writeln!(self.out, "    {}", quote(item));
        }
        self.out.push_str(")\n");
    }

    /// Split an options string and translate each option; options with an
    /// unresolved macro are dropped.
    fn translate_options(&mut self, statement: &BuildStatement, opts: &str) -> Vec<String> {
        opts.split_whitespace()
            .filter_map(|opt| self.translate(statement, opt))
            .collect()
    }

    /// Replace build-system macros with CMake equivalents, recording a warning
    /// and returning `None` when one has no equivalent.
    fn translate(&mut self, statement: &BuildStatement, value: &str) -> Option<String> {
        match translate_macros(value, &statement.directory) {
            Ok(translated) => Some(translated),
            Err(name) => {
                tracing::warn!(
                    "project '{}': dropping '{value}', unresolved macro $({name})",
                    statement.name
                );
                self.warnings.push(GenerationWarning::UnresolvedMacro {
                    project: statement.name.clone(),
                    value: value.to_string(),
                    name,
                });
                None
            }
        }
    }
}

/// Translate `$(SolutionDir)`, `$(ProjectDir)` and `$(Configuration)`.
/// Returns the name of the first other macro as the error.
fn translate_macros(value: &str, directory: &str) -> Result<String, String> {
    let mut unresolved: Option<String> = None;
    let translated = MACRO.replace_all(value, |caps: &Captures<'_>| {
        let name = &caps["name"];
        match name.to_ascii_lowercase().as_str() {
            "solutiondir" => format!("{SOURCE_DIR}/"),
            "projectdir" => format!("{}/", join_dir(SOURCE_DIR, directory).trim_end_matches('/')),
            "configuration" => CONFIG_GENEX.to_string(),
            _ => {
                unresolved.get_or_insert_with(|| name.to_string());
                caps[0].to_string()
            }
        }
    });
    match unresolved {
        Some(name) => Err(name),
        None => Ok(collapse_slashes(&translated)),
    }
}

fn collapse_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '/' && out.ends_with('/') && !out.ends_with(":/") {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Anchor a relative include directory at the project directory.
fn anchor_path(directory: &str, path: &str) -> String {
    let path = path.trim_end_matches('/');
    let absolute = path.starts_with('/')
        || path.starts_with("${")
        || path.as_bytes().get(1) == Some(&b':');
    if absolute {
        path.to_string()
    } else {
        format!("{SOURCE_DIR}/{}", join_dir(directory, path))
    }
}

/// Configuration name for a condition key: the name recorded in the
/// project, else the part before `|`.
fn configuration_name(record: &ProjectRecord, key: &str) -> String {
    record
        .configurations
        .get(key)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| key.split('|').next().unwrap_or(key).to_string())
}

/// Wrap `value` in a per-configuration expression. Translated `$<CONFIG>`
/// references are kept intact; every other `>` and `;` is escaped.
fn config_genex(config: &str, value: &str) -> String {
    let value = value
        .split(CONFIG_GENEX)
        .map(|part| part.replace('>', "$<ANGLE-R>").replace(';', "$<SEMICOLON>"))
        .collect::<Vec<_>>()
        .join(CONFIG_GENEX);
    format!("$<$<CONFIG:{config}>:{value}>")
}
