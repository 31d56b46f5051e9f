//! Native project manifest (`.vcxproj`) parsing.

use std::collections::BTreeMap;

use serde::Serialize;
use slnmake_util::errors::ParseError;
use slnmake_util::fs::normalize_separators;

use crate::scan::{self, Condition, GroupKind, ProjectTag};
use crate::solution::normalize_id;
use crate::target::TargetType;

/// Compiler settings from a conditioned `<ClCompile>` settings block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileSettings {
    pub definitions: Vec<String>,
    pub include_dirs: Vec<String>,
    pub additional_options: Option<String>,
}

impl CompileSettings {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
            && self.include_dirs.is_empty()
            && self.additional_options.is_none()
    }
}

/// Everything known about one configuration condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationSettings {
    /// Configuration name, e.g. `Debug`.
    pub name: String,
    pub target_type: Option<TargetType>,
    pub compile: CompileSettings,
}

impl ConfigurationSettings {
    /// Settings for a condition key; the name defaults to the part of the key
    /// before `|`.
    fn for_key(key: &str) -> Self {
        let name = key.split('|').next().unwrap_or(key).to_string();
        Self {
            name,
            target_type: None,
            compile: CompileSettings::default(),
        }
    }
}

/// A compiled source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    /// Path relative to the project manifest, `/`-separated.
    pub path: String,
    pub additional_options: Option<String>,
    /// Condition key → options, for `<AdditionalOptions Condition=...>`.
    pub conditional_options: BTreeMap<String, String>,
}

/// The parsed representation of a project manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    /// Condition key (`Debug|Win32`) → settings.
    pub configurations: BTreeMap<String, ConfigurationSettings>,
    pub sources: Vec<SourceEntry>,
    pub target_type: TargetType,
    /// Identifiers from `<ProjectReference>` items.
    pub references: Vec<String>,
}

impl ProjectRecord {
    pub fn source(&self, path: &str) -> Option<&SourceEntry> {
        let path = normalize_separators(path);
        self.sources.iter().find(|s| s.path == path)
    }

    /// Distinct configuration names in condition-key order.
    pub fn configuration_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for settings in self.configurations.values() {
            if !names.contains(&settings.name.as_str()) {
                names.push(&settings.name);
            }
        }
        names
    }

    /// Insert a source entry; a path seen before is overwritten in place.
    fn upsert_source(&mut self, entry: SourceEntry) {
        match self.sources.iter_mut().find(|s| s.path == entry.path) {
            Some(existing) => {
                tracing::debug!("source '{}' listed twice, last entry wins", entry.path);
                *existing = entry;
            }
            None => self.sources.push(entry),
        }
    }
}

struct OpenGroup {
    kind: GroupKind,
    key: Option<String>,
    opened: usize,
    in_settings: bool,
}

struct OpenSource {
    entry: SourceEntry,
    opened: usize,
}

#[derive(Default)]
struct ProjectParser {
    record: ProjectRecord,
    declared_type: Option<TargetType>,
    group: Option<OpenGroup>,
    source: Option<OpenSource>,
    in_reference: bool,
}

/// Parse project manifest text into a [`ProjectRecord`].
pub fn parse_project(text: &str) -> Result<ProjectRecord, ParseError> {
    let mut parser = ProjectParser::default();
    for (i, line) in text.lines().enumerate() {
        parser.line(i + 1, line)?;
    }
    parser.finish()
}

impl ProjectParser {
    fn line(&mut self, n: usize, line: &str) -> Result<(), ParseError> {
        for tag in scan::classify_project_line(line) {
            self.tag(n, tag)?;
        }
        Ok(())
    }

    fn tag(&mut self, n: usize, tag: ProjectTag<'_>) -> Result<(), ParseError> {
        match tag {
            ProjectTag::GroupOpen {
                group,
                condition,
                closed,
            } => self.open_group(n, group, condition, closed),
            ProjectTag::GroupClose(kind) => {
                if self.group.as_ref().is_some_and(|g| g.kind == kind) {
                    self.group = None;
                }
                Ok(())
            }
            ProjectTag::SourceOpen { include, closed } => {
                self.open_source(n, include.as_deref(), closed)
            }
            ProjectTag::SettingsOpen => {
                if let Some(group) = self.group.as_mut() {
                    group.in_settings = true;
                }
                Ok(())
            }
            ProjectTag::SourceClose => {
                if let Some(open) = self.source.take() {
                    self.record.upsert_source(open.entry);
                } else if let Some(group) = self.group.as_mut() {
                    group.in_settings = false;
                }
                Ok(())
            }
            ProjectTag::ReferenceOpen { closed } => {
                self.in_reference = !closed;
                Ok(())
            }
            ProjectTag::ReferenceClose => {
                self.in_reference = false;
                Ok(())
            }
            ProjectTag::Property {
                name,
                condition,
                value,
            } => self.property(n, name, condition, value.as_deref()),
        }
    }

    fn open_group(
        &mut self,
        n: usize,
        kind: GroupKind,
        condition: Option<Condition<'_>>,
        closed: bool,
    ) -> Result<(), ParseError> {
        let key = match condition {
            Some(Condition::Complete(c)) => Some(scan::condition_key(c)),
            Some(Condition::Unterminated) => return Err(unterminated_condition(n)),
            None => None,
        };
        if let Some(key) = &key {
            self.record
                .configurations
                .entry(key.clone())
                .or_insert_with(|| ConfigurationSettings::for_key(key));
        }
        self.group = (!closed).then_some(OpenGroup {
            kind,
            key,
            opened: n,
            in_settings: false,
        });
        Ok(())
    }

    fn open_source(
        &mut self,
        n: usize,
        include: Option<&str>,
        closed: bool,
    ) -> Result<(), ParseError> {
        if let Some(previous) = &self.source {
            return Err(ParseError::UnterminatedSection {
                line: previous.opened,
                section: "ClCompile".to_string(),
            });
        }
        let path = include
            .map(normalize_separators)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ParseError::MalformedSourceEntry {
                line: n,
                expected: r#"Include="<path>" with a non-empty, closed value"#.to_string(),
            })?;
        let entry = SourceEntry {
            path,
            ..SourceEntry::default()
        };
        if closed {
            self.record.upsert_source(entry);
        } else {
            self.source = Some(OpenSource { entry, opened: n });
        }
        Ok(())
    }

    fn property(
        &mut self,
        n: usize,
        name: &str,
        condition: Option<Condition<'_>>,
        value: Option<&str>,
    ) -> Result<(), ParseError> {
        let condition = match condition {
            Some(Condition::Complete(c)) => Some(scan::condition_key(c)),
            Some(Condition::Unterminated) => return Err(unterminated_condition(n)),
            None => None,
        };

        if let Some(open) = self.source.as_mut() {
            if name == "AdditionalOptions" {
                if let Some(opts) = value.and_then(clean_options) {
                    match condition {
                        Some(key) => {
                            open.entry.conditional_options.insert(key, opts);
                        }
                        None => open.entry.additional_options = Some(opts),
                    }
                }
            }
            return Ok(());
        }

        match name {
            "Configuration" => {
                let Some(group) = self.group.take() else {
                    return Ok(());
                };
                let result = match value {
                    Some(v) => self.set_configuration_name(n, &group, v),
                    None => Err(unclosed_tag(n, "Configuration")),
                };
                self.group = Some(group);
                result
            }
            "ConfigurationType" => {
                let value = value.ok_or_else(|| unclosed_tag(n, "ConfigurationType"))?;
                self.set_target_type(n, TargetType::from_configuration_type(value));
                Ok(())
            }
            "Project" if self.in_reference => {
                if let Some(id) = value.map(normalize_id).filter(|id| !id.is_empty()) {
                    if !self.record.references.contains(&id) {
                        self.record.references.push(id);
                    }
                }
                Ok(())
            }
            "PreprocessorDefinitions" | "AdditionalIncludeDirectories" | "AdditionalOptions" => {
                if let (Some(settings), Some(value)) = (self.settings_mut(), value) {
                    match name {
                        "PreprocessorDefinitions" => {
                            settings.definitions = split_list(value);
                        }
                        "AdditionalIncludeDirectories" => {
                            settings.include_dirs = split_list(value)
                                .iter()
                                .map(|d| normalize_separators(d))
                                .collect();
                        }
                        _ => settings.additional_options = clean_options(value),
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn set_configuration_name(
        &mut self,
        n: usize,
        group: &OpenGroup,
        name: &str,
    ) -> Result<(), ParseError> {
        match &group.key {
            Some(key) => {
                if let Some(settings) = self.record.configurations.get_mut(key) {
                    settings.name = name.trim().to_string();
                }
                Ok(())
            }
            None if group.kind == GroupKind::ItemDefinitionGroup => {
                Err(ParseError::MalformedConfigLine {
                    line: n,
                    expected: r#"a Condition="'...'" on the group carrying <Configuration>"#
                        .to_string(),
                })
            }
            None => Ok(()),
        }
    }

    fn set_target_type(&mut self, n: usize, target_type: TargetType) {
        if let Some(key) = self.group.as_ref().and_then(|g| g.key.clone()) {
            if let Some(settings) = self.record.configurations.get_mut(&key) {
                settings.target_type = Some(target_type);
            }
        }
        match self.declared_type {
            None => self.declared_type = Some(target_type),
            Some(first) if first != target_type => {
                tracing::warn!(
                    "line {n}: ConfigurationType {target_type:?} conflicts with earlier {first:?}, keeping {first:?}"
                );
            }
            Some(_) => {}
        }
    }

    fn settings_mut(&mut self) -> Option<&mut CompileSettings> {
        let group = self.group.as_ref().filter(|g| g.in_settings)?;
        let key = group.key.as_ref()?;
        self.record
            .configurations
            .get_mut(key)
            .map(|settings| &mut settings.compile)
    }

    fn finish(mut self) -> Result<ProjectRecord, ParseError> {
        if let Some(open) = self.source {
            return Err(ParseError::UnterminatedSection {
                line: open.opened,
                section: "ClCompile".to_string(),
            });
        }
        if let Some(group) = self.group {
            return Err(ParseError::UnterminatedSection {
                line: group.opened,
                section: group.kind.tag().to_string(),
            });
        }
        self.record.target_type = self.declared_type.unwrap_or_default();
        tracing::debug!(
            "parsed project: {} sources, {} configurations, type {:?}",
            self.record.sources.len(),
            self.record.configurations.len(),
            self.record.target_type
        );
        Ok(self.record)
    }
}

fn unterminated_condition(n: usize) -> ParseError {
    ParseError::MalformedConfigLine {
        line: n,
        expected: r#"a Condition="'...'" attribute closed on the same line"#.to_string(),
    }
}

fn unclosed_tag(n: usize, tag: &str) -> ParseError {
    ParseError::MalformedConfigLine {
        line: n,
        expected: format!("<{tag}>...</{tag}> on one line"),
    }
}

/// Split an MSBuild `;` list, dropping `%(...)` inheritance tokens.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty() && !item.starts_with("%("))
        .map(str::to_string)
        .collect()
}

/// Normalise an options string; `None` if nothing but whitespace remains.
fn clean_options(value: &str) -> Option<String> {
    let cleaned = value
        .replace("%(AdditionalOptions)", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}
