//! Line classification for solution and project manifests.
//!
//! Both manifest formats are scanned line by line. Each line is matched once
//! against a small set of marker patterns and the fields are pulled out of
//! named capture groups, so extraction never depends on offsets computed by
//! hand.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Microsoft Visual Studio Solution File, Format Version (?P<version>\S+)")
        .expect("valid regex")
});

static VERSION_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Minimum)?VisualStudioVersion\s*=").expect("valid regex")
});

static PROJECT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^Project\(\s*"(?P<type_id>[^"]*)"\s*\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"(?P<id>[^"]*)""#,
    )
    .expect("valid regex")
});

static PROJECT_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ProjectSection\(\s*(?P<kind>[^)]*?)\s*\)").expect("valid regex")
});

static GLOBAL_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GlobalSection\(\s*(?P<kind>[^)]*?)\s*\)").expect("valid regex")
});

static CONFIG_PLATFORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<id>[^.=\s]+)\.(?P<key>[^=]*?)\s*=\s*(?P<value>.*?)\s*$")
        .expect("valid regex")
});

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[^=]+?)\s*=\s*(?P<value>.*?)\s*$").expect("valid regex")
});

static DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<key>[^=\[\]]+?)\s*=\s*(?P<value>[^=\[\]]*?)\s*(?:\[(?P<tag>[^\[\]]*)\])?\s*$",
    )
    .expect("valid regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(?P<close>/)?(?P<name>[A-Za-z_][\w.\-]*)").expect("valid regex")
});

static CONDITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Condition\s*=\s*"(?P<cond>[^"]*)""#).expect("valid regex"));

static CONDITION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Condition\s*=\s*""#).expect("valid regex"));

static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*'(?P<lhs>[^']*)'\s*==\s*'(?P<rhs>[^']*)'\s*$").expect("valid regex")
});

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Include\s*=\s*"(?P<path>[^"]*)""#).expect("valid regex"));

static INCLUDE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Include\s*=\s*""#).expect("valid regex"));

/// Text strictly between the first and the last double quote of `line`.
///
/// Returns `None` when the line has fewer than two quotes. Quotes in between
/// are part of the result.
pub fn outer_quoted(line: &str) -> Option<&str> {
    let (_, after_first) = line.split_once('"')?;
    let (inner, _) = after_first.rsplit_once('"')?;
    Some(inner)
}

/// A project declaration line of a solution manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDecl<'a> {
    pub type_id: &'a str,
    pub name: &'a str,
    pub path: &'a str,
    pub identifier: &'a str,
}

/// Classification of one solution manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionLine<'a> {
    Blank,
    /// `Microsoft Visual Studio Solution File, Format Version <v>`
    Banner { version: &'a str },
    /// `# Visual Studio ...` or `VisualStudioVersion = ...`
    Preamble,
    Project(ProjectDecl<'a>),
    /// Starts like a project declaration but lacks one of its quoted fields.
    MalformedProject,
    EndProject,
    ProjectSection { kind: &'a str },
    EndProjectSection,
    Global,
    GlobalSection { kind: &'a str },
    EndGlobalSection,
    EndGlobal,
    Other(&'a str),
}

/// Classify a single solution manifest line.
pub fn classify_solution_line(line: &str) -> SolutionLine<'_> {
    let trimmed = line.trim().trim_start_matches('\u{feff}');
    if trimmed.is_empty() {
        return SolutionLine::Blank;
    }
    match trimmed {
        "EndProject" => return SolutionLine::EndProject,
        "EndProjectSection" => return SolutionLine::EndProjectSection,
        "Global" => return SolutionLine::Global,
        "EndGlobalSection" => return SolutionLine::EndGlobalSection,
        "EndGlobal" => return SolutionLine::EndGlobal,
        _ => {}
    }
    if let Some(caps) = BANNER.captures(trimmed) {
        let version = caps.name("version").map_or("", |m| m.as_str());
        return SolutionLine::Banner { version };
    }
    if trimmed.starts_with('#') || VERSION_PROPERTY.is_match(trimmed) {
        return SolutionLine::Preamble;
    }
    if let Some(caps) = PROJECT_SECTION.captures(trimmed) {
        let kind = caps.name("kind").map_or("", |m| m.as_str());
        return SolutionLine::ProjectSection { kind };
    }
    if let Some(caps) = GLOBAL_SECTION.captures(trimmed) {
        let kind = caps.name("kind").map_or("", |m| m.as_str());
        return SolutionLine::GlobalSection { kind };
    }
    if let Some(caps) = PROJECT_DECL.captures(trimmed) {
        let field = |name| caps.name(name).map_or("", |m| m.as_str());
        return SolutionLine::Project(ProjectDecl {
            type_id: field("type_id"),
            name: field("name"),
            path: field("path"),
            identifier: field("id"),
        });
    }
    if trimmed.starts_with("Project(") || trimmed.starts_with("Project ") {
        return SolutionLine::MalformedProject;
    }
    SolutionLine::Other(trimmed)
}

/// One line of `GlobalSection(ProjectConfigurationPlatforms)`:
/// `<identifier>.<configuration key> = <value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPlatformLine<'a> {
    pub identifier: &'a str,
    pub key: &'a str,
    pub value: &'a str,
}

/// Split a configuration-platform line on its first `.` and its `=`.
/// An empty key or value is rejected.
pub fn config_platform_line(line: &str) -> Option<ConfigPlatformLine<'_>> {
    let caps = CONFIG_PLATFORM.captures(line.trim())?;
    let identifier = caps.name("id")?.as_str();
    let key = caps.name("key")?.as_str();
    let value = unquote(caps.name("value")?.as_str());
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some(ConfigPlatformLine {
        identifier,
        key,
        value,
    })
}

/// A `<key> = <value>` line. Used for solution configuration lists.
pub fn assignment(line: &str) -> Option<(&str, &str)> {
    let caps = ASSIGNMENT.captures(line.trim())?;
    Some((caps.name("key")?.as_str(), unquote(caps.name("value")?.as_str())))
}

/// One line of `ProjectSection(ProjectDependencies)`: `<key> = <value> [<tag>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLine<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub tag: Option<&'a str>,
}

/// Parse a dependency line. Unbalanced brackets and an empty value are
/// rejected.
pub fn dependency_line(line: &str) -> Option<DependencyLine<'_>> {
    let caps = DEPENDENCY.captures(line.trim())?;
    let value = caps.name("value")?.as_str();
    if value.is_empty() {
        return None;
    }
    Some(DependencyLine {
        key: caps.name("key")?.as_str(),
        value,
        tag: caps.name("tag").map(|m| m.as_str().trim()),
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// A `Condition="..."` attribute found on a project manifest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition<'a> {
    Complete(&'a str),
    /// The attribute opens a quote that never closes on the line.
    Unterminated,
}

/// Element groups that can carry configuration data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    ItemDefinitionGroup,
    PropertyGroup,
}

impl GroupKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::ItemDefinitionGroup => "ItemDefinitionGroup",
            Self::PropertyGroup => "PropertyGroup",
        }
    }
}

/// One marker found on a project manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectTag<'a> {
    /// `<ItemDefinitionGroup ...>` or `<PropertyGroup ...>`.
    GroupOpen {
        group: GroupKind,
        condition: Option<Condition<'a>>,
        closed: bool,
    },
    GroupClose(GroupKind),
    /// `<ClCompile Include="...">`; `include` is `None` when its quote is
    /// never closed.
    SourceOpen {
        include: Option<Cow<'a, str>>,
        closed: bool,
    },
    /// A bare `<ClCompile>` settings block.
    SettingsOpen,
    SourceClose,
    ReferenceOpen { closed: bool },
    ReferenceClose,
    /// `<Name attrs>value</Name>`; `value` is `None` if the close tag does
    /// not directly follow the text on the same line.
    Property {
        name: &'a str,
        condition: Option<Condition<'a>>,
        value: Option<Cow<'a, str>>,
    },
}

/// Classify every tag on a project manifest line, in document order.
///
/// Comments, processing instructions and tags with no meaning for the
/// parser produce nothing.
pub fn classify_project_line(line: &str) -> Vec<ProjectTag<'_>> {
    let mut tags = Vec::new();
    let mut rest = line.trim();
    while let Some(start) = rest.find('<') {
        rest = rest.get(start..).unwrap_or("");
        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.split_once("-->").map_or("", |(_, after)| after);
            continue;
        }
        let Some(caps) = TAG.captures(rest) else {
            rest = rest.get(1..).unwrap_or("");
            continue;
        };
        let Some(name) = caps.name("name") else {
            break;
        };
        let after_name = rest.get(name.end()..).unwrap_or("");
        let name = name.as_str();

        if caps.name("close").is_some() {
            tags.extend(match name {
                "ItemDefinitionGroup" => {
                    Some(ProjectTag::GroupClose(GroupKind::ItemDefinitionGroup))
                }
                "PropertyGroup" => Some(ProjectTag::GroupClose(GroupKind::PropertyGroup)),
                "ClCompile" => Some(ProjectTag::SourceClose),
                "ProjectReference" => Some(ProjectTag::ReferenceClose),
                _ => None,
            });
            rest = after_name.split_once('>').map_or("", |(_, after)| after);
            continue;
        }

        let open = split_open_tag(after_name);
        rest = open.rest;
        match name {
            "ItemDefinitionGroup" | "PropertyGroup" => {
                let group = if name == "PropertyGroup" {
                    GroupKind::PropertyGroup
                } else {
                    GroupKind::ItemDefinitionGroup
                };
                tags.push(ProjectTag::GroupOpen {
                    group,
                    condition: condition(open.attrs),
                    closed: open.self_closing,
                });
            }
            "ClCompile" => {
                if INCLUDE_START.is_match(open.attrs) {
                    let include = INCLUDE
                        .captures(open.attrs)
                        .and_then(|c| c.name("path"))
                        .map(|m| decode(m.as_str()));
                    tags.push(ProjectTag::SourceOpen {
                        include,
                        closed: open.self_closing,
                    });
                } else if !open.self_closing {
                    tags.push(ProjectTag::SettingsOpen);
                }
            }
            "ProjectReference" => tags.push(ProjectTag::ReferenceOpen {
                closed: open.self_closing,
            }),
            _ if open.self_closing => {}
            _ => {
                let (text, tail) = match rest.find('<') {
                    Some(i) => (rest.get(..i).unwrap_or(""), rest.get(i..).unwrap_or("")),
                    None => (rest, ""),
                };
                let close = format!("</{name}>");
                let value = match tail.strip_prefix(close.as_str()) {
                    Some(after) => {
                        rest = after;
                        Some(decode(text))
                    }
                    None => {
                        rest = tail;
                        None
                    }
                };
                tags.push(ProjectTag::Property {
                    name,
                    condition: condition(open.attrs),
                    value,
                });
            }
        }
    }
    tags
}

/// Key used to index a configuration condition.
///
/// `'$(Configuration)|$(Platform)'=='Debug|Win32'` keys as `Debug|Win32`;
/// any other shape keys as the trimmed condition text.
pub fn condition_key(condition: &str) -> String {
    COMPARISON
        .captures(condition)
        .and_then(|c| c.name("rhs"))
        .map_or_else(|| condition.trim().to_string(), |m| m.as_str().to_string())
}

struct OpenTag<'a> {
    attrs: &'a str,
    /// Text after the tag's closing `>`; empty if the tag runs off the line.
    rest: &'a str,
    self_closing: bool,
}

/// Split the remainder of an open tag into its attributes and the text
/// after it. A `>` inside a quoted attribute value does not end the tag.
fn split_open_tag(after_name: &str) -> OpenTag<'_> {
    let mut in_quote = false;
    for (i, ch) in after_name.char_indices() {
        match ch {
            '"' => in_quote = !in_quote,
            '>' if !in_quote => {
                let attrs = after_name.get(..i).unwrap_or(after_name);
                let rest = after_name.get(i + 1..).unwrap_or("");
                return match attrs.strip_suffix('/') {
                    Some(attrs) => OpenTag {
                        attrs,
                        rest,
                        self_closing: true,
                    },
                    None => OpenTag {
                        attrs,
                        rest,
                        self_closing: false,
                    },
                };
            }
            _ => {}
        }
    }
    OpenTag {
        attrs: after_name,
        rest: "",
        self_closing: false,
    }
}

fn condition(attrs: &str) -> Option<Condition<'_>> {
    if !CONDITION_START.is_match(attrs) {
        return None;
    }
    Some(
        CONDITION
            .captures(attrs)
            .and_then(|c| c.name("cond"))
            .map_or(Condition::Unterminated, |m| Condition::Complete(m.as_str())),
    )
}

/// Decode XML character references in an extracted value.
fn decode(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw))
}
