use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use slnmake_util::errors::SlnmakeError;

/// Name of the per-solution configuration file.
pub const CONFIG_FILE_NAME: &str = "slnmake.toml";

/// Conversion settings loaded from `slnmake.toml` next to the solution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub generate: GenerateConfig,

    #[serde(default)]
    pub projects: ProjectsConfig,
}

/// Output file settings from `[output]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_file_name", rename = "file-name")]
    pub file_name: String,
    #[serde(default = "default_cmake_minimum", rename = "cmake-minimum")]
    pub cmake_minimum: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            cmake_minimum: default_cmake_minimum(),
            languages: default_languages(),
        }
    }
}

fn default_file_name() -> String {
    "CMakeLists.txt".to_string()
}

fn default_cmake_minimum() -> String {
    "3.16".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["CXX".to_string()]
}

/// Which directive groups to emit, from `[generate]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_true", rename = "per-file-options")]
    pub per_file_options: bool,
    #[serde(default = "default_true", rename = "configuration-settings")]
    pub configuration_settings: bool,
    #[serde(default = "default_true", rename = "link-dependencies")]
    pub link_dependencies: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            per_file_options: true,
            configuration_settings: true,
            link_dependencies: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Project selection from `[projects]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectsConfig {
    /// Glob patterns matched against project names.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ProjectsConfig {
    /// Compile the exclude patterns.
    pub fn exclude_set(&self) -> miette::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| SlnmakeError::Config {
                message: format!("invalid exclude pattern '{pattern}': {e}"),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| {
            SlnmakeError::Config {
                message: format!("invalid exclude patterns: {e}"),
            }
            .into()
        })
    }
}

impl ConvertConfig {
    /// Load `slnmake.toml` from `solution_dir`, or return defaults if the file
    /// doesn't exist.
    pub fn load(solution_dir: &Path) -> miette::Result<Self> {
        let path = Self::path_in(solution_dir);
        if path.is_file() {
            let content = std::fs::read_to_string(&path).map_err(|e| SlnmakeError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            })?;
            Self::parse_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            SlnmakeError::Config {
                message: format!("Failed to parse {CONFIG_FILE_NAME}: {e}"),
            }
            .into()
        })
    }

    pub fn path_in(solution_dir: &Path) -> PathBuf {
        solution_dir.join(CONFIG_FILE_NAME)
    }
}
