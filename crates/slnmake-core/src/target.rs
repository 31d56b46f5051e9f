use serde::Serialize;

/// How a library target is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    Static,
    Shared,
}

impl Linkage {
    /// CMake keyword for `add_library`.
    pub fn cmake_keyword(&self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::Shared => "SHARED",
        }
    }
}

/// The kind of artifact a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Executable,
    Library(Linkage),
    #[default]
    Unknown,
}

impl TargetType {
    /// Map a `<ConfigurationType>` value onto a target type.
    ///
    /// `Utility`, `Makefile` and anything unrecognised map to `Unknown`.
    pub fn from_configuration_type(s: &str) -> Self {
        match s.trim() {
            "Application" => Self::Executable,
            "StaticLibrary" => Self::Library(Linkage::Static),
            "DynamicLibrary" => Self::Library(Linkage::Shared),
            _ => Self::Unknown,
        }
    }

    pub fn is_library(&self) -> bool {
        matches!(self, Self::Library(_))
    }

    /// Returns `true` if the generator can emit a statement for this type.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}
