//! Turns an assembled solution into build directives.

pub mod cmake;
pub mod statement;

pub use cmake::{render_cmake, RenderOptions, RenderedCMake};
pub use statement::{generate, BuildDescription, BuildStatement, GenerationWarning, StatementKind};
