//! Solution graph assembly: loads and parses every project a solution
//! references, checks referential integrity and orders projects by their
//! dependencies.

pub mod assemble;
pub mod graph;

pub use assemble::{assemble, assemble_with, AssembleOptions, AssembledProject, AssembledSolution};
pub use graph::ProjectGraph;
