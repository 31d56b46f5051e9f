//! Core data types and parsers for slnmake.
//!
//! This crate turns solution manifests (`.sln`) and native project manifests
//! (`.vcxproj`) into typed records, and defines the loader capability and
//! conversion configuration shared by the other crates.
//!
//! This crate never reads project manifests from storage itself.

pub mod config;
pub mod loader;
pub mod project;
pub mod scan;
pub mod solution;
pub mod target;
