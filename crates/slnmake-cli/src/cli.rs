//! CLI argument definitions for slnmake.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "slnmake",
    version,
    about = "Convert Visual Studio solutions to CMake",
    long_about = "slnmake reads a .sln solution and the .vcxproj projects it references \
                  and writes an equivalent CMakeLists.txt."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a CMakeLists.txt for a solution
    Convert {
        /// Solution file or directory containing one (default: current directory)
        solution: Option<PathBuf>,
        /// Output file (default: CMakeLists.txt next to the solution)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,
        /// Print the result instead of writing a file
        #[arg(long)]
        stdout: bool,
        /// Treat generation warnings as errors
        #[arg(long)]
        strict: bool,
        /// Skip projects whose names match this glob (repeatable)
        #[arg(long, value_name = "GLOB")]
        exclude: Vec<String>,
    },

    /// Show the projects, dependencies and build order of a solution
    Inspect {
        /// Solution file or directory containing one (default: current directory)
        solution: Option<PathBuf>,
        /// Print a JSON document
        #[arg(long)]
        json: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
