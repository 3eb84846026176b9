//! CLI module
//!
//! Command-line GitHub browser built on the pagination view-model.
//!
//! # Commands
//!
//! - `search` - Search repositories
//! - `issues` / `pulls` - Issues and pull requests of a repository
//! - `forks` / `stargazers` / `contributors` - Related repositories and users
//! - `branches` / `commits` / `releases` - Repository history
//! - `info` - A single repository

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, RepoArgs};
pub use runner::Runner;
