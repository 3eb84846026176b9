//! CLI commands and argument parsing

use crate::github::{Direction, IssueSort, IssueState, RepositorySort};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Browse GitHub repositories page by page
#[derive(Parser, Debug)]
#[command(name = "opera")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Access token (overrides the config file and GITHUB_TOKEN)
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    /// Number of pages to load
    #[arg(short, long, global = true, default_value = "1")]
    pub pages: usize,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repository coordinates shared by most subcommands
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search repositories
    Search {
        /// Search query
        query: String,

        /// Sort field
        #[arg(long, default_value = "best-match")]
        sort: RepositorySort,

        /// Sort order (ignored for best-match)
        #[arg(long, default_value = "desc")]
        order: Direction,
    },

    /// List issues of a repository
    Issues {
        #[command(flatten)]
        repo: RepoArgs,

        /// Issue state
        #[arg(long, default_value = "open")]
        state: IssueState,

        /// Sort field
        #[arg(long, default_value = "created")]
        sort: IssueSort,

        /// Sort direction
        #[arg(long, default_value = "desc")]
        direction: Direction,

        /// Only issues created by this login
        #[arg(long)]
        creator: Option<String>,

        /// Only issues mentioning this login
        #[arg(long)]
        mentioned: Option<String>,
    },

    /// List pull requests of a repository
    Pulls(RepoArgs),

    /// List forks of a repository
    Forks(RepoArgs),

    /// List stargazers of a repository
    Stargazers(RepoArgs),

    /// List branches of a repository
    Branches(RepoArgs),

    /// List commits of a repository
    Commits(RepoArgs),

    /// List releases of a repository
    Releases(RepoArgs),

    /// List contributors of a repository
    Contributors(RepoArgs),

    /// Show a single repository
    Info(RepoArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one element per line)
    Json,
    /// Aligned table
    Table,
}
