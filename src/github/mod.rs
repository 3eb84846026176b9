//! GitHub example
//!
//! Routes, models and filters for browsing GitHub repositories with the
//! pagination view-model. GitHub paginates with `Link` headers and a `page`
//! query parameter starting at 1, which are the default pagination settings.

mod filters;
mod models;
mod routes;

pub use filters::{Direction, IssueSort, IssueState, IssuesFilter, RepositorySort, SearchFilter};
pub use models::{
    Account, Branch, Commit, CommitAuthor, CommitDetails, CommitRef, Issue, PullRequest, Release,
    Repository, Tabular, User,
};
pub use routes::GithubRoute;
