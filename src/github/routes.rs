//! GitHub REST API routes

use crate::route::RouteType;
use crate::types::Method;

/// Repository endpoints used by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubRoute {
    /// `GET search/repositories`
    SearchRepositories,
    /// `GET repos/{owner}/{repo}`
    Repository { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/forks`
    Forks { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/stargazers`
    Stargazers { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/issues`
    Issues { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/pulls`
    PullRequests { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/branches`
    Branches { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/releases`
    Releases { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/commits`
    Commits { owner: String, repo: String },
    /// `GET repos/{owner}/{repo}/contributors`
    Contributors { owner: String, repo: String },
    /// `GET users/{username}`
    User { username: String },
}

impl GithubRoute {
    /// Key path of the element array in paginated responses
    pub fn collection_key_path(&self) -> Option<&'static str> {
        match self {
            GithubRoute::SearchRepositories => Some("items"),
            _ => None,
        }
    }
}

impl RouteType for GithubRoute {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        match self {
            GithubRoute::SearchRepositories => "search/repositories".to_string(),
            GithubRoute::Repository { owner, repo } => format!("repos/{owner}/{repo}"),
            GithubRoute::Forks { owner, repo } => format!("repos/{owner}/{repo}/forks"),
            GithubRoute::Stargazers { owner, repo } => format!("repos/{owner}/{repo}/stargazers"),
            GithubRoute::Issues { owner, repo } => format!("repos/{owner}/{repo}/issues"),
            GithubRoute::PullRequests { owner, repo } => format!("repos/{owner}/{repo}/pulls"),
            GithubRoute::Branches { owner, repo } => format!("repos/{owner}/{repo}/branches"),
            GithubRoute::Releases { owner, repo } => format!("repos/{owner}/{repo}/releases"),
            GithubRoute::Commits { owner, repo } => format!("repos/{owner}/{repo}/commits"),
            GithubRoute::Contributors { owner, repo } => {
                format!("repos/{owner}/{repo}/contributors")
            }
            GithubRoute::User { username } => format!("users/{username}"),
        }
    }

    fn retry_count(&self) -> u32 {
        match self {
            GithubRoute::Repository { .. } => 2,
            _ => 0,
        }
    }
}
