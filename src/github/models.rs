//! GitHub API models
//!
//! Only the fields the browser displays are decoded; everything else in the
//! payload is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendering of a model as a table row
pub trait Tabular {
    /// Column titles
    fn headers() -> &'static [&'static str];

    /// Cell values, one per header
    fn row(&self) -> Vec<String>;
}

/// Account reference embedded in other payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// A user, stargazer or contributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    /// Present on contributor listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributions: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub owner: Account,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub url: String,
    pub number: u64,
    pub state: String,
    pub title: String,
    pub user: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub url: String,
    pub number: u64,
    pub state: String,
    pub title: String,
    #[serde(default)]
    pub locked: bool,
    pub user: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub url: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub body: Option<String>,
    pub author: Account,
}

// ============================================================================
// Table Rendering
// ============================================================================

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

impl Tabular for User {
    fn headers() -> &'static [&'static str] {
        &["LOGIN", "CONTRIBUTIONS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.login.clone(),
            self.contributions.map(|c| c.to_string()).unwrap_or_default(),
        ]
    }
}

impl Tabular for Repository {
    fn headers() -> &'static [&'static str] {
        &["REPOSITORY", "STARS", "FORKS", "ISSUES", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        let name = if self.full_name.is_empty() {
            format!("{}/{}", self.owner.login, self.name)
        } else {
            self.full_name.clone()
        };
        vec![
            name,
            self.stargazers_count.to_string(),
            self.forks_count.to_string(),
            self.open_issues_count.to_string(),
            self.description.as_deref().map(first_line).unwrap_or_default(),
        ]
    }
}

impl Tabular for Issue {
    fn headers() -> &'static [&'static str] {
        &["NUMBER", "STATE", "AUTHOR", "TITLE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            format!("#{}", self.number),
            self.state.clone(),
            self.user.login.clone(),
            self.title.clone(),
        ]
    }
}

impl Tabular for PullRequest {
    fn headers() -> &'static [&'static str] {
        &["NUMBER", "STATE", "AUTHOR", "TITLE"]
    }

    fn row(&self) -> Vec<String> {
        let state = if self.locked {
            format!("{} (locked)", self.state)
        } else {
            self.state.clone()
        };
        vec![
            format!("#{}", self.number),
            state,
            self.user.login.clone(),
            self.title.clone(),
        ]
    }
}

impl Tabular for Branch {
    fn headers() -> &'static [&'static str] {
        &["BRANCH", "SHA"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.commit.sha.clone()]
    }
}

impl Tabular for Commit {
    fn headers() -> &'static [&'static str] {
        &["SHA", "DATE", "AUTHOR", "MESSAGE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.sha.chars().take(7).collect(),
            self.commit.author.date.format("%Y-%m-%d").to_string(),
            self.commit.author.name.clone(),
            first_line(&self.commit.message),
        ]
    }
}

impl Tabular for Release {
    fn headers() -> &'static [&'static str] {
        &["TAG", "NAME", "AUTHOR"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.tag_name.clone(),
            self.name.clone().unwrap_or_default(),
            self.author.login.clone(),
        ]
    }
}
