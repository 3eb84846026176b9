//! Filters for GitHub listings

use crate::pagination::FilterType;
use crate::types::{JsonValue, Parameters};
use std::fmt;

macro_rules! param_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

param_enum!(IssueState { Open => "open", Closed => "closed", All => "all" });
param_enum!(IssueSort { Created => "created", Updated => "updated", Comments => "comments" });
param_enum!(Direction { Desc => "desc", Asc => "asc" });
param_enum!(RepositorySort {
    BestMatch => "best-match",
    Stars => "stars",
    Forks => "forks",
    Updated => "updated"
});

// ============================================================================
// Issues
// ============================================================================

/// Filter for `repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuesFilter {
    pub state: IssueState,
    pub sort: IssueSort,
    pub direction: Direction,
    /// Only issues created by this login
    pub creator: Option<String>,
    /// Only issues mentioning this login
    pub mentioned: Option<String>,
}

impl FilterType for IssuesFilter {
    fn parameters(&self) -> Parameters {
        let mut params = Parameters::new();
        params.insert("state".into(), JsonValue::from(self.state.as_str()));
        params.insert("sort".into(), JsonValue::from(self.sort.as_str()));
        params.insert("direction".into(), JsonValue::from(self.direction.as_str()));

        if let Some(creator) = self.creator.as_deref().filter(|c| !c.is_empty()) {
            params.insert("creator".into(), JsonValue::from(creator));
        }
        if let Some(mentioned) = self.mentioned.as_deref().filter(|m| !m.is_empty()) {
            params.insert("mentioned".into(), JsonValue::from(mentioned));
        }
        params
    }
}

// ============================================================================
// Repository Search
// ============================================================================

/// Sort order for `search/repositories`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub sort: RepositorySort,
    pub order: Direction,
}

impl FilterType for SearchFilter {
    fn parameters(&self) -> Parameters {
        let mut params = Parameters::new();
        // best-match is the API default and has no sort value
        if self.sort != RepositorySort::BestMatch {
            params.insert("sort".into(), JsonValue::from(self.sort.as_str()));
            params.insert("order".into(), JsonValue::from(self.order.as_str()));
        }
        params
    }
}
