//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, RepoArgs};
use crate::config::{load_config, OperaConfig};
use crate::decode::Decoder;
use crate::error::{Error, Result};
use crate::github::{GithubRoute, IssuesFilter, Repository, SearchFilter, Tabular};
use crate::github::{Branch, Commit, Issue, PullRequest, Release, User};
use crate::http::{HttpClient, HttpExecutor, LoggingObserver, TokenAdapter};
use crate::pagination::{
    request_object, FilterType, PaginationPhase, PaginationRequest, PaginationSettings,
    PaginationViewModel,
};
use crate::route::AdaptedRoute;
use crate::types::OptionStringExt;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Shared per-invocation state
struct Session {
    executor: Arc<dyn HttpExecutor>,
    settings: PaginationSettings,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let session = Session {
            executor: Arc::new(self.build_client(&config)?),
            settings: config.pagination.clone(),
        };

        match &self.cli.command {
            Commands::Search { query, sort, order } => {
                let filter = SearchFilter {
                    sort: *sort,
                    order: *order,
                };
                let query = query.clone();
                self.list::<Repository>(
                    &session,
                    GithubRoute::SearchRepositories,
                    Some(Arc::new(filter)),
                    |vm| vm.set_query(query),
                )
                .await
            }
            Commands::Issues {
                repo,
                state,
                sort,
                direction,
                creator,
                mentioned,
            } => {
                let filter = IssuesFilter {
                    state: *state,
                    sort: *sort,
                    direction: *direction,
                    creator: creator.clone(),
                    mentioned: mentioned.clone(),
                };
                let route = GithubRoute::Issues {
                    owner: repo.owner.clone(),
                    repo: repo.repo.clone(),
                };
                self.list::<Issue>(&session, route, None, |vm| vm.set_filter(filter))
                    .await
            }
            Commands::Pulls(repo) => {
                let (owner, repo) = coordinates(repo);
                self.list_all::<PullRequest>(&session, GithubRoute::PullRequests { owner, repo })
                    .await
            }
            Commands::Forks(repo) => {
                let (owner, repo) = coordinates(repo);
                self.list_all::<Repository>(&session, GithubRoute::Forks { owner, repo })
                    .await
            }
            Commands::Stargazers(repo) => {
                let (owner, repo) = coordinates(repo);
                self.list_all::<User>(&session, GithubRoute::Stargazers { owner, repo })
                    .await
            }
            Commands::Branches(repo) => {
                let (owner, repo) = coordinates(repo);
                self.list_all::<Branch>(&session, GithubRoute::Branches { owner, repo })
                    .await
            }
            Commands::Commits(repo) => {
                let (owner, repo) = coordinates(repo);
                self.list_all::<Commit>(&session, GithubRoute::Commits { owner, repo })
                    .await
            }
            Commands::Releases(repo) => {
                let (owner, repo) = coordinates(repo);
                self.list_all::<Release>(&session, GithubRoute::Releases { owner, repo })
                    .await
            }
            Commands::Contributors(repo) => {
                let (owner, repo) = coordinates(repo);
                self.list_all::<User>(&session, GithubRoute::Contributors { owner, repo })
                    .await
            }
            Commands::Info(repo) => self.info(&session, repo).await,
        }
    }

    /// Load configuration, falling back to defaults without `--config`
    fn load_config(&self) -> Result<OperaConfig> {
        match &self.cli.config {
            Some(path) => load_config(path),
            None => Ok(OperaConfig::default()),
        }
    }

    /// HTTP client with request logging and, when a token is known, auth
    fn build_client(&self, config: &OperaConfig) -> Result<HttpClient> {
        let mut client =
            HttpClient::with_config(config.client_config())?.with_observer(LoggingObserver);

        let token = self
            .cli
            .token
            .clone()
            .none_if_empty()
            .or_else(|| config.resolved_token());
        match token {
            Some(token) => client = client.with_adapter(TokenAdapter::github(token)),
            None => debug!("No access token configured, using anonymous requests"),
        }
        Ok(client)
    }

    /// List a route starting from its first page
    async fn list_all<T>(&self, session: &Session, route: GithubRoute) -> Result<()>
    where
        T: DeserializeOwned + Serialize + Tabular + Clone + Send + Sync + 'static,
    {
        self.list::<T>(session, route, None, |vm| vm.refresh()).await
    }

    /// Page through a route, kicking the view-model off with `start`
    ///
    /// `filter` is applied before the first request; `start` must issue an
    /// input that loads the first page.
    async fn list<T>(
        &self,
        session: &Session,
        route: GithubRoute,
        filter: Option<Arc<dyn FilterType>>,
        start: impl FnOnce(&PaginationViewModel<T>),
    ) -> Result<()>
    where
        T: DeserializeOwned + Serialize + Tabular + Clone + Send + Sync + 'static,
    {
        let mut request = PaginationRequest::new(&route)
            .with_settings(session.settings.clone())
            .with_shared_filter(filter);
        if let Some(key_path) = route.collection_key_path() {
            request = request.with_collection_key_path(key_path);
        }

        let view_model = PaginationViewModel::with_executor(
            request,
            Arc::clone(&session.executor),
            Decoder::serde(),
        );
        let elements = self.browse(&view_model, start).await?;
        self.print(&elements);
        Ok(())
    }

    /// Load up to `--pages` pages and return the accumulated elements
    async fn browse<T>(
        &self,
        view_model: &PaginationViewModel<T>,
        start: impl FnOnce(&PaginationViewModel<T>),
    ) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let wanted = self.cli.pages.max(1);
        let mut errors = view_model.errors();
        let updates = view_model.snapshots();
        futures::pin_mut!(updates);

        start(view_model);

        let mut pages = 0;
        while let Some(snapshot) = updates.next().await {
            if snapshot.loading {
                continue;
            }
            if snapshot.phase == PaginationPhase::Error {
                return Err(next_error(&mut errors).await);
            }

            pages += 1;
            info!(
                pages,
                elements = snapshot.elements.len(),
                has_next_page = snapshot.has_next_page,
                "Page loaded"
            );
            if pages >= wanted || !snapshot.has_next_page {
                return Ok(snapshot.elements);
            }
            view_model.load_next_page();
        }

        Err(Error::unknown("pagination stopped before loading finished"))
    }

    /// Show a single repository
    async fn info(&self, session: &Session, repo: &RepoArgs) -> Result<()> {
        let (owner, repo) = coordinates(repo);
        let route = AdaptedRoute::from_route(&GithubRoute::Repository { owner, repo })
            .with_download_progress(|progress| {
                debug!(
                    completed = progress.completed,
                    total = ?progress.total,
                    "Downloading repository"
                );
            });

        let repository: Repository =
            request_object(session.executor.as_ref(), &route, None).await?;
        self.print(std::slice::from_ref(&repository));
        Ok(())
    }

    /// Output elements in the selected format
    fn print<T: Serialize + Tabular>(&self, elements: &[T]) {
        match self.cli.format {
            OutputFormat::Json => {
                for element in elements {
                    println!("{}", serde_json::to_string(element).unwrap_or_default());
                }
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = elements.iter().map(Tabular::row).collect();
                print!("{}", render_table(T::headers(), &rows));
            }
        }
    }
}

fn coordinates(repo: &RepoArgs) -> (String, String) {
    (repo.owner.clone(), repo.repo.clone())
}

/// Wait for the error that accompanies a failed snapshot
async fn next_error(errors: &mut broadcast::Receiver<Arc<Error>>) -> Error {
    loop {
        match errors.recv().await {
            Ok(error) => {
                return Arc::try_unwrap(error)
                    .unwrap_or_else(|shared| Error::Other(shared.to_string()));
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => {
                return Error::unknown("page request failed without an error report");
            }
        }
    }
}

/// Render rows as left-aligned columns separated by two spaces
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: Vec<&str>| {
        let last = cells.len().saturating_sub(1);
        let mut line = String::new();
        for (i, (cell, width)) in cells.iter().zip(&widths).enumerate() {
            if i == last {
                line.push_str(cell);
            } else {
                line.push_str(cell);
                line.push_str(&" ".repeat(width - cell.chars().count() + 2));
            }
        }
        line.trim_end().to_string()
    };

    let mut out = format_line(headers.to_vec());
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}
