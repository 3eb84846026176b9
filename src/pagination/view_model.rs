//! Pagination view-model
//!
//! An actor task owns a [`PaginationCoordinator`] and serializes everything
//! that touches it: consumer inputs arrive over an mpsc channel, fetch tasks
//! report back over another. State is published on a `watch` channel and
//! errors on a `broadcast` channel.
//!
//! ```text
//! refresh / load_next_page / set_query / set_filter
//!        │
//!        ▼
//!   ┌─────────┐  FetchCommand   ┌──────────────┐
//!   │  actor  │ ──────────────▶ │  fetch task  │──▶ PageFetcher
//!   │ (coord) │ ◀────────────── │ (cancelable) │
//!   └─────────┘  (gen, result)  └──────────────┘
//!        │
//!        ├──▶ watch<PaginationSnapshot>
//!        └──▶ broadcast<Arc<Error>>
//! ```

use super::coordinator::{CompletionOutcome, FetchCommand, PaginationCoordinator};
use super::fetcher::{CollectionFetcher, PageFetcher};
use super::request::PaginationRequest;
use super::response::PaginationResponse;
use super::types::{FilterType, PaginationSnapshot};
use crate::decode::Decoder;
use crate::error::{Error, Result};
use crate::http::HttpExecutor;
use futures::Stream;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Capacity of the error channel; slow receivers observe `Lagged`
const ERROR_CHANNEL_CAPACITY: usize = 16;

enum Command {
    Refresh,
    LoadNextPage,
    SetQuery(String),
    SetFilter(Arc<dyn FilterType>),
}

type Completion<T> = (u64, Result<PaginationResponse<T>>);

/// Reactive pagination over a [`PageFetcher`]
///
/// Inputs are fire-and-forget; observe their effect through [`subscribe`]
/// and [`errors`]. Must be created inside a tokio runtime. Dropping the
/// view-model stops the actor and cancels the in-flight request.
///
/// [`subscribe`]: PaginationViewModel::subscribe
/// [`errors`]: PaginationViewModel::errors
pub struct PaginationViewModel<T> {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<PaginationSnapshot<T>>,
    errors: broadcast::Sender<Arc<Error>>,
    shutdown: CancellationToken,
}

impl<T> PaginationViewModel<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawn the actor for `request`
    pub fn new(request: PaginationRequest, fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        let coordinator = PaginationCoordinator::new(request);
        let (state_tx, state_rx) = watch::channel(coordinator.snapshot());
        let (errors_tx, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let actor = Actor {
            coordinator,
            fetcher,
            state: state_tx,
            errors: errors_tx.clone(),
            completions: completions_tx,
            shutdown: shutdown.clone(),
            in_flight: None,
        };
        tokio::spawn(actor.run(commands_rx, completions_rx));

        Self {
            commands: commands_tx,
            state: state_rx,
            errors: errors_tx,
            shutdown,
        }
    }

    /// View-model fetching pages through an HTTP executor
    pub fn with_executor(
        request: PaginationRequest,
        executor: Arc<dyn HttpExecutor>,
        decoder: Decoder<T>,
    ) -> Self {
        Self::new(request, Arc::new(CollectionFetcher::new(executor, decoder)))
    }
}

impl<T> PaginationViewModel<T> {
    /// Reload from the first page
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// Load the next page (or re-attempt a failed one)
    pub fn load_next_page(&self) {
        self.send(Command::LoadNextPage);
    }

    /// Search with a new query, starting over at the first page
    pub fn set_query(&self, query: impl Into<String>) {
        self.send(Command::SetQuery(query.into()));
    }

    /// Apply a new filter, starting over at the first page
    pub fn set_filter(&self, filter: impl FilterType + 'static) {
        self.send(Command::SetFilter(Arc::new(filter)));
    }

    /// Receiver of state snapshots; the current value is available at once
    pub fn subscribe(&self) -> watch::Receiver<PaginationSnapshot<T>> {
        self.state.clone()
    }

    /// Receiver of request errors published from now on
    pub fn errors(&self) -> broadcast::Receiver<Arc<Error>> {
        self.errors.subscribe()
    }

    /// Stop the actor and cancel the in-flight request
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled() || self.commands.is_closed()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Pagination actor stopped, input ignored");
        }
    }
}

impl<T: Clone> PaginationViewModel<T> {
    /// Current state
    pub fn snapshot(&self) -> PaginationSnapshot<T> {
        self.state.borrow().clone()
    }
}

impl<T> PaginationViewModel<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Stream of state changes published after this call
    ///
    /// Intermediate snapshots may be skipped when the consumer is slower
    /// than the actor; the latest one is always delivered. The stream ends
    /// once the actor stops.
    pub fn snapshots(&self) -> impl Stream<Item = PaginationSnapshot<T>> + Send + 'static {
        let mut receiver = self.subscribe();
        receiver.borrow_and_update();
        futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.changed().await.ok()?;
            let snapshot = receiver.borrow_and_update().clone();
            Some((snapshot, receiver))
        })
    }
}

impl<T> Drop for PaginationViewModel<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// ============================================================================
// Actor
// ============================================================================

struct Actor<T> {
    coordinator: PaginationCoordinator<T>,
    fetcher: Arc<dyn PageFetcher<T>>,
    state: watch::Sender<PaginationSnapshot<T>>,
    errors: broadcast::Sender<Arc<Error>>,
    completions: mpsc::UnboundedSender<Completion<T>>,
    shutdown: CancellationToken,
    in_flight: Option<CancellationToken>,
}

impl<T> Actor<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion<T>>,
    ) {
        let shutdown = self.shutdown.clone();
        loop {
            // Queued inputs are handled before completions
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some((generation, result)) = completions.recv() => {
                    self.handle_completion(generation, result);
                }
            }
        }

        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        debug!("Pagination actor stopped");
    }

    fn handle_command(&mut self, command: Command) {
        let fetch = match command {
            Command::Refresh => self.coordinator.refresh(),
            Command::LoadNextPage => self.coordinator.load_next_page(),
            Command::SetQuery(query) => Some(self.coordinator.set_query(query)),
            Command::SetFilter(filter) => Some(self.coordinator.set_filter(filter)),
        };

        match fetch {
            Some(fetch) => {
                self.publish();
                self.spawn_fetch(fetch);
            }
            None => debug!(phase = %self.coordinator.phase(), "Input ignored"),
        }
    }

    fn handle_completion(&mut self, generation: u64, result: Result<PaginationResponse<T>>) {
        match self.coordinator.complete(generation, result) {
            CompletionOutcome::Applied {
                first_page,
                received,
            } => {
                self.in_flight = None;
                debug!(
                    first_page,
                    received,
                    total = self.coordinator.elements().len(),
                    has_next_page = self.coordinator.has_next_page(),
                    "Page applied"
                );
                self.publish();
            }
            CompletionOutcome::Failed(error) => {
                self.in_flight = None;
                warn!(
                    page = %self.coordinator.request().page(),
                    "Page request failed: {}",
                    error
                );
                self.publish();
                // no receivers is fine
                let _ = self.errors.send(Arc::new(error));
            }
            CompletionOutcome::Discarded => {
                debug!(generation, "Discarded superseded result");
            }
        }
    }

    fn spawn_fetch(&mut self, fetch: FetchCommand) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        let token = self.shutdown.child_token();
        self.in_flight = Some(token.clone());

        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions.clone();
        let FetchCommand {
            generation,
            request,
        } = fetch;

        tokio::spawn(async move {
            let mut task = tokio::spawn(async move { fetcher.fetch(request).await });
            let result = tokio::select! {
                _ = token.cancelled() => {
                    task.abort();
                    return;
                }
                joined = &mut task => match joined {
                    Ok(result) => result,
                    Err(e) => Err(Error::unknown(format!("page request did not complete: {e}"))),
                },
            };
            // the actor may already be gone
            let _ = completions.send((generation, result));
        });
    }

    fn publish(&self) {
        self.state.send_replace(self.coordinator.snapshot());
    }
}
