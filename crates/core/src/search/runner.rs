//! Async search orchestrator and its handle.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, MovieCatalog, MovieSummary};
use crate::debounce::QueryDebouncer;
use crate::metrics::{SETTLED_QUERIES, STALE_RESPONSES_DISCARDED};
use crate::trending::{TrendingAggregator, TrendingRanking};

use super::{Completion, FetchTicket, SearchConfig, SearchError, SearchSession, SearchState};

/// Commands sent from handles to the orchestrator task.
enum Command {
    QueryChanged(String),
    Retry,
    RefreshTrending,
    Shutdown(oneshot::Sender<()>),
}

/// Work for the trending worker. Jobs run one at a time in arrival order.
enum TrendingJob {
    RecordHit {
        query: String,
        top_result: MovieSummary,
    },
    Refresh,
}

type FetchOutcome = (FetchTicket, Result<Vec<MovieSummary>, CatalogError>);

/// Builds and starts the search orchestrator task.
pub struct SearchOrchestrator {
    config: SearchConfig,
    catalog: Arc<dyn MovieCatalog>,
    trending: TrendingAggregator,
}

impl SearchOrchestrator {
    pub fn new(
        config: SearchConfig,
        catalog: Arc<dyn MovieCatalog>,
        trending: TrendingAggregator,
    ) -> Self {
        Self {
            config,
            catalog,
            trending,
        }
    }

    /// Spawn the orchestrator.
    ///
    /// The default listing is requested immediately and the trending ranking
    /// is loaded once. Must be called from within a Tokio runtime.
    pub fn start(self) -> SearchHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());
        let (trending_tx, trending_rx) = watch::channel(TrendingRanking::default());
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let (debouncer, settled_rx) = QueryDebouncer::channel(self.config.debounce_window());
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(run_trending_worker(self.trending, job_rx, trending_tx));

        let runner = Runner {
            session: SearchSession::new(),
            catalog: self.catalog,
            debouncer,
            state_tx,
            completion_tx,
            in_flight: None,
            jobs: Some(job_tx),
            worker: Some(worker),
        };

        info!(
            "Starting search orchestrator (debounce {}ms)",
            self.config.debounce_ms
        );
        tokio::spawn(runner.run(command_rx, settled_rx, completion_rx));

        SearchHandle {
            commands: command_tx,
            state_rx,
            trending_rx,
        }
    }
}

/// Cloneable handle to a running orchestrator.
///
/// This is the presentation boundary: snapshots are read-only and the only
/// input is the raw query text.
#[derive(Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<SearchState>,
    trending_rx: watch::Receiver<TrendingRanking>,
}

impl SearchHandle {
    /// Raw query text changed.
    pub fn set_query(&self, raw: impl Into<String>) -> Result<(), SearchError> {
        self.send(Command::QueryChanged(raw.into()))
    }

    /// Re-issue the current settled query.
    pub fn retry(&self) -> Result<(), SearchError> {
        self.send(Command::Retry)
    }

    /// Re-read the trending ranking.
    pub fn refresh_trending(&self) -> Result<(), SearchError> {
        self.send(Command::RefreshTrending)
    }

    /// Current search snapshot.
    pub fn state(&self) -> SearchState {
        self.state_rx.borrow().clone()
    }

    /// Current trending snapshot.
    pub fn trending(&self) -> TrendingRanking {
        self.trending_rx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SearchState> {
        self.state_rx.clone()
    }

    pub fn subscribe_trending(&self) -> watch::Receiver<TrendingRanking> {
        self.trending_rx.clone()
    }

    /// Stop the orchestrator.
    ///
    /// Cancels the debounce timer, aborts the in-flight fetch and waits for
    /// queued trending work to finish. Snapshots stay readable afterwards.
    pub async fn shutdown(&self) -> Result<(), SearchError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::Shutdown(ack_tx))?;
        ack_rx.await.map_err(|_| SearchError::OrchestratorStopped)
    }

    fn send(&self, command: Command) -> Result<(), SearchError> {
        self.commands
            .send(command)
            .map_err(|_| SearchError::OrchestratorStopped)
    }
}

struct Runner {
    session: SearchSession,
    catalog: Arc<dyn MovieCatalog>,
    debouncer: QueryDebouncer,
    state_tx: watch::Sender<SearchState>,
    completion_tx: mpsc::UnboundedSender<FetchOutcome>,
    in_flight: Option<JoinHandle<()>>,
    jobs: Option<mpsc::UnboundedSender<TrendingJob>>,
    worker: Option<JoinHandle<()>>,
}

impl Runner {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut settled: mpsc::UnboundedReceiver<String>,
        mut completions: mpsc::UnboundedReceiver<FetchOutcome>,
    ) {
        let initial = self.session.restart();
        self.spawn_fetch(initial);
        self.enqueue(TrendingJob::Refresh);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::QueryChanged(raw)) => {
                        self.session.input_changed(raw.clone());
                        self.publish();
                        self.debouncer.push(raw);
                    }
                    Some(Command::Retry) => {
                        let ticket = self.session.restart();
                        info!("Retrying search for '{}'", ticket.query);
                        self.spawn_fetch(ticket);
                    }
                    Some(Command::RefreshTrending) => self.enqueue(TrendingJob::Refresh),
                    Some(Command::Shutdown(ack)) => {
                        self.teardown().await;
                        let _ = ack.send(());
                        return;
                    }
                    None => {
                        self.teardown().await;
                        return;
                    }
                },
                Some(query) = settled.recv() => {
                    match self.session.begin(&query) {
                        Some(ticket) => self.spawn_fetch(ticket),
                        None => debug!("Settled query '{}' unchanged, skipping fetch", query),
                    }
                }
                Some((ticket, outcome)) = completions.recv() => self.complete(ticket, outcome),
            }
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        SETTLED_QUERIES.inc();
        debug!(
            "Fetching catalog for '{}' (generation {})",
            ticket.query, ticket.generation
        );
        self.publish();

        let catalog = Arc::clone(&self.catalog);
        let tx = self.completion_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = catalog.fetch_catalog(&ticket.query).await;
            let _ = tx.send((ticket, outcome));
        }));
    }

    fn complete(&mut self, ticket: FetchTicket, outcome: Result<Vec<MovieSummary>, CatalogError>) {
        if let Err(e) = &outcome {
            warn!("Catalog fetch for '{}' failed: {}", ticket.query, e);
        }

        match self.session.complete(&ticket, outcome) {
            Completion::Stale => {
                STALE_RESPONSES_DISCARDED.inc();
                debug!(
                    "Discarded stale response for '{}' (generation {}, current {})",
                    ticket.query,
                    ticket.generation,
                    self.session.generation()
                );
            }
            Completion::Failed => {
                self.in_flight = None;
                self.publish();
            }
            Completion::Succeeded { record_hit } => {
                debug!(
                    "Search for '{}' returned {} results",
                    ticket.query,
                    self.session.state().results().len()
                );
                self.in_flight = None;
                self.publish();
                if let Some(top_result) = record_hit {
                    self.enqueue(TrendingJob::RecordHit {
                        query: ticket.query,
                        top_result,
                    });
                }
            }
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.session.state().clone());
    }

    fn enqueue(&self, job: TrendingJob) {
        if let Some(jobs) = &self.jobs {
            if jobs.send(job).is_err() {
                warn!("Trending worker stopped, dropping job");
            }
        }
    }

    async fn teardown(&mut self) {
        info!("Stopping search orchestrator");
        self.debouncer.cancel();
        if let Some(fetch) = self.in_flight.take() {
            fetch.abort();
        }

        // Closing the queue lets the worker drain what is already queued.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!("Trending worker ended abnormally: {}", e);
            }
        }
    }
}

async fn run_trending_worker(
    aggregator: TrendingAggregator,
    mut jobs: mpsc::UnboundedReceiver<TrendingJob>,
    trending_tx: watch::Sender<TrendingRanking>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            TrendingJob::RecordHit { query, top_result } => {
                if let Err(e) = aggregator.record_hit(&query, &top_result).await {
                    warn!("Failed to record trending hit for '{}': {}", query, e);
                }
            }
            TrendingJob::Refresh => match aggregator.get_trending().await {
                Ok(ranking) => {
                    debug!("Loaded {} trending entries", ranking.len());
                    trending_tx.send_replace(ranking);
                }
                Err(e) => warn!("Failed to load trending searches: {}", e),
            },
        }
    }
}
