//! Shared world state for review-track transition BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tracklog::status::{
    adapters::memory::InMemoryStatusStore,
    domain::TaskId,
    services::{HistoryReader, TransitionCoordinator, TransitionOutcome, TransitionResult},
};

/// Coordinator type used by the BDD world.
pub type TestCoordinator = TransitionCoordinator<InMemoryStatusStore, DefaultClock>;

/// Scenario world for review-track behaviour tests.
pub struct TrackWorld {
    pub store: Arc<InMemoryStatusStore>,
    pub coordinator: TestCoordinator,
    pub reader: HistoryReader<InMemoryStatusStore>,
    pub task_id: Option<TaskId>,
    pub last_result: Option<TransitionResult<TransitionOutcome>>,
}

impl TrackWorld {
    /// Creates a world with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStatusStore::new());
        let coordinator = TransitionCoordinator::new(Arc::clone(&store), Arc::new(DefaultClock));
        let reader = HistoryReader::new(Arc::clone(&store));

        Self {
            store,
            coordinator,
            reader,
            task_id: None,
            last_result: None,
        }
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error if no Given step selected a task.
    pub fn task_id(&self) -> Result<TaskId, eyre::Report> {
        self.task_id
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the outcome of the most recent When step.
    ///
    /// # Errors
    ///
    /// Returns an error if no transition was attempted.
    pub fn last_result(&self) -> Result<&TransitionResult<TransitionOutcome>, eyre::Report> {
        self.last_result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing transition result"))
    }
}

impl Default for TrackWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TrackWorld {
    TrackWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
