//! Shared test helpers for in-memory status integration tests.

use std::sync::{Arc, Once};

use mockable::DefaultClock;
use rstest::fixture;
use tracklog::status::{
    adapters::memory::InMemoryStatusStore,
    domain::TaskId,
    services::{HistoryReader, TransitionCoordinator, TransitionRequest},
};

/// Coordinator type used by in-memory integration tests.
pub type TestCoordinator = TransitionCoordinator<InMemoryStatusStore, DefaultClock>;

/// Coordinator and history reader sharing one store.
pub struct StatusFixture {
    /// Shared store handle.
    pub store: Arc<InMemoryStatusStore>,
    /// Transition coordinator over the store.
    pub coordinator: Arc<TestCoordinator>,
    /// History reader over the store.
    pub reader: HistoryReader<InMemoryStatusStore>,
}

static TRACING: Once = Once::new();

/// Routes `tracing` output through the test harness writer.
///
/// Set `RUST_LOG=tracklog=debug` to see coordinator events.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let result = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        drop(result);
    });
}

/// Provides a fresh store, coordinator, and reader for each test.
#[fixture]
pub fn status() -> StatusFixture {
    init_tracing();
    let store = Arc::new(InMemoryStatusStore::new());
    let coordinator = Arc::new(TransitionCoordinator::new(
        Arc::clone(&store),
        Arc::new(DefaultClock),
    ));
    let reader = HistoryReader::new(Arc::clone(&store));
    StatusFixture {
        store,
        coordinator,
        reader,
    }
}

/// Seeds a new task and returns its identifier.
///
/// # Errors
///
/// Returns an error if seeding fails.
pub async fn seeded_task(fixture: &StatusFixture) -> Result<TaskId, eyre::Report> {
    let task_id = TaskId::new();
    fixture
        .coordinator
        .initialize_track_states(task_id)
        .await
        .map_err(|err| eyre::eyre!("seed task {task_id}: {err}"))?;
    Ok(task_id)
}

/// Builds a transition request from `alice` with a fixed remark.
#[must_use]
pub fn move_track(
    task_id: TaskId,
    track: &str,
    expected: &str,
    new_state: &str,
) -> TransitionRequest {
    TransitionRequest::new(task_id, track, expected, new_state, "moving along", "alice")
}
