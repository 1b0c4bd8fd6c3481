//! Shared fixtures for status unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::status::{
    adapters::memory::InMemoryStatusStore,
    services::{HistoryReader, TransitionCoordinator},
};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock that advances by a fixed number of seconds on every read.
#[derive(Debug)]
pub struct StepClock {
    base: DateTime<Utc>,
    step_secs: i64,
    reads: AtomicI64,
}

impl StepClock {
    /// Starts at a fixed instant and advances one second per read.
    pub fn ticking() -> Self {
        Self::with_step(1)
    }

    /// Returns the same instant on every read.
    pub fn frozen() -> Self {
        Self::with_step(0)
    }

    fn with_step(step_secs: i64) -> Self {
        Self {
            base: Utc
                .with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            step_secs,
            reads: AtomicI64::new(0),
        }
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::seconds(read * self.step_secs)
    }
}

/// Coordinator and reader sharing one in-memory store.
pub struct Harness {
    pub store: Arc<InMemoryStatusStore>,
    pub coordinator: TransitionCoordinator<InMemoryStatusStore, StepClock>,
    pub reader: HistoryReader<InMemoryStatusStore>,
}

impl Harness {
    /// Builds a harness around the given clock.
    pub fn with_clock(clock: StepClock) -> Self {
        let store = Arc::new(InMemoryStatusStore::new());
        let coordinator = TransitionCoordinator::new(Arc::clone(&store), Arc::new(clock));
        let reader = HistoryReader::new(Arc::clone(&store));
        Self {
            store,
            coordinator,
            reader,
        }
    }
}
