//! Racing callers against the compare-and-swap guard.

use std::sync::Arc;

use super::helpers::{StatusFixture, move_track, seeded_task, status};
use rstest::rstest;
use tokio::task::JoinSet;
use tracklog::status::{
    domain::{Track, TrackState},
    services::{HistoryQuery, TransitionErrorKind, TransitionRequest},
};

const RACERS: usize = 16;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_racer_wins_a_shared_expectation(
    status: StatusFixture,
) -> Result<(), eyre::Report> {
    let task_id = seeded_task(&status).await?;
    let mut racers = JoinSet::new();
    for racer in 0..RACERS {
        let coordinator = Arc::clone(&status.coordinator);
        racers.spawn(async move {
            coordinator
                .transition(TransitionRequest::new(
                    task_id,
                    "dev",
                    "todo",
                    "in-progress",
                    format!("racer {racer}"),
                    format!("user-{racer}"),
                ))
                .await
        });
    }

    let mut winners = 0_usize;
    let mut conflicts = 0_usize;
    while let Some(joined) = racers.join_next().await {
        match joined? {
            Ok(_) => winners += 1,
            Err(err) if err.kind() == TransitionErrorKind::Conflict => conflicts += 1,
            Err(err) => return Err(eyre::eyre!("unexpected error: {err}")),
        }
    }

    eyre::ensure!(winners == 1, "expected one winner, found {winners}");
    eyre::ensure!(conflicts == RACERS - 1, "expected {} conflicts", RACERS - 1);
    let history = status
        .reader
        .history(HistoryQuery::for_task(task_id).with_track("dev"))
        .await?;
    eyre::ensure!(history.len() == 1, "expected one audit record");
    let report = status.reader.verify(task_id, Track::Dev).await?;
    eyre::ensure!(report.final_state == TrackState::InProgress, "chain out of step");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_tracks_do_not_contend(status: StatusFixture) -> Result<(), eyre::Report> {
    let task_id = seeded_task(&status).await?;
    let mut racers = JoinSet::new();
    for track in Track::ALL {
        let coordinator = Arc::clone(&status.coordinator);
        racers.spawn(async move {
            coordinator
                .transition(move_track(task_id, track.as_str(), "todo", "completed"))
                .await
        });
    }

    while let Some(joined) = racers.join_next().await {
        joined??;
    }

    let current = status.coordinator.current_status(task_id).await?;
    eyre::ensure!(current.is_complete(), "every track should be completed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sequential_handoffs_chain_without_gaps(
    status: StatusFixture,
) -> Result<(), eyre::Report> {
    let task_id = seeded_task(&status).await?;
    let mut state = TrackState::Todo;

    for _ in 0..9 {
        let next = state.next();
        status
            .coordinator
            .transition(move_track(task_id, "qa", state.as_str(), next.as_str()))
            .await?;
        state = next;
    }

    let report = status.reader.verify(task_id, Track::Qa).await?;
    eyre::ensure!(report.records == 9, "expected 9 records, found {}", report.records);
    eyre::ensure!(report.final_state == state, "chain should end at {state}");
    Ok(())
}
