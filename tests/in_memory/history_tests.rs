//! In-memory integration tests for the history reader.

use super::helpers::{StatusFixture, move_track, seeded_task, status};
use rstest::rstest;
use tracklog::status::{
    domain::TaskId,
    services::{HistoryError, HistoryQuery},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_is_newest_first(status: StatusFixture) -> Result<(), eyre::Report> {
    let task_id = seeded_task(&status).await?;
    status
        .coordinator
        .transition(move_track(task_id, "dev", "todo", "in-progress"))
        .await?;
    status
        .coordinator
        .transition(move_track(task_id, "qa", "todo", "in-progress"))
        .await?;
    status
        .coordinator
        .transition(move_track(task_id, "dev", "in-progress", "completed"))
        .await?;

    let history = status
        .reader
        .history(HistoryQuery::for_task(task_id))
        .await?;

    let records = history.into_vec();
    for pair in records.windows(2) {
        let [newer, older] = pair else {
            continue;
        };
        eyre::ensure!(
            newer.changed_at() > older.changed_at()
                || (newer.changed_at() == older.changed_at() && newer.id() < older.id()),
            "records {} and {} are out of order",
            newer.id(),
            older.id()
        );
    }
    eyre::ensure!(records.len() == 3, "expected 3 records");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_limit_keeps_newest(status: StatusFixture) -> Result<(), eyre::Report> {
    let task_id = seeded_task(&status).await?;
    status
        .coordinator
        .transition(move_track(task_id, "final", "todo", "in-progress"))
        .await?;
    let newest = status
        .coordinator
        .transition(move_track(task_id, "final", "in-progress", "completed"))
        .await?;

    let history = status
        .reader
        .history(HistoryQuery::for_task(task_id).with_limit(1))
        .await?;

    eyre::ensure!(history.len() == 1, "limit should keep one record");
    eyre::ensure!(
        history.latest() == Some(newest.record()),
        "limit should keep the newest record"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_track_filter_is_rejected(status: StatusFixture) -> Result<(), eyre::Report> {
    let result = status
        .reader
        .history(HistoryQuery::for_task(TaskId::new()).with_track("release"))
        .await;

    eyre::ensure!(
        matches!(result, Err(HistoryError::InvalidTrack(_))),
        "expected InvalidTrack, got {result:?}"
    );
    Ok(())
}
