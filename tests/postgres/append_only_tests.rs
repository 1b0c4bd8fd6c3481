//! The audit table rejects edits and deletions.

use super::helpers::{connect, pg_fixture};
use diesel::connection::SimpleConnection;
use rstest::rstest;
use tracklog::status::services::TransitionRequest;

#[rstest]
#[case::update("UPDATE track_audit_records SET remark = 'rewritten' WHERE task_id = '{task}'")]
#[case::delete("DELETE FROM track_audit_records WHERE task_id = '{task}'")]
#[tokio::test(flavor = "multi_thread")]
async fn audit_rows_cannot_be_mutated(#[case] template: &str) -> Result<(), eyre::Report> {
    let Some(pg) = pg_fixture().await? else {
        return Ok(());
    };
    let task_id = pg.seeded_task().await?;
    pg.coordinator
        .transition(TransitionRequest::new(
            task_id,
            "qa",
            "todo",
            "in-progress",
            "testing",
            "carol",
        ))
        .await?;

    let statement = template.replace("{task}", &task_id.to_string());
    let url = pg.database_url.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<bool, eyre::Report> {
        let mut conn = connect(&url)?;
        Ok(conn.batch_execute(&statement).is_err())
    })
    .await??;

    eyre::ensure!(outcome, "audit mutation should be rejected");
    let history = pg
        .reader
        .verify(task_id, tracklog::status::domain::Track::Qa)
        .await?;
    eyre::ensure!(history.records == 1, "audit record should survive");
    Ok(())
}
