//! Then steps for review-track transition BDD scenarios.

use super::world::{TrackWorld, run_async};
use rstest_bdd_macros::then;
use tracklog::status::{
    domain::{Track, TrackState},
    services::{HistoryQuery, TransitionErrorKind},
};

fn expect_failure(world: &TrackWorld, kind: TransitionErrorKind) -> Result<(), eyre::Report> {
    match world.last_result()? {
        Err(err) if err.kind() == kind => Ok(()),
        other => Err(eyre::eyre!("expected a {kind:?} failure, got {other:?}")),
    }
}

#[then("the last transition succeeds")]
fn last_transition_succeeds(world: &TrackWorld) -> Result<(), eyre::Report> {
    match world.last_result()? {
        Ok(_) => Ok(()),
        Err(err) => Err(eyre::eyre!("expected success, got {err}")),
    }
}

#[then(r#"the "{track}" track is "{state}""#)]
fn track_is(world: &TrackWorld, track: String, state: String) -> Result<(), eyre::Report> {
    let wanted_track = Track::try_from(track.as_str())?;
    let wanted_state = TrackState::try_from(state.as_str())?;
    let status = run_async(world.coordinator.current_status(world.task_id()?))?;
    let actual = status
        .track(wanted_track)
        .map(|track_status| track_status.state())
        .ok_or_else(|| eyre::eyre!("track {wanted_track} missing"))?;

    eyre::ensure!(
        actual == wanted_state,
        "expected {wanted_track} to be {wanted_state}, found {actual}"
    );
    Ok(())
}

#[then(r#"the "{track}" history has {count:u64} records"#)]
fn history_has(world: &TrackWorld, track: String, count: u64) -> Result<(), eyre::Report> {
    let history = run_async(
        world
            .reader
            .history(HistoryQuery::for_task(world.task_id()?).with_track(track)),
    )?;
    let found = u64::try_from(history.len())?;

    eyre::ensure!(found == count, "expected {count} records, found {found}");
    Ok(())
}

#[then(r#"the "{track}" audit chain verifies"#)]
fn audit_chain_verifies(world: &TrackWorld, track: String) -> Result<(), eyre::Report> {
    let wanted_track = Track::try_from(track.as_str())?;
    let report = run_async(world.reader.verify_current(world.task_id()?, wanted_track))?;

    eyre::ensure!(report.records > 0, "audit chain should not be empty");
    Ok(())
}

#[then(r#"the transition fails with a conflict showing "{state}""#)]
fn fails_with_conflict(world: &TrackWorld, state: String) -> Result<(), eyre::Report> {
    expect_failure(world, TransitionErrorKind::Conflict)?;
    let wanted_state = TrackState::try_from(state.as_str())?;
    let actual = world
        .last_result()?
        .as_ref()
        .err()
        .and_then(|err| err.actual_status())
        .map(|status| status.state());

    eyre::ensure!(
        actual == Some(wanted_state),
        "conflict should report {wanted_state}, got {actual:?}"
    );
    Ok(())
}

#[then("the transition fails with a validation error")]
fn fails_with_validation(world: &TrackWorld) -> Result<(), eyre::Report> {
    expect_failure(world, TransitionErrorKind::Validation)
}

#[then("the transition fails with a not found error")]
fn fails_with_not_found(world: &TrackWorld) -> Result<(), eyre::Report> {
    expect_failure(world, TransitionErrorKind::NotFound)
}

#[then("the transition fails with a retryable storage error")]
fn fails_with_retryable_storage(world: &TrackWorld) -> Result<(), eyre::Report> {
    expect_failure(world, TransitionErrorKind::StorageFailure)?;
    let retryable = world
        .last_result()?
        .as_ref()
        .err()
        .is_some_and(|err| err.is_retryable());

    eyre::ensure!(retryable, "storage failures should be retryable");
    Ok(())
}
