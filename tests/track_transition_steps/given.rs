//! Given steps for review-track transition BDD scenarios.

use super::world::{TrackWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use tracklog::status::{domain::TaskId, services::TransitionRequest};

#[given("a task with seeded review tracks")]
fn seeded_task(world: &mut TrackWorld) -> Result<(), eyre::Report> {
    let task_id = TaskId::new();
    run_async(world.coordinator.initialize_track_states(task_id))
        .wrap_err("seed review tracks for scenario")?;
    world.task_id = Some(task_id);
    Ok(())
}

#[given("a task that was never seeded")]
fn unseeded_task(world: &mut TrackWorld) {
    world.task_id = Some(TaskId::new());
}

#[given(r#""{actor}" has moved the "{track}" track from "{expected}" to "{target}""#)]
fn track_already_moved(
    world: &mut TrackWorld,
    actor: String,
    track: String,
    expected: String,
    target: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    run_async(world.coordinator.transition(TransitionRequest::new(
        task_id,
        track,
        expected,
        target,
        "scenario setup",
        actor,
    )))
    .wrap_err("apply setup transition")?;
    Ok(())
}

#[given("the store will fail the next commit")]
fn store_fails_next_commit(world: &mut TrackWorld) -> Result<(), eyre::Report> {
    world
        .store
        .fail_next_commit()
        .wrap_err("arm storage fault")?;
    Ok(())
}
