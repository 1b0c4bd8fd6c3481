//! Current per-track status of a task.

use super::{Remark, TaskId, Track, TrackState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Current state tuple of one review track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStatus {
    state: TrackState,
    remark: Option<Remark>,
    changed_at: DateTime<Utc>,
}

impl TrackStatus {
    /// Creates the seeded status: `todo`, no remark.
    #[must_use]
    pub const fn seeded(at: DateTime<Utc>) -> Self {
        Self {
            state: TrackState::Todo,
            remark: None,
            changed_at: at,
        }
    }

    /// Creates the status written by a committed transition.
    #[must_use]
    pub const fn changed(state: TrackState, remark: Remark, at: DateTime<Utc>) -> Self {
        Self {
            state,
            remark: Some(remark),
            changed_at: at,
        }
    }

    /// Reconstructs a status from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        state: TrackState,
        remark: Option<Remark>,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            state,
            remark,
            changed_at,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> TrackState {
        self.state
    }

    /// Returns the remark of the last committed transition, if any.
    #[must_use]
    pub const fn remark(&self) -> Option<&Remark> {
        self.remark.as_ref()
    }

    /// Returns when the state was last written.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }
}

impl fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state.as_str())
    }
}

/// Status record of a task: one [`TrackStatus`] per [`Track`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    task_id: TaskId,
    tracks: BTreeMap<Track, TrackStatus>,
}

impl TaskStatus {
    /// Seeds every track to `todo` at the given instant.
    #[must_use]
    pub fn seeded(task_id: TaskId, at: DateTime<Utc>) -> Self {
        let tracks = Track::ALL
            .into_iter()
            .map(|track| (track, TrackStatus::seeded(at)))
            .collect();
        Self { task_id, tracks }
    }

    /// Reconstructs a task status from persisted per-track rows.
    #[must_use]
    pub fn from_persisted(
        task_id: TaskId,
        tracks: impl IntoIterator<Item = (Track, TrackStatus)>,
    ) -> Self {
        Self {
            task_id,
            tracks: tracks.into_iter().collect(),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the status of one track, if the track is present.
    #[must_use]
    pub fn track(&self, track: Track) -> Option<&TrackStatus> {
        self.tracks.get(&track)
    }

    /// Iterates tracks in [`Track`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Track, &TrackStatus)> {
        self.tracks.iter().map(|(track, status)| (*track, status))
    }

    /// Returns `true` when every track has been completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Track::ALL.into_iter().all(|track| {
            self.track(track)
                .is_some_and(|status| status.state() == TrackState::Completed)
        })
    }

    /// Overwrites one track's status.
    pub(crate) fn replace(&mut self, track: Track, status: TrackStatus) {
        self.tracks.insert(track, status);
    }
}
