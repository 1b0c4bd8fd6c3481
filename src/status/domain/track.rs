//! Review tracks and the lifecycle states each track moves through.

use super::{ParseTrackError, ParseTrackStateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Independent review dimension of a task.
///
/// The set is closed. Code that needs to visit every track iterates
/// [`Track::ALL`] instead of naming members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Development work.
    Dev,
    /// Quality assurance.
    Qa,
    /// Final sign-off.
    Final,
}

impl Track {
    /// Every track, in display order.
    pub const ALL: [Self; 3] = [Self::Dev, Self::Qa, Self::Final];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Qa => "qa",
            Self::Final => "final",
        }
    }
}

impl TryFrom<&str> for Track {
    type Error = ParseTrackError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|track| track.as_str() == normalized)
            .ok_or_else(|| ParseTrackError(value.to_owned()))
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a single review track.
///
/// No ordering between states is enforced. [`TrackState::next`] only
/// suggests a successor for callers that step through states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackState {
    /// Work on the track has not started.
    Todo,
    /// Work on the track is under way.
    InProgress,
    /// The track has been signed off.
    Completed,
}

impl TrackState {
    /// Every state, in suggested progression order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Completed];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Suggested successor: `todo → in-progress → completed → todo`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Todo => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Todo,
        }
    }
}

impl TryFrom<&str> for TrackState {
    type Error = ParseTrackStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseTrackStateError(value.to_owned()))
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
