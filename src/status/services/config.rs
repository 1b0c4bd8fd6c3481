//! Input limits applied by the transition coordinator.

use crate::status::domain::{Actor, Remark, StatusDomainError};
use serde::Deserialize;

/// Limits applied to caller-supplied text before a transition runs.
///
/// Deserializable so deployments can load it alongside their own settings;
/// missing fields fall back to [`StatusServiceConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatusServiceConfig {
    /// Maximum remark length in characters.
    pub max_remark_chars: usize,
    /// Maximum actor identity length in characters.
    pub max_actor_chars: usize,
}

impl Default for StatusServiceConfig {
    fn default() -> Self {
        Self {
            max_remark_chars: 2000,
            max_actor_chars: 255,
        }
    }
}

impl StatusServiceConfig {
    /// Creates a strict configuration with reduced limits.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_remark_chars: 500,
            max_actor_chars: 64,
        }
    }

    /// Checks a remark against the configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::RemarkTooLong`] when the remark is over
    /// the limit.
    pub fn check_remark(&self, remark: &Remark) -> Result<(), StatusDomainError> {
        let actual = remark.char_count();
        if actual > self.max_remark_chars {
            return Err(StatusDomainError::RemarkTooLong {
                max: self.max_remark_chars,
                actual,
            });
        }
        Ok(())
    }

    /// Checks an actor identity against the configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::ActorTooLong`] when the identity is over
    /// the limit.
    pub fn check_actor(&self, actor: &Actor) -> Result<(), StatusDomainError> {
        let actual = actor.char_count();
        if actual > self.max_actor_chars {
            return Err(StatusDomainError::ActorTooLong {
                max: self.max_actor_chars,
                actual,
            });
        }
        Ok(())
    }
}
