//! Who changed a track, and why.

use super::StatusDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mandatory justification attached to every state change.
///
/// Deserialization goes through [`Remark::new`], so stored or transmitted
/// values obey the same rules as fresh input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Remark(String);

impl Remark {
    /// Creates a validated remark from trimmed input.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::EmptyRemark`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, StatusDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StatusDomainError::EmptyRemark);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the remark text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the remark length in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for Remark {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Remark {
    type Error = StatusDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Remark> for String {
    fn from(value: Remark) -> Self {
        value.0
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller identity stamped on audit records.
///
/// The crate does not authenticate actors; it records what the calling
/// layer passes in. Deserialization goes through [`Actor::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Actor(String);

impl Actor {
    /// Creates a validated actor identity from trimmed input.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::EmptyActor`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, StatusDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StatusDomainError::EmptyActor);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the actor identity.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identity length in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for Actor {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Actor {
    type Error = StatusDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Actor> for String {
    fn from(value: Actor) -> Self {
        value.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
