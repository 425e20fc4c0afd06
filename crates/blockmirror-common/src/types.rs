//! Core type definitions for Blockmirror
//!
//! This module defines the fundamental identifiers shared between the
//! topology snapshot, the planner, and the store.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a segment host as it appears in the host file and in the
/// cluster catalog.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct HostName(String);

impl HostName {
    /// Create a new host name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the host name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HostName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Debug for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostName({})", self.0)
    }
}

/// Logical data partition identifier, shared between the primary and the
/// mirror copy of a segment.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
#[display("{_0}")]
pub struct ContentId(i32);

impl ContentId {
    /// Create from a raw catalog value
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

/// Identifier of one segment instance row (one primary-or-mirror copy).
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
#[display("{_0}")]
pub struct Dbid(i32);

impl Dbid {
    /// Create from a raw catalog value
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for Dbid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dbid({})", self.0)
    }
}

/// Identifier of a named storage area (filespace).
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
#[display("{_0}")]
pub struct FilespaceOid(u32);

impl FilespaceOid {
    /// Create from a raw catalog value
    #[must_use]
    pub const fn new(oid: u32) -> Self {
        Self(oid)
    }

    /// Get the raw value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FilespaceOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilespaceOid({})", self.0)
    }
}

/// Role a segment instance holds for its content id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentRole {
    /// Serves reads and writes
    Primary,
    /// Standby replica
    Mirror,
}

impl SegmentRole {
    /// Whether this is the primary copy
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_display() {
        let host = HostName::new("sdw1");
        assert_eq!(host.to_string(), "sdw1");
        assert_eq!(host.as_str(), "sdw1");
    }

    #[test]
    fn test_identifier_ordering() {
        assert!(ContentId::new(0) < ContentId::new(3));
        assert!(FilespaceOid::new(3052) > FilespaceOid::new(3051));
    }

    #[test]
    fn test_role_predicates() {
        assert!(SegmentRole::Primary.is_primary());
        assert!(!SegmentRole::Mirror.is_primary());
    }
}
