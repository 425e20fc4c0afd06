//! Error types for Blockmirror
//!
//! This module defines the common error types used throughout the planner.

use crate::types::{ContentId, HostName};
use thiserror::Error;

/// Common result type for Blockmirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Blockmirror
#[derive(Debug, Error)]
pub enum Error {
    // Precondition errors
    #[error("block size must be at least 2, got {0}")]
    BlockSizeTooSmall(usize),

    #[error("host file error: {0}")]
    HostFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Consistency errors
    #[error("host count mismatch: host file lists {file_hosts} hosts, cluster has {live_hosts} primary hosts")]
    HostCountMismatch { file_hosts: usize, live_hosts: usize },

    #[error("{host_count} hosts cannot be partitioned into blocks of {block_size}")]
    BlockSizeNotDivisible { host_count: usize, block_size: usize },

    #[error("hostname sets differ between host file and cluster:\n{diff}")]
    HostSetMismatch { diff: String },

    #[error("uneven primary segment counts across hosts: {detail}")]
    UnevenSegmentCounts { detail: String },

    #[error("no mirror found for content {0}")]
    MirrorNotFound(ContentId),

    #[error("host {0} has no primary segments in the cluster")]
    HostNotFound(HostName),

    // External-dependency errors
    #[error("topology store error: {0}")]
    Store(String),

    #[error("failed to write plan to {path}: {reason}")]
    PlanWrite { path: String, reason: String },

    // Internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new host file error
    pub fn host_file(msg: impl Into<String>) -> Self {
        Self::HostFile(msg.into())
    }

    /// Check if this is an input-consistency error the operator can fix by
    /// correcting the host file or block size
    #[must_use]
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            Self::HostCountMismatch { .. }
                | Self::BlockSizeNotDivisible { .. }
                | Self::HostSetMismatch { .. }
                | Self::UnevenSegmentCounts { .. }
        )
    }

    /// Check if this is a precondition error (bad arguments, unreadable
    /// input) reported before any computation is attempted
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::BlockSizeTooSmall(_) | Self::HostFile(_) | Self::Io(_))
    }
}
