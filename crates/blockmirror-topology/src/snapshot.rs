//! Cluster topology snapshot
//!
//! Read-only view of the cluster captured at the start of a run: which
//! hosts carry primary segments, every segment instance with its ports and
//! per-filespace storage locations, and the ordered filespace catalog.

use blockmirror_common::{ContentId, Dbid, FilespaceOid, HostName, SegmentRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One host carrying primary segments, with its live primary count
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryHost {
    /// Host address as recorded in the cluster catalog
    pub address: HostName,
    /// Number of primary segment instances hosted here
    pub primary_count: usize,
}

/// One primary-or-mirror copy of a logical data partition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInstance {
    /// Instance row identifier, unique per copy
    pub dbid: Dbid,
    /// Content identifier, shared between the primary and mirror copies
    pub content: ContentId,
    /// Primary or mirror
    pub role: SegmentRole,
    /// Host address this copy lives on
    pub address: HostName,
    /// Network port
    pub port: u16,
    /// Replication port
    pub replication_port: u16,
    /// One storage location per filespace, keyed by filespace oid
    pub locations: BTreeMap<FilespaceOid, String>,
}

impl SegmentInstance {
    /// Smallest filespace oid this instance has a location in.
    ///
    /// Used as the leading sort key when listing a host's primaries; with a
    /// uniform filespace catalog every instance shares the same minimum and
    /// the listing reduces to content-id order.
    #[must_use]
    pub fn min_filespace(&self) -> Option<FilespaceOid> {
        self.locations.keys().next().copied()
    }

    /// Storage locations in descending filespace-oid order.
    ///
    /// This is the concatenation order of both the current-mirror and the
    /// new-mirror serialization; the downstream rebalancer depends on it.
    pub fn locations_desc(&self) -> impl Iterator<Item = (&FilespaceOid, &String)> {
        self.locations.iter().rev()
    }
}

/// A named storage area
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filespace {
    /// Catalog oid
    pub oid: FilespaceOid,
    /// Filespace name
    pub name: String,
    /// Whether this is the primary system filespace (excluded from the
    /// plan header)
    pub is_system: bool,
}

/// Read-only cluster state, captured once per run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    /// Hosts carrying primary segments, with per-host primary counts
    pub hosts: Vec<PrimaryHost>,
    /// Every segment instance on the listed hosts (primaries and mirrors)
    pub instances: Vec<SegmentInstance>,
    /// Ordered filespace catalog
    pub filespaces: Vec<Filespace>,
}

impl TopologySnapshot {
    /// Host addresses carrying primaries
    pub fn primary_addresses(&self) -> impl Iterator<Item = &HostName> {
        self.hosts.iter().map(|h| &h.address)
    }

    /// Primary instances hosted on `address`, ordered by
    /// (minimum filespace oid, content id)
    #[must_use]
    pub fn primaries_on(&self, address: &HostName) -> Vec<&SegmentInstance> {
        let mut primaries: Vec<&SegmentInstance> = self
            .instances
            .iter()
            .filter(|i| i.role.is_primary() && &i.address == address)
            .collect();
        primaries.sort_by_key(|i| (i.min_filespace(), i.content));
        primaries
    }

    /// The mirror copy of `content`, if present
    #[must_use]
    pub fn mirror_of(&self, content: ContentId) -> Option<&SegmentInstance> {
        self.instances
            .iter()
            .find(|i| i.content == content && !i.role.is_primary())
    }

    /// Non-system filespace names in catalog order
    pub fn user_filespace_names(&self) -> impl Iterator<Item = &str> {
        self.filespaces
            .iter()
            .filter(|f| !f.is_system)
            .map(|f| f.name.as_str())
    }
}
