//! Topology store interface
//!
//! The planner never talks to the cluster catalog directly; everything it
//! needs comes through this narrow interface so the core can be exercised
//! against an in-memory topology without a live database.

use crate::snapshot::{Filespace, PrimaryHost, SegmentInstance, TopologySnapshot};
use async_trait::async_trait;
use blockmirror_common::{HostName, Result};

/// Read-only access to cluster topology
#[async_trait]
pub trait TopologyStore: Send + Sync {
    /// Distinct hosts carrying primary segments (coordinator excluded),
    /// with per-host primary counts
    async fn fetch_hosts(&self) -> Result<Vec<PrimaryHost>>;

    /// Every segment instance (primary and mirror) whose primary lives on
    /// one of the given hosts
    async fn fetch_segment_instances(&self, hosts: &[HostName]) -> Result<Vec<SegmentInstance>>;

    /// The ordered filespace catalog
    async fn fetch_filespaces(&self) -> Result<Vec<Filespace>>;
}

/// Capture a full snapshot through the store interface.
///
/// The snapshot is read once per run; both validation and mapping
/// resolution work from this single capture.
pub async fn capture_snapshot(store: &dyn TopologyStore) -> Result<TopologySnapshot> {
    let hosts = store.fetch_hosts().await?;
    let addresses: Vec<HostName> = hosts.iter().map(|h| h.address.clone()).collect();
    let instances = store.fetch_segment_instances(&addresses).await?;
    let filespaces = store.fetch_filespaces().await?;
    Ok(TopologySnapshot {
        hosts,
        instances,
        filespaces,
    })
}

/// In-memory topology for tests and dry runs
#[derive(Clone, Debug, Default)]
pub struct InMemoryTopology {
    snapshot: TopologySnapshot,
}

impl InMemoryTopology {
    /// Wrap a prebuilt snapshot
    #[must_use]
    pub fn new(snapshot: TopologySnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl TopologyStore for InMemoryTopology {
    async fn fetch_hosts(&self) -> Result<Vec<PrimaryHost>> {
        Ok(self.snapshot.hosts.clone())
    }

    async fn fetch_segment_instances(&self, hosts: &[HostName]) -> Result<Vec<SegmentInstance>> {
        let instances = self
            .snapshot
            .instances
            .iter()
            .filter(|i| hosts.contains(&i.address) || !i.role.is_primary())
            .cloned()
            .collect();
        Ok(instances)
    }

    async fn fetch_filespaces(&self) -> Result<Vec<Filespace>> {
        Ok(self.snapshot.filespaces.clone())
    }
}
