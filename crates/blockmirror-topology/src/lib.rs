//! Blockmirror Topology - read-only cluster state
//!
//! This crate defines the snapshot of cluster state the planner consumes
//! (segment hosts, instances, filespaces) and the narrow store interface
//! it is fetched through. The snapshot is captured once per run and never
//! mutated; the planner holds no other view of the cluster.

pub mod snapshot;
pub mod store;

pub use snapshot::{Filespace, PrimaryHost, SegmentInstance, TopologySnapshot};
pub use store::{InMemoryTopology, TopologyStore, capture_snapshot};
