//! Blockmirror Store - Postgres-backed topology source
//!
//! The one component that talks to the cluster catalog. Everything else
//! consumes the `TopologyStore` interface, so this crate stays a thin
//! query layer with no planning logic.

pub mod pg;

pub use pg::PgTopologyStore;
