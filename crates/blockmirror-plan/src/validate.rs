//! Validation gate
//!
//! Pre-flight checks on the ordered host list against the live topology.
//! Every check is a hard stop; nothing downstream runs until the input has
//! passed all of them.

use blockmirror_common::{Error, HostName, Result};
use blockmirror_topology::TopologySnapshot;
use std::collections::BTreeSet;
use tracing::debug;

/// One host from the validated ordered list, with its derived block
/// membership
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Host {
    /// Host address
    pub name: HostName,
    /// Block index (0-based) derived from list position and block size
    pub block: usize,
    /// Position within the block (1-based)
    pub position: usize,
}

/// The validated input tuple handed to the assignment generator
#[derive(Clone, Debug)]
pub struct ValidatedInput {
    /// Hosts in file order, annotated with block membership
    pub hosts: Vec<Host>,
    /// Number of hosts per block
    pub block_size: usize,
    /// Primary segment instances per host, uniform across the cluster
    pub instances_per_host: usize,
}

/// Run all pre-flight checks, in order, each a hard stop on failure:
///
/// 1. `block_size >= 2`;
/// 2. file host count equals live primary host count;
/// 3. the primary host count is an exact multiple of `block_size`;
/// 4. the set of file hostnames equals the set of live primary addresses
///    (reported with a side-by-side diff of both sorted lists);
/// 5. every host reports the same primary segment count.
pub fn validate(
    ordered_hosts: &[HostName],
    block_size: usize,
    snapshot: &TopologySnapshot,
) -> Result<ValidatedInput> {
    if block_size < 2 {
        return Err(Error::BlockSizeTooSmall(block_size));
    }

    if ordered_hosts.len() != snapshot.hosts.len() {
        return Err(Error::HostCountMismatch {
            file_hosts: ordered_hosts.len(),
            live_hosts: snapshot.hosts.len(),
        });
    }

    if snapshot.hosts.len() % block_size != 0 {
        return Err(Error::BlockSizeNotDivisible {
            host_count: snapshot.hosts.len(),
            block_size,
        });
    }

    let file_set: BTreeSet<&HostName> = ordered_hosts.iter().collect();
    let live_set: BTreeSet<&HostName> = snapshot.primary_addresses().collect();
    if file_set != live_set {
        return Err(Error::HostSetMismatch {
            diff: host_set_diff(&file_set, &live_set),
        });
    }

    let instances_per_host = uniform_primary_count(snapshot)?;
    debug!(
        hosts = ordered_hosts.len(),
        block_size, instances_per_host, "host list validated"
    );

    let hosts = ordered_hosts
        .iter()
        .enumerate()
        .map(|(idx, name)| Host {
            name: name.clone(),
            block: idx / block_size,
            position: idx % block_size + 1,
        })
        .collect();

    Ok(ValidatedInput {
        hosts,
        block_size,
        instances_per_host,
    })
}

/// Side-by-side listing of both sorted hostname sets, with `-` marking the
/// side a name is missing from
fn host_set_diff(file_set: &BTreeSet<&HostName>, live_set: &BTreeSet<&HostName>) -> String {
    let width = file_set
        .iter()
        .chain(live_set.iter())
        .map(|h| h.as_str().len())
        .max()
        .unwrap_or(0)
        .max("host file".len());

    let mut out = format!("{:width$}  cluster", "host file");
    for name in file_set.union(live_set) {
        let left = if file_set.contains(*name) {
            name.as_str()
        } else {
            "-"
        };
        let right = if live_set.contains(*name) {
            name.as_str()
        } else {
            "-"
        };
        out.push('\n');
        out.push_str(&format!("{left:width$}  {right}"));
    }
    out
}

/// The generator's contract assumes a uniform per-host primary count;
/// a skewed cluster is a consistency error, not an input we can plan for.
fn uniform_primary_count(snapshot: &TopologySnapshot) -> Result<usize> {
    let mut counts: Vec<(&HostName, usize)> = snapshot
        .hosts
        .iter()
        .map(|h| (&h.address, h.primary_count))
        .collect();
    counts.sort();

    let first = counts.first().map_or(0, |(_, c)| *c);
    if counts.iter().any(|(_, c)| *c != first) {
        let detail = counts
            .iter()
            .map(|(host, count)| format!("{host}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::UnevenSegmentCounts { detail });
    }
    Ok(first)
}
