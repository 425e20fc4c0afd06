//! Run orchestration
//!
//! One `PlanRun` owns the scratch resources of a single invocation and
//! drives the pipeline: capture snapshot, validate, rotate, resolve, write.
//! Dropping the run removes all scratch state on every exit path.

use crate::resolver::{MirrorPlan, resolve_segments};
use crate::rotation::assign_partners;
use crate::validate::validate;
use crate::writer::write_plan;
use blockmirror_common::{HostName, Result};
use blockmirror_topology::{TopologyStore, capture_snapshot};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// Per-run context owning scratch state, torn down deterministically on
/// drop regardless of how the run ends
pub struct PlanRun {
    scratch: TempDir,
}

impl PlanRun {
    /// Create a run with a fresh scratch directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            scratch: TempDir::new()?,
        })
    }

    /// Scratch directory for intermediate files, private to this run
    #[must_use]
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Compute the relocation plan without writing it.
    ///
    /// Any violated invariant aborts before a single directive is produced;
    /// a partially-resolved plan is never returned.
    pub async fn plan(
        &self,
        store: &dyn TopologyStore,
        ordered_hosts: &[HostName],
        block_size: usize,
    ) -> Result<MirrorPlan> {
        let snapshot = capture_snapshot(store).await?;
        let input = validate(ordered_hosts, block_size, &snapshot)?;
        info!(
            hosts = input.hosts.len(),
            blocks = input.hosts.len() / input.block_size,
            instances_per_host = input.instances_per_host,
            "input validated"
        );

        let assignment = assign_partners(&input);
        resolve_segments(&input, &assignment, &snapshot)
    }

    /// Compute the plan and write it to `output`, returning the plan path
    pub async fn execute(
        &self,
        store: &dyn TopologyStore,
        ordered_hosts: &[HostName],
        block_size: usize,
        output: &Path,
    ) -> Result<PathBuf> {
        let plan = self.plan(store, ordered_hosts, block_size).await?;
        write_plan(&plan, self.scratch_path(), output)?;
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmirror_common::{ContentId, Dbid, Error, FilespaceOid, SegmentRole};
    use blockmirror_topology::{
        Filespace, InMemoryTopology, PrimaryHost, SegmentInstance, TopologySnapshot,
    };
    use std::collections::BTreeMap;

    /// Eight hosts in two blocks of four, one segment per host, mirrors
    /// currently spread one host to the right outside the block pattern
    fn eight_host_cluster() -> InMemoryTopology {
        let mut instances = Vec::new();
        for idx in 0..8i32 {
            let host = format!("h{}", idx + 1);
            // spread layout: mirror of content i sits on host (i+4) % 8 + 1
            let mirror_host = format!("h{}", (idx + 4) % 8 + 1);
            instances.push(SegmentInstance {
                dbid: Dbid::new(idx + 2),
                content: ContentId::new(idx),
                role: SegmentRole::Primary,
                address: host.as_str().into(),
                port: 40000,
                replication_port: 41000,
                locations: BTreeMap::from([(
                    FilespaceOid::new(3052),
                    format!("/data/primary/seg{idx}"),
                )]),
            });
            instances.push(SegmentInstance {
                dbid: Dbid::new(idx + 10),
                content: ContentId::new(idx),
                role: SegmentRole::Mirror,
                address: mirror_host.as_str().into(),
                port: 50000 + idx as u16,
                replication_port: 51000 + idx as u16,
                locations: BTreeMap::from([(
                    FilespaceOid::new(3052),
                    format!("/data/mirror/seg{idx}"),
                )]),
            });
        }

        InMemoryTopology::new(TopologySnapshot {
            hosts: (1..=8)
                .map(|i| PrimaryHost {
                    address: format!("h{i}").as_str().into(),
                    primary_count: 1,
                })
                .collect(),
            instances,
            filespaces: vec![Filespace {
                oid: FilespaceOid::new(3052),
                name: "pg_system".into(),
                is_system: true,
            }],
        })
    }

    fn host_list() -> Vec<HostName> {
        (1..=8).map(|i| format!("h{i}").as_str().into()).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_block_rotation() {
        let store = eight_host_cluster();
        let run = PlanRun::new().unwrap();
        let plan = run.plan(&store, &host_list(), 4).await.unwrap();

        // no user filespaces, so the header declares an empty ordering
        assert_eq!(plan.header(), "filespaceOrder=");

        // h1->h2, h2->h3, h3->h4, h4->h1, then the same shifted into block 2
        let targets: Vec<&str> = plan
            .directives
            .iter()
            .map(|d| d.new_address.as_str())
            .collect();
        assert_eq!(targets, vec!["h2", "h3", "h4", "h1", "h6", "h7", "h8", "h5"]);

        assert_eq!(
            plan.directives[0].to_line(),
            "h5:50000:/data/mirror/seg0 h2:50000:51000:/data/mirror/seg0"
        );
    }

    #[tokio::test]
    async fn test_execute_writes_plan_file() {
        let store = eight_host_cluster();
        let run = PlanRun::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("mirror_plan");

        let written = run.execute(&store, &host_list(), 4, &dest).await.unwrap();
        assert_eq!(written, dest);

        let contents = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(contents.lines().count(), 9); // header + 8 directives
        assert!(contents.starts_with("filespaceOrder=\n"));
    }

    #[tokio::test]
    async fn test_validation_failure_aborts_before_resolution() {
        let store = eight_host_cluster();
        let run = PlanRun::new().unwrap();
        let err = run.plan(&store, &host_list(), 3).await.unwrap_err();
        assert!(matches!(
            err,
            Error::BlockSizeNotDivisible {
                host_count: 8,
                block_size: 3
            }
        ));
    }
}
