//! Segment mapping resolver
//!
//! Joins the host-level mirror map against the live topology snapshot and
//! produces one relocation directive per segment whose mirror actually has
//! to move. Serialization orderings here are load-bearing: the downstream
//! rebalancer consumes the plan byte-for-byte.

use crate::rotation::MirrorPair;
use crate::validate::ValidatedInput;
use blockmirror_common::{ContentId, Error, HostName, Result};
use blockmirror_topology::{SegmentInstance, TopologySnapshot};
use tracing::{debug, info};

/// One relocation line: move the mirror described by `current_location`
/// onto `new_address`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelocationDirective {
    /// Content id of the segment being moved
    pub content: ContentId,
    /// Serialized current mirror: `host:port:path[:path...]`
    pub current_location: String,
    /// The block partner taking the mirror over
    pub new_address: HostName,
    /// Serialized new mirror minus the address slot:
    /// `:port:replication_port:path[:path...]`
    pub new_location: String,
}

impl RelocationDirective {
    /// Render the directive as one plan line
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{} {}{}",
            self.current_location, self.new_address, self.new_location
        )
    }
}

/// The resolved plan: filespace ordering header plus relocation directives
/// in per-host sequence order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MirrorPlan {
    /// Non-system filespace names, in catalog order
    pub filespace_order: Vec<String>,
    /// Directives for every mirror that must move
    pub directives: Vec<RelocationDirective>,
}

impl MirrorPlan {
    /// The plan header line declaring the filespace ordering
    #[must_use]
    pub fn header(&self) -> String {
        format!("filespaceOrder={}", self.filespace_order.join(":"))
    }
}

/// Turn the host-level mirror map into segment-level relocation directives.
///
/// For each host in file order, that host's primary segments (ordered by
/// filespace identifier then content id) pair positionally with the host's
/// partner sequence. A directive is emitted only when the assigned partner
/// differs from the segment's current mirror host; correctly-placed mirrors
/// are silently omitted. Output order is the per-host sequence order, never
/// re-sorted.
pub fn resolve_segments(
    input: &ValidatedInput,
    assignment: &[MirrorPair],
    snapshot: &TopologySnapshot,
) -> Result<MirrorPlan> {
    let mut directives = Vec::new();
    let mut already_placed = 0usize;

    for (host_idx, host) in input.hosts.iter().enumerate() {
        let primaries = snapshot.primaries_on(&host.name);
        if primaries.is_empty() {
            return Err(Error::HostNotFound(host.name.clone()));
        }
        if primaries.len() != input.instances_per_host {
            return Err(Error::internal(format!(
                "host {} lists {} primary segments, validation saw {}",
                host.name,
                primaries.len(),
                input.instances_per_host
            )));
        }

        for (seq, segment) in primaries.iter().enumerate() {
            let pair = &assignment[host_idx * input.instances_per_host + seq];
            debug_assert_eq!(pair.host, host.name);

            let mirror = snapshot
                .mirror_of(segment.content)
                .ok_or(Error::MirrorNotFound(segment.content))?;

            let current_location = current_mirror_location(mirror);
            // the segment already sits on its assigned block partner
            if current_location.starts_with(&format!("{}:", pair.partner)) {
                already_placed += 1;
                debug!(content = %segment.content, partner = %pair.partner, "mirror already in place");
                continue;
            }

            directives.push(RelocationDirective {
                content: segment.content,
                current_location,
                new_address: pair.partner.clone(),
                new_location: new_mirror_location(mirror),
            });
        }
    }

    info!(
        directives = directives.len(),
        already_placed, "segment mapping resolved"
    );

    Ok(MirrorPlan {
        filespace_order: snapshot
            .user_filespace_names()
            .map(str::to_string)
            .collect(),
        directives,
    })
}

/// `host:port:path[:path...]`, locations in filespace-oid-descending order
fn current_mirror_location(mirror: &SegmentInstance) -> String {
    let mut out = format!("{}:{}", mirror.address, mirror.port);
    for (_, path) in mirror.locations_desc() {
        out.push(':');
        out.push_str(path);
    }
    out
}

/// `:port:replication_port:path[:path...]` — the address slot is filled by
/// the host join. Ports are kept from the mirror's own row; only the
/// hosting address and storage paths move.
fn new_mirror_location(mirror: &SegmentInstance) -> String {
    let mut out = format!(":{}:{}", mirror.port, mirror.replication_port);
    for (_, path) in mirror.locations_desc() {
        out.push(':');
        out.push_str(path);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::assign_partners;
    use crate::validate::Host;
    use blockmirror_common::{Dbid, FilespaceOid, SegmentRole};
    use blockmirror_topology::{Filespace, PrimaryHost};
    use std::collections::BTreeMap;

    const FS_SYSTEM: u32 = 3052;
    const FS_FAST: u32 = 17000;

    fn segment(
        dbid: i32,
        content: i32,
        role: SegmentRole,
        host: &str,
        port: u16,
    ) -> SegmentInstance {
        SegmentInstance {
            dbid: Dbid::new(dbid),
            content: ContentId::new(content),
            role,
            address: HostName::new(host),
            port,
            replication_port: port + 1000,
            locations: BTreeMap::from([
                (FilespaceOid::new(FS_SYSTEM), format!("/data/seg{dbid}")),
                (FilespaceOid::new(FS_FAST), format!("/fast/seg{dbid}")),
            ]),
        }
    }

    fn validated(names: &[&str], block_size: usize, instances_per_host: usize) -> ValidatedInput {
        ValidatedInput {
            hosts: names
                .iter()
                .enumerate()
                .map(|(idx, name)| Host {
                    name: HostName::new(*name),
                    block: idx / block_size,
                    position: idx % block_size + 1,
                })
                .collect(),
            block_size,
            instances_per_host,
        }
    }

    fn filespaces() -> Vec<Filespace> {
        vec![
            Filespace {
                oid: FilespaceOid::new(FS_SYSTEM),
                name: "pg_system".into(),
                is_system: true,
            },
            Filespace {
                oid: FilespaceOid::new(FS_FAST),
                name: "fast_disk".into(),
                is_system: false,
            },
        ]
    }

    /// Two hosts in one block, one segment each, mirrors currently spread
    /// onto hosts outside the block
    fn spread_snapshot() -> TopologySnapshot {
        TopologySnapshot {
            hosts: vec![
                PrimaryHost {
                    address: HostName::new("h1"),
                    primary_count: 1,
                },
                PrimaryHost {
                    address: HostName::new("h2"),
                    primary_count: 1,
                },
            ],
            instances: vec![
                segment(2, 0, SegmentRole::Primary, "h1", 40000),
                segment(3, 1, SegmentRole::Primary, "h2", 40000),
                segment(4, 0, SegmentRole::Mirror, "old1", 50000),
                segment(5, 1, SegmentRole::Mirror, "old2", 50001),
            ],
            filespaces: filespaces(),
        }
    }

    #[test]
    fn test_emits_directive_per_moving_mirror() {
        let input = validated(&["h1", "h2"], 2, 1);
        let assignment = assign_partners(&input);
        let plan = resolve_segments(&input, &assignment, &spread_snapshot()).unwrap();

        assert_eq!(plan.header(), "filespaceOrder=fast_disk");
        assert_eq!(plan.directives.len(), 2);
        // fast_disk (oid 17000) precedes pg_system (oid 3052) in the
        // descending location concatenation
        assert_eq!(
            plan.directives[0].to_line(),
            "old1:50000:/fast/seg4:/data/seg4 h2:50000:51000:/fast/seg4:/data/seg4"
        );
        assert_eq!(
            plan.directives[1].to_line(),
            "old2:50001:/fast/seg5:/data/seg5 h1:50001:51001:/fast/seg5:/data/seg5"
        );
    }

    #[test]
    fn test_skips_mirror_already_on_assigned_partner() {
        let mut snapshot = spread_snapshot();
        // content 0 is assigned h2 and its mirror already lives there
        snapshot.instances[2].address = HostName::new("h2");

        let input = validated(&["h1", "h2"], 2, 1);
        let assignment = assign_partners(&input);
        let plan = resolve_segments(&input, &assignment, &snapshot).unwrap();

        assert_eq!(plan.directives.len(), 1);
        assert_eq!(plan.directives[0].content, ContentId::new(1));
    }

    #[test]
    fn test_directive_count_bounded_by_instances() {
        let input = validated(&["h1", "h2"], 2, 1);
        let assignment = assign_partners(&input);
        let snapshot = spread_snapshot();
        let plan = resolve_segments(&input, &assignment, &snapshot).unwrap();
        let primary_total: usize = snapshot.hosts.iter().map(|h| h.primary_count).sum();
        assert!(plan.directives.len() <= primary_total);
    }

    #[test]
    fn test_output_follows_per_host_sequence_not_content_order() {
        // h1 hosts contents 2 and 3, h2 hosts 0 and 1; output must walk
        // h1's sequence first even though h2's content ids sort lower
        let snapshot = TopologySnapshot {
            hosts: vec![
                PrimaryHost {
                    address: HostName::new("h1"),
                    primary_count: 2,
                },
                PrimaryHost {
                    address: HostName::new("h2"),
                    primary_count: 2,
                },
            ],
            instances: vec![
                segment(2, 2, SegmentRole::Primary, "h1", 40000),
                segment(3, 3, SegmentRole::Primary, "h1", 40001),
                segment(4, 0, SegmentRole::Primary, "h2", 40000),
                segment(5, 1, SegmentRole::Primary, "h2", 40001),
                segment(6, 2, SegmentRole::Mirror, "old1", 50000),
                segment(7, 3, SegmentRole::Mirror, "old1", 50001),
                segment(8, 0, SegmentRole::Mirror, "old2", 50000),
                segment(9, 1, SegmentRole::Mirror, "old2", 50001),
            ],
            filespaces: filespaces(),
        };

        let input = validated(&["h1", "h2"], 2, 2);
        let assignment = assign_partners(&input);
        let plan = resolve_segments(&input, &assignment, &snapshot).unwrap();

        let contents: Vec<i32> = plan.directives.iter().map(|d| d.content.value()).collect();
        assert_eq!(contents, vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_missing_mirror_is_fatal() {
        let mut snapshot = spread_snapshot();
        snapshot.instances.remove(3);

        let input = validated(&["h1", "h2"], 2, 1);
        let assignment = assign_partners(&input);
        let err = resolve_segments(&input, &assignment, &snapshot).unwrap_err();
        assert!(matches!(err, Error::MirrorNotFound(c) if c == ContentId::new(1)));
    }
}
