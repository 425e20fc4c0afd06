//! Block rotation assignment
//!
//! Derives, for every host, a deterministic round-robin sequence of mirror
//! partners drawn only from the host's own block. The rotation is the whole
//! of the placement policy: no weights, no hashing, just a cursor walking
//! the block and skipping the host itself.

use crate::validate::{Host, ValidatedInput};
use blockmirror_common::HostName;

/// Rotating cursor over partner positions `1..=block_size`.
///
/// First use starts at the position after the host's own (wrapping past the
/// end of the block back to 1); every later lap starts at 1. The cursor
/// itself knows nothing about self-assignment; the caller skips the host's
/// own position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationCursor {
    position: usize,
    lap: usize,
}

impl RotationCursor {
    /// Position the cursor for the host at `own_position` (1-based) in a
    /// block of `block_size`
    #[must_use]
    pub const fn new(own_position: usize, block_size: usize) -> Self {
        let position = if own_position == block_size {
            1
        } else {
            own_position + 1
        };
        Self { position, lap: 0 }
    }

    /// Current lap count (0 until the cursor first wraps)
    #[must_use]
    pub const fn lap(&self) -> usize {
        self.lap
    }

    /// Advance to the next partner position, skipping `own_position`.
    ///
    /// Wrapping past `block_size` returns the cursor to position 1 and
    /// starts the next lap. Requires `block_size >= 2` (guaranteed by the
    /// validation gate), so a position other than `own_position` always
    /// exists.
    pub fn step(&mut self, own_position: usize, block_size: usize) -> usize {
        loop {
            let candidate = self.position;
            if self.position == block_size {
                self.position = 1;
                self.lap += 1;
            } else {
                self.position += 1;
            }
            if candidate != own_position {
                return candidate;
            }
        }
    }
}

/// One host-level mirror assignment: `host`'s segment at this sequence
/// position gets `partner` as its new mirror target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorPair {
    /// Host whose segment is being assigned a new mirror target
    pub host: HostName,
    /// The block-local host that will mirror it
    pub partner: HostName,
}

/// Produce the raw host-level mirror map: one `(host, partner)` pair per
/// segment instance, in host-block order.
///
/// For each host the partner sequence has exactly `instances_per_host`
/// entries, all drawn from the host's own block and never the host itself.
/// The output is fully determined by the validated input, so re-running on
/// identical inputs yields an identical sequence.
#[must_use]
pub fn assign_partners(input: &ValidatedInput) -> Vec<MirrorPair> {
    let mut pairs = Vec::with_capacity(input.hosts.len() * input.instances_per_host);

    for host in &input.hosts {
        let block = block_members(input, host.block);
        let mut cursor = RotationCursor::new(host.position, input.block_size);
        for _ in 0..input.instances_per_host {
            let position = cursor.step(host.position, input.block_size);
            pairs.push(MirrorPair {
                host: host.name.clone(),
                partner: block[position - 1].name.clone(),
            });
        }
    }

    pairs
}

/// The hosts of block `block`, in position order
fn block_members(input: &ValidatedInput, block: usize) -> &[Host] {
    let start = block * input.block_size;
    &input.hosts[start..start + input.block_size]
}
