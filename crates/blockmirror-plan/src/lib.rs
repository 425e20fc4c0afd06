//! Blockmirror Plan - block-rotation mirror planning
//!
//! This crate turns an ordered host list and a live topology snapshot into
//! a relocation plan that moves every segment mirror onto a host inside the
//! same block (a fixed-size contiguous group of hosts, typically one rack).
//!
//! # Pipeline
//!
//! ```text
//! ValidationGate -> BlockAssignmentGenerator -> SegmentMappingResolver -> PlanWriter
//! ```
//!
//! The validation gate checks the host file against the live cluster; the
//! generator derives a deterministic round-robin partner sequence per host;
//! the resolver joins that sequence against segment placement to produce
//! one relocation directive per mirror that must move; the writer publishes
//! the plan atomically.
//!
//! # Example
//! ```ignore
//! use blockmirror_plan::PlanRun;
//!
//! let run = PlanRun::new()?;
//! let path = run.execute(&store, &hosts, 4, Path::new("mirror_plan")).await?;
//! ```

pub mod resolver;
pub mod rotation;
pub mod run;
pub mod validate;
pub mod writer;

pub use resolver::{MirrorPlan, RelocationDirective, resolve_segments};
pub use rotation::{MirrorPair, RotationCursor, assign_partners};
pub use run::PlanRun;
pub use validate::{Host, ValidatedInput, validate};
pub use writer::write_plan;
