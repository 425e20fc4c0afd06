//! Plan writer
//!
//! Serializes the resolved plan. The plan is staged inside the run's
//! scratch directory, then published beside the destination via an atomic
//! rename, so a half-written file never replaces a prior valid plan.

use crate::resolver::MirrorPlan;
use blockmirror_common::{Error, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Write the plan header and directives to `dest`.
///
/// The full serialization happens in `scratch_dir` first; `dest` only ever
/// sees a complete plan, installed with a rename.
pub fn write_plan(plan: &MirrorPlan, scratch_dir: &Path, dest: &Path) -> Result<()> {
    let staged = scratch_dir.join("mirror_plan.staged");
    let mut file = File::create(&staged)?;
    serialize(plan, &mut file)?;
    file.sync_all()?;

    publish(&staged, dest)?;
    info!(path = %dest.display(), directives = plan.directives.len(), "plan written");
    Ok(())
}

fn serialize(plan: &MirrorPlan, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", plan.header())?;
    for directive in &plan.directives {
        writeln!(out, "{}", directive.to_line())?;
    }
    Ok(())
}

/// Copy the staged plan into a temp file in the destination directory and
/// rename it into place
fn publish(staged: &Path, dest: &Path) -> Result<()> {
    let dest_dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp =
        NamedTempFile::new_in(dest_dir).map_err(|e| plan_write_error(dest, &e.to_string()))?;

    io::copy(&mut File::open(staged)?, tmp.as_file_mut())
        .map_err(|e| plan_write_error(dest, &e.to_string()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| plan_write_error(dest, &e.to_string()))?;

    tmp.persist(dest)
        .map(|_| ())
        .map_err(|e| plan_write_error(dest, &e.error.to_string()))
}

fn plan_write_error(dest: &Path, reason: &str) -> Error {
    Error::PlanWrite {
        path: dest.display().to_string(),
        reason: reason.to_string(),
    }
}
