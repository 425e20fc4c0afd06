//! Host list file parsing
//!
//! One hostname per line, blank lines ignored, surrounding whitespace
//! trimmed. Line order is load-bearing: it defines block membership.

use blockmirror_common::{Error, HostName, Result};
use std::path::Path;

/// Read the ordered host list from `path`
pub fn read_host_list(path: &Path) -> Result<Vec<HostName>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::host_file(format!("cannot read {}: {e}", path.display()))
    })?;

    let hosts: Vec<HostName> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(HostName::from)
        .collect();

    if hosts.is_empty() {
        return Err(Error::host_file(format!(
            "{} contains no hostnames",
            path.display()
        )));
    }
    Ok(hosts)
}
