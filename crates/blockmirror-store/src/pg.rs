//! Postgres topology store
//!
//! Reads the segment configuration, per-filespace storage locations, and
//! the filespace catalog. Queries are read-only and run once per plan run;
//! failures are fatal and never retried.

use async_trait::async_trait;
use blockmirror_common::{ContentId, Dbid, Error, FilespaceOid, HostName, Result, SegmentRole};
use blockmirror_topology::{Filespace, PrimaryHost, SegmentInstance, TopologyStore};
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use std::collections::BTreeMap;
use tracing::debug;

/// Name of the primary system filespace, excluded from the plan header
const SYSTEM_FILESPACE: &str = "pg_system";

/// Hosts carrying primary segments, coordinator excluded, with per-host
/// primary counts
const HOSTS_SQL: &str = "\
SELECT address, COUNT(*)::bigint AS primary_count \
FROM gp_segment_configuration \
WHERE role = 'p' AND content >= 0 \
GROUP BY address \
ORDER BY address";

/// Every primary and mirror row (with one row per filespace location) for
/// contents whose primary lives on one of the given hosts
const INSTANCES_SQL: &str = "\
SELECT c.dbid::int AS dbid, \
       c.content::int AS content, \
       c.role::text AS role, \
       c.address AS address, \
       c.port::int AS port, \
       COALESCE(c.replication_port, 0)::int AS replication_port, \
       e.fsefsoid::bigint AS fsefsoid, \
       e.fselocation AS fselocation \
FROM gp_segment_configuration c \
JOIN pg_filespace_entry e ON e.fsedbid = c.dbid \
WHERE c.content >= 0 \
  AND c.content IN ( \
      SELECT content FROM gp_segment_configuration \
      WHERE role = 'p' AND address = ANY($1) \
  ) \
ORDER BY c.dbid, e.fsefsoid";

/// The ordered filespace catalog
const FILESPACES_SQL: &str =
    "SELECT oid::bigint AS oid, fsname FROM pg_filespace ORDER BY oid";

/// `TopologyStore` backed by the cluster's Postgres catalog
pub struct PgTopologyStore {
    pool: PgPool,
}

impl PgTopologyStore {
    /// Create a lazily-connected store; connection errors surface on the
    /// first query
    pub fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(database_url)
            .map_err(|e| Error::store(format!("invalid database URL: {e}")))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopologyStore for PgTopologyStore {
    async fn fetch_hosts(&self) -> Result<Vec<PrimaryHost>> {
        let rows = sqlx::query(HOSTS_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        let hosts = rows
            .iter()
            .map(|row| {
                Ok(PrimaryHost {
                    address: HostName::new(row.try_get::<String, _>("address").map_err(store_error)?),
                    primary_count: usize::try_from(
                        row.try_get::<i64, _>("primary_count").map_err(store_error)?,
                    )
                    .map_err(|e| Error::store(e.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(hosts = hosts.len(), "fetched primary hosts");
        Ok(hosts)
    }

    async fn fetch_segment_instances(&self, hosts: &[HostName]) -> Result<Vec<SegmentInstance>> {
        let addresses: Vec<String> = hosts.iter().map(|h| h.as_str().to_string()).collect();
        let rows = sqlx::query(INSTANCES_SQL)
            .bind(&addresses)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        // one row per (dbid, filespace); fold into one instance per dbid
        let mut instances: BTreeMap<i32, SegmentInstance> = BTreeMap::new();
        for row in &rows {
            let dbid: i32 = row.try_get("dbid").map_err(store_error)?;
            let instance = match instances.entry(dbid) {
                std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::btree_map::Entry::Vacant(e) => e.insert(instance_from(row)?),
            };
            let oid: i64 = row.try_get("fsefsoid").map_err(store_error)?;
            let location: String = row.try_get("fselocation").map_err(store_error)?;
            instance.locations.insert(
                FilespaceOid::new(u32::try_from(oid).map_err(|e| Error::store(e.to_string()))?),
                location,
            );
        }

        debug!(instances = instances.len(), "fetched segment instances");
        Ok(instances.into_values().collect())
    }

    async fn fetch_filespaces(&self) -> Result<Vec<Filespace>> {
        let rows = sqlx::query(FILESPACES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.iter()
            .map(|row| {
                let oid: i64 = row.try_get("oid").map_err(store_error)?;
                let name: String = row.try_get("fsname").map_err(store_error)?;
                Ok(Filespace {
                    oid: FilespaceOid::new(
                        u32::try_from(oid).map_err(|e| Error::store(e.to_string()))?,
                    ),
                    is_system: name == SYSTEM_FILESPACE,
                    name,
                })
            })
            .collect()
    }
}

fn instance_from(row: &PgRow) -> Result<SegmentInstance> {
    let role: String = row.try_get("role").map_err(store_error)?;
    let port: i32 = row.try_get("port").map_err(store_error)?;
    let replication_port: i32 = row.try_get("replication_port").map_err(store_error)?;

    Ok(SegmentInstance {
        dbid: Dbid::new(row.try_get::<i32, _>("dbid").map_err(store_error)?),
        content: ContentId::new(row.try_get::<i32, _>("content").map_err(store_error)?),
        role: if role == "p" {
            SegmentRole::Primary
        } else {
            SegmentRole::Mirror
        },
        address: HostName::new(row.try_get::<String, _>("address").map_err(store_error)?),
        port: u16::try_from(port).map_err(|e| Error::store(e.to_string()))?,
        replication_port: u16::try_from(replication_port)
            .map_err(|e| Error::store(e.to_string()))?,
        locations: BTreeMap::new(),
    })
}

fn store_error(e: impl std::fmt::Display) -> Error {
    Error::store(e.to_string())
}
