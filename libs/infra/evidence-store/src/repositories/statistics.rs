// [libs/infra/evidence-store/src/repositories/statistics.rs]
use crate::client::EvidenceStoreClient;
use crate::errors::EvidenceStoreError;
use pendonn_domain_models::Statistics;

pub struct StatisticsRepository {
    client: EvidenceStoreClient,
}

impl StatisticsRepository {
    pub fn new(client: EvidenceStoreClient) -> Self {
        Self { client }
    }

    /// Aggregate counts by category, for the status heartbeat and the
    /// dashboard's read-only summary panel.
    pub async fn statistics(&self) -> Result<Statistics, EvidenceStoreError> {
        let connection = self.client.connection()?;

        Ok(Statistics {
            networks_total: scalar_count(&connection, "SELECT COUNT(*) FROM networks").await?,
            networks_whitelisted: scalar_count(&connection, "SELECT COUNT(*) FROM networks WHERE is_whitelisted = 1").await?,
            handshakes_pending: scalar_count(&connection, "SELECT COUNT(*) FROM handshakes WHERE status = 'pending'").await?,
            handshakes_cracking: scalar_count(&connection, "SELECT COUNT(*) FROM handshakes WHERE status = 'cracking'").await?,
            handshakes_cracked: scalar_count(&connection, "SELECT COUNT(*) FROM handshakes WHERE status = 'cracked'").await?,
            handshakes_failed: scalar_count(&connection, "SELECT COUNT(*) FROM handshakes WHERE status = 'failed'").await?,
            cracked_keys_total: scalar_count(&connection, "SELECT COUNT(*) FROM cracked_keys").await?,
            scans_running: scalar_count(&connection, "SELECT COUNT(*) FROM scans WHERE status = 'running'").await?,
            scans_completed: scalar_count(&connection, "SELECT COUNT(*) FROM scans WHERE status = 'completed'").await?,
            scans_failed: scalar_count(&connection, "SELECT COUNT(*) FROM scans WHERE status = 'failed'").await?,
            vulnerabilities_total: scalar_count(&connection, "SELECT COUNT(*) FROM vulnerabilities").await?,
        })
    }
}

async fn scalar_count(connection: &libsql::Connection, sql: &str) -> Result<i64, EvidenceStoreError> {
    let mut rows = connection.query(sql, ()).await?;
    let row = rows.next().await?.ok_or_else(|| EvidenceStoreError::MappingError(format!("no row from '{sql}'")))?;
    Ok(row.get(0)?)
}
