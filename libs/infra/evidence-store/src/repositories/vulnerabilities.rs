// [libs/infra/evidence-store/src/repositories/vulnerabilities.rs]
use crate::client::EvidenceStoreClient;
use crate::errors::EvidenceStoreError;
use chrono::Utc;
use libsql::{params, Row};
use pendonn_domain_models::{Severity, Vulnerability};
use tracing::instrument;

pub struct VulnerabilityRepository {
    client: EvidenceStoreClient,
}

impl VulnerabilityRepository {
    pub fn new(client: EvidenceStoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, description))]
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_vulnerability(
        &self,
        scan_id: i64,
        host: &str,
        port: Option<u16>,
        service: &str,
        vuln_type: &str,
        severity: Severity,
        description: &str,
        plugin_name: &str,
    ) -> Result<i64, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let now = Utc::now().to_rfc3339();

        connection
            .execute(
                r#"
                INSERT INTO vulnerabilities (scan_id, host, port, service, vuln_type, severity, description, plugin_name, discovered_date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![scan_id, host, port.map(|p| p as i64), service, vuln_type, severity.as_str(), description, plugin_name, now],
            )
            .await?;

        let mut rows = connection.query("SELECT last_insert_rowid()", ()).await?;
        let row = rows.next().await?.ok_or_else(|| EvidenceStoreError::MappingError("insert_vulnerability produced no id".into()))?;
        Ok(row.get(0)?)
    }

    pub async fn list_for_scan(&self, scan_id: i64) -> Result<Vec<Vulnerability>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, scan_id, host, port, service, vuln_type, severity, description, plugin_name, discovered_date FROM vulnerabilities WHERE scan_id = ?1",
                params![scan_id],
            )
            .await?;
        let mut vulnerabilities = Vec::new();
        while let Some(row) = rows.next().await? {
            vulnerabilities.push(map_row(row)?);
        }
        Ok(vulnerabilities)
    }

    pub async fn list_all(&self) -> Result<Vec<Vulnerability>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, scan_id, host, port, service, vuln_type, severity, description, plugin_name, discovered_date FROM vulnerabilities ORDER BY discovered_date DESC",
                (),
            )
            .await?;
        let mut vulnerabilities = Vec::new();
        while let Some(row) = rows.next().await? {
            vulnerabilities.push(map_row(row)?);
        }
        Ok(vulnerabilities)
    }
}

fn map_row(row: Row) -> Result<Vulnerability, EvidenceStoreError> {
    let port: Option<i64> = row.get(3)?;
    let severity_raw: String = row.get(6)?;
    let discovered_date: String = row.get(9)?;

    Ok(Vulnerability {
        id: row.get(0)?,
        scan_id: row.get(1)?,
        host: row.get(2)?,
        port: port.map(|p| p as u16),
        service: row.get(4)?,
        vuln_type: row.get(5)?,
        severity: Severity::parse(&severity_raw),
        description: row.get(7)?,
        plugin_name: row.get(8)?,
        discovered_date: discovered_date.parse().map_err(|e| EvidenceStoreError::MappingError(format!("discovered_date: {e}")))?,
    })
}
