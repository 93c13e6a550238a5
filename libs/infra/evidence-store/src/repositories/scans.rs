// [libs/infra/evidence-store/src/repositories/scans.rs]
use crate::client::EvidenceStoreClient;
use crate::errors::EvidenceStoreError;
use chrono::Utc;
use libsql::{params, Row};
use pendonn_domain_models::{Scan, ScanStatus, ScanType};
use tracing::instrument;

pub struct ScanRepository {
    client: EvidenceStoreClient,
}

impl ScanRepository {
    pub fn new(client: EvidenceStoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn insert_scan(&self, network_id: i64, bssid: &str, ssid: &str, scan_type: ScanType) -> Result<i64, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let now = Utc::now().to_rfc3339();

        connection
            .execute(
                r#"
                INSERT INTO scans (network_id, bssid, ssid, scan_type, start_time, status)
                VALUES (?1, ?2, ?3, ?4, ?5, 'running')
                ON CONFLICT(bssid, scan_type) DO UPDATE SET
                    start_time = excluded.start_time,
                    status = 'running',
                    end_time = NULL
                "#,
                params![network_id, bssid, ssid, scan_type.as_str(), now],
            )
            .await?;

        let mut rows = connection
            .query("SELECT id FROM scans WHERE bssid = ?1 AND scan_type = ?2", params![bssid, scan_type.as_str()])
            .await?;
        let row = rows.next().await?.ok_or_else(|| EvidenceStoreError::MappingError("insert_scan produced no row".into()))?;
        Ok(row.get(0)?)
    }

    #[instrument(skip(self, results))]
    pub async fn update_scan(
        &self,
        id: i64,
        status: ScanStatus,
        results: Option<serde_json::Value>,
        vulnerabilities_found: i64,
    ) -> Result<(), EvidenceStoreError> {
        let connection = self.client.connection()?;
        let now = Utc::now().to_rfc3339();
        let results_text = match results {
            Some(value) => Some(serde_json::to_string(&value)?),
            None => None,
        };

        connection
            .execute(
                "UPDATE scans SET status = ?2, end_time = ?3, results = ?4, vulnerabilities_found = ?5 WHERE id = ?1",
                params![id, status.as_str(), now, results_text, vulnerabilities_found],
            )
            .await?;
        Ok(())
    }

    /// True once a `completed` Scan row exists for (bssid, scan_type) —
    /// the idempotence gate the enumeration phase checks before re-running.
    pub async fn has_completed_scan(&self, bssid: &str, scan_type: ScanType) -> Result<bool, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id FROM scans WHERE bssid = ?1 AND scan_type = ?2 AND status = 'completed'",
                params![bssid, scan_type.as_str()],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    pub async fn list_all(&self) -> Result<Vec<Scan>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, network_id, ssid, scan_type, start_time, end_time, status, results, vulnerabilities_found FROM scans ORDER BY start_time DESC",
                (),
            )
            .await?;
        let mut scans = Vec::new();
        while let Some(row) = rows.next().await? {
            scans.push(map_row(row)?);
        }
        Ok(scans)
    }
}

fn map_row(row: Row) -> Result<Scan, EvidenceStoreError> {
    let scan_type_raw: String = row.get(3)?;
    let status_raw: String = row.get(6)?;
    let start_time: String = row.get(4)?;
    let end_time: Option<String> = row.get(5)?;
    let results_raw: Option<String> = row.get(7)?;

    Ok(Scan {
        id: row.get(0)?,
        network_id: row.get(1)?,
        ssid: row.get(2)?,
        scan_type: ScanType::parse(&scan_type_raw)
            .ok_or_else(|| EvidenceStoreError::MappingError(format!("unknown scan_type '{scan_type_raw}'")))?,
        start_time: start_time.parse().map_err(|e| EvidenceStoreError::MappingError(format!("start_time: {e}")))?,
        end_time: end_time
            .map(|raw| raw.parse().map_err(|e| EvidenceStoreError::MappingError(format!("end_time: {e}"))))
            .transpose()?,
        status: ScanStatus::parse(&status_raw).ok_or_else(|| EvidenceStoreError::MappingError(format!("unknown scan status '{status_raw}'")))?,
        results: results_raw.map(|raw| serde_json::from_str(&raw)).transpose()?,
        vulnerabilities_found: row.get(8)?,
    })
}
