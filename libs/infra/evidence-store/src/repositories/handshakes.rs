// [libs/infra/evidence-store/src/repositories/handshakes.rs]
use crate::client::EvidenceStoreClient;
use crate::errors::EvidenceStoreError;
use chrono::Utc;
use libsql::{params, Row};
use pendonn_domain_models::{Handshake, HandshakeQuality, HandshakeStatus};
use tracing::instrument;

pub struct HandshakeRepository {
    client: EvidenceStoreClient,
}

impl HandshakeRepository {
    pub fn new(client: EvidenceStoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn insert_handshake(
        &self,
        network_id: i64,
        bssid: &str,
        ssid: &str,
        file_path: &str,
        quality: HandshakeQuality,
    ) -> Result<i64, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let now = Utc::now().to_rfc3339();

        connection
            .execute(
                r#"
                INSERT INTO handshakes (network_id, bssid, ssid, file_path, capture_date, status, quality)
                VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)
                "#,
                params![network_id, bssid, ssid, file_path, now, quality.as_str()],
            )
            .await?;

        let mut rows = connection.query("SELECT last_insert_rowid()", ()).await?;
        let row = rows.next().await?.ok_or_else(|| EvidenceStoreError::MappingError("insert_handshake produced no id".into()))?;
        Ok(row.get(0)?)
    }

    /// All `pending` rows, oldest capture first — the order the crack pool
    /// drains them in.
    pub async fn pending_handshakes(&self) -> Result<Vec<Handshake>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                r#"
                SELECT id, network_id, bssid, ssid, file_path, capture_date, status, quality
                FROM handshakes WHERE status = 'pending' ORDER BY capture_date ASC
                "#,
                (),
            )
            .await?;
        let mut handshakes = Vec::new();
        while let Some(row) = rows.next().await? {
            handshakes.push(map_row(row)?);
        }
        Ok(handshakes)
    }

    /// Every row regardless of status — used by `export_snapshot`, not by
    /// the crack pool (which only ever wants `pending_handshakes`).
    pub async fn list_all(&self) -> Result<Vec<Handshake>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, network_id, bssid, ssid, file_path, capture_date, status, quality FROM handshakes ORDER BY capture_date ASC",
                (),
            )
            .await?;
        let mut handshakes = Vec::new();
        while let Some(row) = rows.next().await? {
            handshakes.push(map_row(row)?);
        }
        Ok(handshakes)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Handshake>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, network_id, bssid, ssid, file_path, capture_date, status, quality FROM handshakes WHERE id = ?1",
                params![id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    /// Enforces the DAG from `HandshakeStatus::can_transition_to`; any other
    /// edge is an `InvalidStatusTransition`.
    #[instrument(skip(self))]
    pub async fn set_handshake_status(&self, id: i64, next: HandshakeStatus) -> Result<(), EvidenceStoreError> {
        let current = self
            .get(id)
            .await?
            .ok_or(EvidenceStoreError::HandshakeNotFound(id))?
            .status;

        if !current.can_transition_to(next) {
            return Err(EvidenceStoreError::InvalidStatusTransition {
                from: current.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let connection = self.client.connection()?;
        connection
            .execute("UPDATE handshakes SET status = ?2 WHERE id = ?1", params![id, next.as_str()])
            .await?;
        Ok(())
    }

    /// Short-circuit for re-capture and re-crack: the password already on
    /// file for this bssid, if any.
    pub async fn key_for(&self, bssid: &str) -> Result<Option<String>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection.query("SELECT password FROM cracked_keys WHERE bssid = ?1", params![bssid]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }
}

fn map_row(row: Row) -> Result<Handshake, EvidenceStoreError> {
    let status_raw: String = row.get(6)?;
    let quality_raw: String = row.get(7)?;
    let capture_date: String = row.get(5)?;

    Ok(Handshake {
        id: row.get(0)?,
        network_id: row.get(1)?,
        bssid: row.get(2)?,
        ssid: row.get(3)?,
        file_path: row.get(4)?,
        capture_date: capture_date.parse().map_err(|e| EvidenceStoreError::MappingError(format!("capture_date: {e}")))?,
        status: HandshakeStatus::parse(&status_raw)
            .ok_or_else(|| EvidenceStoreError::MappingError(format!("unknown handshake status '{status_raw}'")))?,
        quality: HandshakeQuality::parse(&quality_raw),
    })
}
