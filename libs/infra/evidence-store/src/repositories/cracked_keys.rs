// [libs/infra/evidence-store/src/repositories/cracked_keys.rs]
use crate::client::EvidenceStoreClient;
use crate::errors::EvidenceStoreError;
use crate::repositories::snapshot::CrackedKeyRow;
use chrono::Utc;
use libsql::params;
use tracing::instrument;

pub struct CrackedKeyRepository {
    client: EvidenceStoreClient,
}

impl CrackedKeyRepository {
    pub fn new(client: EvidenceStoreClient) -> Self {
        Self { client }
    }

    /// Inserts the recovered key and transitions the owning handshake to
    /// `cracked` in the same transaction (§4.B). At most one row per bssid —
    /// the first success suppresses further attempts.
    #[instrument(skip(self, password))]
    pub async fn insert_cracked_key(
        &self,
        handshake_id: i64,
        bssid: &str,
        ssid: &str,
        password: &str,
        engine: &str,
        crack_time_seconds: i64,
    ) -> Result<i64, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let transaction = connection.transaction().await?;
        let now = Utc::now().to_rfc3339();

        transaction
            .execute(
                r#"
                INSERT INTO cracked_keys (handshake_id, bssid, ssid, password, engine, crack_time_seconds, cracked_date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(bssid) DO NOTHING
                "#,
                params![handshake_id, bssid, ssid, password, engine, crack_time_seconds, now.clone()],
            )
            .await?;

        transaction
            .execute(
                "UPDATE handshakes SET status = 'cracked' WHERE id = ?1 AND status = 'cracking'",
                params![handshake_id],
            )
            .await?;

        let mut rows = transaction.query("SELECT id FROM cracked_keys WHERE bssid = ?1", params![bssid]).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| EvidenceStoreError::MappingError("insert_cracked_key produced no row".into()))?;
        let id = row.get(0)?;

        transaction.commit().await?;
        Ok(id)
    }

    pub async fn key_for(&self, bssid: &str) -> Result<Option<String>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection.query("SELECT password FROM cracked_keys WHERE bssid = ?1", params![bssid]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Every recovered key, oldest first — used by the enumeration-trigger
    /// worker to find newly-cracked networks without pulling the full
    /// ledger snapshot on every poll.
    pub async fn list_all(&self) -> Result<Vec<CrackedKeyRow>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query("SELECT handshake_id, bssid, ssid, password, engine, crack_time_seconds, cracked_date FROM cracked_keys ORDER BY id ASC", ())
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(CrackedKeyRow {
                handshake_id: row.get(0)?,
                bssid: row.get(1)?,
                ssid: row.get(2)?,
                password: row.get(3)?,
                engine: row.get(4)?,
                crack_time_seconds: row.get(5)?,
                cracked_date: row.get(6)?,
            });
        }
        Ok(out)
    }
}
