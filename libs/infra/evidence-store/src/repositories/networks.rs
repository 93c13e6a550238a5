// [libs/infra/evidence-store/src/repositories/networks.rs]
use crate::client::EvidenceStoreClient;
use crate::errors::EvidenceStoreError;
use chrono::Utc;
use libsql::{params, Row};
use pendonn_domain_models::{Encryption, Network};
use tracing::instrument;

pub struct NetworkRepository {
    client: EvidenceStoreClient,
}

impl NetworkRepository {
    pub fn new(client: EvidenceStoreClient) -> Self {
        Self { client }
    }

    /// Insert-or-update keyed by bssid. Preserves `is_whitelisted` and
    /// `first_seen`; refreshes signal, channel, encryption, ssid, last_seen.
    #[instrument(skip(self))]
    pub async fn upsert_network(
        &self,
        ssid: &str,
        bssid: &str,
        channel: u8,
        encryption: Encryption,
        signal_strength: i32,
    ) -> Result<i64, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let now = Utc::now().to_rfc3339();

        connection
            .execute(
                r#"
                INSERT INTO networks (bssid, ssid, channel, encryption, signal_strength, first_seen, last_seen, is_whitelisted)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 0)
                ON CONFLICT(bssid) DO UPDATE SET
                    ssid = excluded.ssid,
                    channel = excluded.channel,
                    encryption = excluded.encryption,
                    signal_strength = excluded.signal_strength,
                    last_seen = excluded.last_seen
                "#,
                params![bssid, ssid, channel as i64, encryption.as_str(), signal_strength as i64, now],
            )
            .await?;

        let mut rows = connection.query("SELECT id FROM networks WHERE bssid = ?1", params![bssid]).await?;
        let row = rows.next().await?.ok_or_else(|| EvidenceStoreError::MappingError("upsert_network produced no row".into()))?;
        Ok(row.get(0)?)
    }

    #[instrument(skip(self))]
    pub async fn set_whitelisted(&self, bssid: &str, whitelisted: bool) -> Result<(), EvidenceStoreError> {
        let connection = self.client.connection()?;
        connection
            .execute(
                "UPDATE networks SET is_whitelisted = ?2 WHERE bssid = ?1",
                params![bssid, whitelisted as i64],
            )
            .await?;
        Ok(())
    }

    pub async fn get_by_bssid(&self, bssid: &str) -> Result<Option<Network>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, bssid, ssid, channel, encryption, signal_strength, first_seen, last_seen, is_whitelisted FROM networks WHERE bssid = ?1",
                params![bssid],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Network>, EvidenceStoreError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, bssid, ssid, channel, encryption, signal_strength, first_seen, last_seen, is_whitelisted FROM networks ORDER BY last_seen DESC",
                (),
            )
            .await?;
        let mut networks = Vec::new();
        while let Some(row) = rows.next().await? {
            networks.push(map_row(row)?);
        }
        Ok(networks)
    }
}

fn map_row(row: Row) -> Result<Network, EvidenceStoreError> {
    let channel: i64 = row.get(3)?;
    let signal_strength: i64 = row.get(5)?;
    let encryption_raw: String = row.get(4)?;
    let is_whitelisted: i64 = row.get(8)?;
    let first_seen: String = row.get(6)?;
    let last_seen: String = row.get(7)?;

    Ok(Network {
        id: row.get(0)?,
        bssid: row.get(1)?,
        ssid: row.get(2)?,
        channel: channel as u8,
        encryption: Encryption::parse(&encryption_raw),
        signal_strength: signal_strength as i32,
        first_seen: first_seen.parse().map_err(|e| EvidenceStoreError::MappingError(format!("first_seen: {e}")))?,
        last_seen: last_seen.parse().map_err(|e| EvidenceStoreError::MappingError(format!("last_seen: {e}")))?,
        is_whitelisted: is_whitelisted != 0,
    })
}
