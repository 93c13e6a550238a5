// [libs/infra/evidence-store/src/repositories/snapshot.rs]
/*!
 * Export/reset of the full ledger (§4.B, §6). `export_snapshot` produces
 * the JSON dump shape the filesystem layout names: {export_date, networks,
 * handshakes, cracked_passwords, scans, vulnerabilities, statistics}.
 * `import_snapshot` is its inverse, used by the round-trip regression
 * test; `reset` is the operator-triggered atomic wipe with an optional
 * timestamped backup and optional deletion of artifact files.
 */

use crate::errors::EvidenceStoreError;
use crate::repositories::handshakes::HandshakeRepository;
use crate::repositories::networks::NetworkRepository;
use crate::repositories::scans::ScanRepository;
use crate::repositories::statistics::StatisticsRepository;
use crate::repositories::vulnerabilities::VulnerabilityRepository;
use crate::EvidenceStoreClient;
use chrono::Utc;
use libsql::params;
use pendonn_domain_models::{Handshake, Network, Scan, Statistics, Vulnerability};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Extensions a `reset(clean_files: true)` is permitted to delete — a
/// fixed allowlist so a misconfigured directory can never cause collateral
/// deletion outside capture/scan artifacts (§6).
const CLEANABLE_EXTENSIONS: &[&str] = &["cap", "22000", "john", "cracked", "csv"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSnapshot {
    pub export_date: String,
    pub networks: Vec<Network>,
    pub handshakes: Vec<Handshake>,
    pub cracked_passwords: Vec<CrackedKeyRow>,
    pub scans: Vec<Scan>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrackedKeyRow {
    pub handshake_id: i64,
    pub bssid: String,
    pub ssid: String,
    pub password: String,
    pub engine: String,
    pub crack_time_seconds: i64,
    pub cracked_date: String,
}

#[instrument(skip(client))]
pub async fn export_snapshot(client: &EvidenceStoreClient) -> Result<EvidenceSnapshot, EvidenceStoreError> {
    let networks = NetworkRepository::new(client.clone()).list_all().await?;
    let handshakes = HandshakeRepository::new(client.clone()).list_all().await?;
    let scans = ScanRepository::new(client.clone()).list_all().await?;
    let vulnerabilities = VulnerabilityRepository::new(client.clone()).list_all().await?;
    let statistics = StatisticsRepository::new(client.clone()).statistics().await?;

    let connection = client.connection()?;
    let mut rows = connection
        .query("SELECT handshake_id, bssid, ssid, password, engine, crack_time_seconds, cracked_date FROM cracked_keys", ())
        .await?;
    let mut cracked_passwords = Vec::new();
    while let Some(row) = rows.next().await? {
        cracked_passwords.push(CrackedKeyRow {
            handshake_id: row.get(0)?,
            bssid: row.get(1)?,
            ssid: row.get(2)?,
            password: row.get(3)?,
            engine: row.get(4)?,
            crack_time_seconds: row.get(5)?,
            cracked_date: row.get(6)?,
        });
    }

    Ok(EvidenceSnapshot {
        export_date: Utc::now().to_rfc3339(),
        networks,
        handshakes,
        cracked_passwords,
        scans,
        vulnerabilities,
        statistics,
    })
}

#[instrument(skip(client))]
pub async fn write_export(client: &EvidenceStoreClient, destination: &Path) -> Result<(), EvidenceStoreError> {
    let snapshot = export_snapshot(client).await?;
    let encoded = serde_json::to_string_pretty(&snapshot)?;
    tokio::fs::write(destination, encoded).await?;
    info!("📤 [EVIDENCE_STORE]: snapshot written to {}", destination.display());
    Ok(())
}

/// Re-populates an empty (freshly reset) store from a previously exported
/// snapshot. Rows are inserted with their original primary keys preserved
/// so foreign-key relationships (handshake -> network, cracked_key ->
/// handshake, vulnerability -> scan) survive the round trip.
#[instrument(skip(client, snapshot))]
pub async fn import_snapshot(client: &EvidenceStoreClient, snapshot: &EvidenceSnapshot) -> Result<(), EvidenceStoreError> {
    let connection = client.connection()?;

    for network in &snapshot.networks {
        connection
            .execute(
                r#"
                INSERT INTO networks (id, bssid, ssid, channel, encryption, signal_strength, first_seen, last_seen, is_whitelisted)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    network.id,
                    network.bssid.clone(),
                    network.ssid.clone(),
                    network.channel as i64,
                    network.encryption.as_str(),
                    network.signal_strength as i64,
                    network.first_seen.to_rfc3339(),
                    network.last_seen.to_rfc3339(),
                    network.is_whitelisted as i64,
                ],
            )
            .await?;
    }

    for handshake in &snapshot.handshakes {
        connection
            .execute(
                r#"
                INSERT INTO handshakes (id, network_id, bssid, ssid, file_path, capture_date, status, quality)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    handshake.id,
                    handshake.network_id,
                    handshake.bssid.clone(),
                    handshake.ssid.clone(),
                    handshake.file_path.clone(),
                    handshake.capture_date.to_rfc3339(),
                    handshake.status.as_str(),
                    handshake.quality.as_str(),
                ],
            )
            .await?;
    }

    for cracked in &snapshot.cracked_passwords {
        connection
            .execute(
                r#"
                INSERT INTO cracked_keys (handshake_id, bssid, ssid, password, engine, crack_time_seconds, cracked_date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    cracked.handshake_id,
                    cracked.bssid.clone(),
                    cracked.ssid.clone(),
                    cracked.password.clone(),
                    cracked.engine.clone(),
                    cracked.crack_time_seconds,
                    cracked.cracked_date.clone(),
                ],
            )
            .await?;
    }

    for scan in &snapshot.scans {
        let results_text = scan.results.as_ref().map(serde_json::to_string).transpose()?;
        connection
            .execute(
                r#"
                INSERT INTO scans (id, network_id, bssid, ssid, scan_type, start_time, end_time, status, results, vulnerabilities_found)
                VALUES (?1, ?2, (SELECT bssid FROM networks WHERE id = ?2), ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    scan.id,
                    scan.network_id,
                    scan.ssid.clone(),
                    scan.scan_type.as_str(),
                    scan.start_time.to_rfc3339(),
                    scan.end_time.map(|t| t.to_rfc3339()),
                    scan.status.as_str(),
                    results_text,
                    scan.vulnerabilities_found,
                ],
            )
            .await?;
    }

    for vulnerability in &snapshot.vulnerabilities {
        connection
            .execute(
                r#"
                INSERT INTO vulnerabilities (id, scan_id, host, port, service, vuln_type, severity, description, plugin_name, discovered_date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    vulnerability.id,
                    vulnerability.scan_id,
                    vulnerability.host.clone(),
                    vulnerability.port.map(|p| p as i64),
                    vulnerability.service.clone(),
                    vulnerability.vuln_type.clone(),
                    vulnerability.severity.as_str(),
                    vulnerability.description.clone(),
                    vulnerability.plugin_name.clone(),
                    vulnerability.discovered_date.to_rfc3339(),
                ],
            )
            .await?;
    }

    Ok(())
}

/// Atomic wipe of every entity table. When `keep_backup` is set, the store
/// file is copied to a `<path>.backup.<UTC-stamp>` sibling first. When
/// `clean_files` is set, capture/scan artifacts under `handshake_dir` and
/// `scan_results_dir` whose extension is in `CLEANABLE_EXTENSIONS` are
/// removed.
#[instrument(skip(client))]
pub async fn reset(
    client: &EvidenceStoreClient,
    store_path: &Path,
    keep_backup: bool,
    clean_files: bool,
    handshake_dir: &Path,
    scan_results_dir: &Path,
) -> Result<(), EvidenceStoreError> {
    if keep_backup && store_path.exists() {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let backup_path = Path::new(&format!("{}.backup.{}", store_path.display(), stamp)).to_path_buf();
        tokio::fs::copy(store_path, &backup_path).await?;
        info!("🗄️  [EVIDENCE_STORE]: backup written to {}", backup_path.display());
    }

    let connection = client.connection()?;
    for table in ["vulnerabilities", "scans", "cracked_keys", "handshakes", "networks"] {
        connection.execute(&format!("DELETE FROM {table}"), ()).await?;
    }
    warn!("🧹 [EVIDENCE_STORE]: ledger wiped.");

    if clean_files {
        clean_directory(handshake_dir).await?;
        clean_directory(scan_results_dir).await?;
    }

    Ok(())
}

async fn clean_directory(directory: &Path) -> Result<(), EvidenceStoreError> {
    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        if CLEANABLE_EXTENSIONS.contains(&extension) {
            tokio::fs::remove_file(&path).await?;
        }
    }
    Ok(())
}
