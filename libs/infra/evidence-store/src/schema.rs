// [libs/infra/evidence-store/src/schema.rs]
/*!
 * =================================================================
 * APARATO: EVIDENCE STORE SCHEMA (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL DEL LEDGER DE EVIDENCIA
 * =================================================================
 */

use crate::errors::EvidenceStoreError;
use libsql::Connection;
use tracing::{debug, instrument};

const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_NETWORKS", r#"
        CREATE TABLE IF NOT EXISTS networks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bssid TEXT NOT NULL UNIQUE,
            ssid TEXT NOT NULL DEFAULT '',
            channel INTEGER NOT NULL,
            encryption TEXT NOT NULL,
            signal_strength INTEGER NOT NULL,
            first_seen TEXT NOT NULL,
            last_seen TEXT NOT NULL,
            is_whitelisted INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("TABLE_HANDSHAKES", r#"
        CREATE TABLE IF NOT EXISTS handshakes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            network_id INTEGER NOT NULL REFERENCES networks(id),
            bssid TEXT NOT NULL,
            ssid TEXT NOT NULL,
            file_path TEXT NOT NULL,
            capture_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            quality TEXT NOT NULL DEFAULT 'unknown'
        );
    "#),
    ("TABLE_CRACKED_KEYS", r#"
        CREATE TABLE IF NOT EXISTS cracked_keys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            handshake_id INTEGER NOT NULL REFERENCES handshakes(id),
            bssid TEXT NOT NULL UNIQUE,
            ssid TEXT NOT NULL,
            password TEXT NOT NULL,
            engine TEXT NOT NULL,
            crack_time_seconds INTEGER NOT NULL,
            cracked_date TEXT NOT NULL
        );
    "#),
    ("TABLE_SCANS", r#"
        CREATE TABLE IF NOT EXISTS scans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            network_id INTEGER NOT NULL REFERENCES networks(id),
            bssid TEXT NOT NULL,
            ssid TEXT NOT NULL,
            scan_type TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            status TEXT NOT NULL DEFAULT 'running',
            results TEXT,
            vulnerabilities_found INTEGER NOT NULL DEFAULT 0,
            UNIQUE(bssid, scan_type)
        );
    "#),
    ("TABLE_VULNERABILITIES", r#"
        CREATE TABLE IF NOT EXISTS vulnerabilities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scan_id INTEGER NOT NULL REFERENCES scans(id),
            host TEXT NOT NULL,
            port INTEGER,
            service TEXT,
            vuln_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            description TEXT NOT NULL,
            plugin_name TEXT NOT NULL,
            discovered_date TEXT NOT NULL
        );
    "#),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_HANDSHAKES_STATUS", "CREATE INDEX IF NOT EXISTS idx_handshakes_status ON handshakes(status, capture_date);"),
    ("IDX_VULNS_SCAN", "CREATE INDEX IF NOT EXISTS idx_vulnerabilities_scan ON vulnerabilities(scan_id);"),
    ("IDX_NETWORKS_BSSID", "CREATE UNIQUE INDEX IF NOT EXISTS idx_networks_bssid ON networks(bssid);"),
];

#[instrument(skip(connection))]
pub async fn apply_schema(connection: &Connection) -> Result<(), EvidenceStoreError> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ solidifying: {}", identifier);
        connection.execute(sql, ()).await?;
    }
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ hardening: {}", identifier);
        connection.execute(sql, ()).await?;
    }
    Ok(())
}
