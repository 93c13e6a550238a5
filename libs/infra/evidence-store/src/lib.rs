// [libs/infra/evidence-store/src/lib.rs]
/*!
 * =================================================================
 * APARATO: EVIDENCE STORE (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL LEDGER DE EVIDENCIA TÁCTICA
 *
 * Fachada de alto nivel sobre los repositorios por entidad: cada llamada
 * de mutación es una única transacción corta (§4.B "cross-call atomicity
 * is not required"). El almacén es compartido entre el bucle de escaneo,
 * el motor de captura, el pool de cracking y la fase de enumeración.
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::EvidenceStoreClient;
pub use errors::EvidenceStoreError;
pub use repositories::snapshot::{CrackedKeyRow, EvidenceSnapshot};

use pendonn_domain_models::{Encryption, Handshake, HandshakeQuality, HandshakeStatus, Network, ScanStatus, ScanType, Severity, Statistics, Vulnerability};
use repositories::cracked_keys::CrackedKeyRepository;
use repositories::handshakes::HandshakeRepository;
use repositories::networks::NetworkRepository;
use repositories::scans::ScanRepository;
use repositories::statistics::StatisticsRepository;
use repositories::vulnerabilities::VulnerabilityRepository;
use std::path::Path;

/// Entry point every other component depends on. Thin delegator to the
/// per-entity repositories — kept as one type so callers don't have to
/// wire five repositories by hand.
#[derive(Clone)]
pub struct EvidenceStore {
    client: EvidenceStoreClient,
}

impl EvidenceStore {
    pub async fn connect(database_path: &str) -> Result<Self, EvidenceStoreError> {
        Ok(Self { client: EvidenceStoreClient::connect(database_path).await? })
    }

    pub fn from_client(client: EvidenceStoreClient) -> Self {
        Self { client }
    }

    pub async fn upsert_network(&self, ssid: &str, bssid: &str, channel: u8, encryption: Encryption, signal_strength: i32) -> Result<i64, EvidenceStoreError> {
        NetworkRepository::new(self.client.clone()).upsert_network(ssid, bssid, channel, encryption, signal_strength).await
    }

    pub async fn set_whitelisted(&self, bssid: &str, whitelisted: bool) -> Result<(), EvidenceStoreError> {
        NetworkRepository::new(self.client.clone()).set_whitelisted(bssid, whitelisted).await
    }

    pub async fn get_network(&self, bssid: &str) -> Result<Option<Network>, EvidenceStoreError> {
        NetworkRepository::new(self.client.clone()).get_by_bssid(bssid).await
    }

    pub async fn list_networks(&self) -> Result<Vec<Network>, EvidenceStoreError> {
        NetworkRepository::new(self.client.clone()).list_all().await
    }

    pub async fn insert_handshake(&self, network_id: i64, bssid: &str, ssid: &str, file_path: &str, quality: HandshakeQuality) -> Result<i64, EvidenceStoreError> {
        HandshakeRepository::new(self.client.clone()).insert_handshake(network_id, bssid, ssid, file_path, quality).await
    }

    pub async fn pending_handshakes(&self) -> Result<Vec<Handshake>, EvidenceStoreError> {
        HandshakeRepository::new(self.client.clone()).pending_handshakes().await
    }

    pub async fn set_handshake_status(&self, id: i64, status: HandshakeStatus) -> Result<(), EvidenceStoreError> {
        HandshakeRepository::new(self.client.clone()).set_handshake_status(id, status).await
    }

    pub async fn key_for(&self, bssid: &str) -> Result<Option<String>, EvidenceStoreError> {
        CrackedKeyRepository::new(self.client.clone()).key_for(bssid).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_cracked_key(
        &self,
        handshake_id: i64,
        bssid: &str,
        ssid: &str,
        password: &str,
        engine: &str,
        crack_time_seconds: i64,
    ) -> Result<i64, EvidenceStoreError> {
        CrackedKeyRepository::new(self.client.clone())
            .insert_cracked_key(handshake_id, bssid, ssid, password, engine, crack_time_seconds)
            .await
    }

    pub async fn list_cracked_keys(&self) -> Result<Vec<CrackedKeyRow>, EvidenceStoreError> {
        CrackedKeyRepository::new(self.client.clone()).list_all().await
    }

    pub async fn insert_scan(&self, network_id: i64, bssid: &str, ssid: &str, scan_type: ScanType) -> Result<i64, EvidenceStoreError> {
        ScanRepository::new(self.client.clone()).insert_scan(network_id, bssid, ssid, scan_type).await
    }

    pub async fn update_scan(&self, id: i64, status: ScanStatus, results: Option<serde_json::Value>, vulnerabilities_found: i64) -> Result<(), EvidenceStoreError> {
        ScanRepository::new(self.client.clone()).update_scan(id, status, results, vulnerabilities_found).await
    }

    pub async fn has_completed_scan(&self, bssid: &str, scan_type: ScanType) -> Result<bool, EvidenceStoreError> {
        ScanRepository::new(self.client.clone()).has_completed_scan(bssid, scan_type).await
    }

    pub async fn list_scans(&self) -> Result<Vec<pendonn_domain_models::Scan>, EvidenceStoreError> {
        ScanRepository::new(self.client.clone()).list_all().await
    }

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
        VulnerabilityRepository::new(self.client.clone())
            .insert_vulnerability(scan_id, host, port, service, vuln_type, severity, description, plugin_name)
            .await
    }

    pub async fn vulnerabilities_for_scan(&self, scan_id: i64) -> Result<Vec<Vulnerability>, EvidenceStoreError> {
        VulnerabilityRepository::new(self.client.clone()).list_for_scan(scan_id).await
    }

    pub async fn statistics(&self) -> Result<Statistics, EvidenceStoreError> {
        StatisticsRepository::new(self.client.clone()).statistics().await
    }

    pub async fn export_snapshot(&self) -> Result<EvidenceSnapshot, EvidenceStoreError> {
        repositories::snapshot::export_snapshot(&self.client).await
    }

    pub async fn write_export(&self, destination: &Path) -> Result<(), EvidenceStoreError> {
        repositories::snapshot::write_export(&self.client, destination).await
    }

    pub async fn import_snapshot(&self, snapshot: &EvidenceSnapshot) -> Result<(), EvidenceStoreError> {
        repositories::snapshot::import_snapshot(&self.client, snapshot).await
    }

    pub async fn reset(
        &self,
        store_path: &Path,
        keep_backup: bool,
        clean_files: bool,
        handshake_dir: &Path,
        scan_results_dir: &Path,
    ) -> Result<(), EvidenceStoreError> {
        repositories::snapshot::reset(&self.client, store_path, keep_backup, clean_files, handshake_dir, scan_results_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> EvidenceStore {
        EvidenceStore::connect("file::memory:?cache=shared&mode=memory").await.unwrap()
    }

    #[tokio::test]
    async fn upsert_network_preserves_first_seen_and_whitelist_across_resightings() {
        let store = memory_store().await;
        let id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, Encryption::Wpa2, -40).await.unwrap();
        store.set_whitelisted("aa:bb:cc:dd:ee:01", true).await.unwrap();

        let first_seen = store.get_network("aa:bb:cc:dd:ee:01").await.unwrap().unwrap().first_seen;

        let same_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 11, Encryption::Wpa2, -55).await.unwrap();
        assert_eq!(id, same_id);

        let network = store.get_network("aa:bb:cc:dd:ee:01").await.unwrap().unwrap();
        assert_eq!(network.channel, 11);
        assert_eq!(network.signal_strength, -55);
        assert!(network.is_whitelisted, "whitelist flag must survive a re-sighting upsert");
        assert_eq!(network.first_seen, first_seen, "first_seen must never move on re-sighting");
    }

    #[tokio::test]
    async fn handshake_status_transitions_follow_the_documented_dag() {
        let store = memory_store().await;
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, Encryption::Wpa2, -40).await.unwrap();
        let handshake_id = store
            .insert_handshake(network_id, "aa:bb:cc:dd:ee:01", "TestNet", "/tmp/h.cap", HandshakeQuality::Good)
            .await
            .unwrap();

        store.set_handshake_status(handshake_id, HandshakeStatus::Cracking).await.unwrap();
        let invalid = store.set_handshake_status(handshake_id, HandshakeStatus::Pending).await;
        assert!(invalid.is_err());

        store.set_handshake_status(handshake_id, HandshakeStatus::Cracked).await.unwrap();
    }

    #[tokio::test]
    async fn insert_cracked_key_transitions_handshake_to_cracked_atomically() {
        let store = memory_store().await;
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, Encryption::Wpa2, -40).await.unwrap();
        let handshake_id = store
            .insert_handshake(network_id, "aa:bb:cc:dd:ee:01", "TestNet", "/tmp/h.cap", HandshakeQuality::Good)
            .await
            .unwrap();
        store.set_handshake_status(handshake_id, HandshakeStatus::Cracking).await.unwrap();

        store.insert_cracked_key(handshake_id, "aa:bb:cc:dd:ee:01", "TestNet", "hunter2000", "john", 42).await.unwrap();

        assert_eq!(store.key_for("aa:bb:cc:dd:ee:01").await.unwrap(), Some("hunter2000".to_string()));
        let handshake = HandshakeRepository::new(store.client.clone()).get(handshake_id).await.unwrap().unwrap();
        assert_eq!(handshake.status, HandshakeStatus::Cracked);
    }

    #[tokio::test]
    async fn export_then_import_round_trips_every_section() {
        let store = memory_store().await;
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, Encryption::Wpa2, -40).await.unwrap();
        let handshake_id = store
            .insert_handshake(network_id, "aa:bb:cc:dd:ee:01", "TestNet", "/tmp/h.cap", HandshakeQuality::Good)
            .await
            .unwrap();
        store.set_handshake_status(handshake_id, HandshakeStatus::Cracking).await.unwrap();
        store.insert_cracked_key(handshake_id, "aa:bb:cc:dd:ee:01", "TestNet", "hunter2000", "john", 42).await.unwrap();
        let scan_id = store.insert_scan(network_id, "aa:bb:cc:dd:ee:01", "TestNet", ScanType::LanEnumeration).await.unwrap();
        store.insert_vulnerability(scan_id, "192.168.1.1", Some(22), "ssh", "weak-credential", Severity::High, "default password", "ssh-plugin").await.unwrap();
        store.update_scan(scan_id, ScanStatus::Completed, None, 1).await.unwrap();

        let snapshot = store.export_snapshot().await.unwrap();
        assert_eq!(snapshot.networks.len(), 1);
        assert_eq!(snapshot.handshakes.len(), 1);
        assert_eq!(snapshot.cracked_passwords.len(), 1);
        assert_eq!(snapshot.scans.len(), 1);
        assert_eq!(snapshot.vulnerabilities.len(), 1);

        let tmp = tempfile::tempdir().unwrap();
        store.reset(Path::new("unused.db"), false, false, tmp.path(), tmp.path()).await.unwrap();
        assert_eq!(store.statistics().await.unwrap(), Statistics::default());

        store.import_snapshot(&snapshot).await.unwrap();
        let reimported = store.export_snapshot().await.unwrap();
        assert_eq!(reimported.networks, snapshot.networks);
        assert_eq!(reimported.handshakes, snapshot.handshakes);
        assert_eq!(reimported.cracked_passwords.len(), snapshot.cracked_passwords.len());
    }
}
