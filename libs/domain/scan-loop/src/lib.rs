// [libs/domain/scan-loop/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SCAN LOOP (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L1)
 * RESPONSABILIDAD: BARRIDO PASIVO Y NOMINACIÓN DE CANDIDATOS
 *
 * VISION HIPER-HOLÍSTICA:
 * Un bucle cooperativo que cede el NIC de monitor en cuanto la
 * enumeración o una captura lo reclaman (§4.E, §5) — nunca fuerza su
 * turno. Puebla continuamente el almacén de evidencia y nomina, a lo
 * sumo, un candidato de captura por iteración.
 * =================================================================
 */

pub mod candidate;
pub mod errors;

pub use candidate::{select_candidate, Candidate};
pub use errors::ScanLoopError;

use async_trait::async_trait;
use chrono::Utc;
use pendonn_core_interface_registry::InterfaceRegistry;
use pendonn_domain_capture_engine::CaptureEngine;
use pendonn_domain_models::{Encryption, InterfaceRole, WhitelistConfig};
use pendonn_domain_scheduler::{Scheduler, TerminableProcess};
use pendonn_infra_evidence_store::EvidenceStore;
use pendonn_infra_tool_adapter::parsers::airodump;
use pendonn_infra_tool_adapter::{Exec, SpawnedProcess};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

const SWEEP_SECONDS: u64 = 10;
const PRECONDITION_POLL_INTERVAL: Duration = Duration::from_secs(1);
const PRECONDITION_RETRY_SLEEP: Duration = Duration::from_secs(2);
const SCAN_TERMINATE_GRACE: Duration = Duration::from_secs(2);
const RETAINED_CSV_COUNT: usize = 5;

struct SchedulerProcessAdapter(Arc<dyn SpawnedProcess>);

#[async_trait]
impl TerminableProcess for SchedulerProcessAdapter {
    async fn terminate(&self) {
        self.0.terminate(SCAN_TERMINATE_GRACE).await;
    }
}

pub struct ScanLoop<E: Exec + 'static> {
    exec: Arc<E>,
    scheduler: Arc<Scheduler>,
    store: EvidenceStore,
    capture_engine: Arc<CaptureEngine<E>>,
    interface_registry: Arc<InterfaceRegistry<E>>,
    roles: InterfaceRole,
    monitor_nic: String,
    whitelist: WhitelistConfig,
    scan_results_dir: PathBuf,
}

impl<E: Exec + 'static> ScanLoop<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exec: Arc<E>,
        scheduler: Arc<Scheduler>,
        store: EvidenceStore,
        capture_engine: Arc<CaptureEngine<E>>,
        interface_registry: Arc<InterfaceRegistry<E>>,
        roles: InterfaceRole,
        whitelist: WhitelistConfig,
        scan_results_dir: PathBuf,
    ) -> Self {
        let monitor_nic = roles.monitor.clone();
        Self { exec, scheduler, store, capture_engine, interface_registry, roles, monitor_nic, whitelist, scan_results_dir }
    }

    /// Bucle principal: itera `sweep_once` hasta que `shutdown` anuncia
    /// apagado cooperativo. Nunca hace pánico — un error de barrida se
    /// registra y la próxima iteración simplemente reintenta.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                info!("🛑 [SCAN_LOOP]: shutdown signal observed, stopping.");
                return;
            }
            if let Err(error) = self.sweep_once().await {
                warn!("⚠️  [SCAN_LOOP]: sweep failed: {}", error);
            }
        }
    }

    /// Una barrida completa: espera precondiciones, corre airodump-ng
    /// 10s (abortando antes si la enumeración o una captura seizan el
    /// NIC), parsea el CSV, actualiza el almacén, y nomina un candidato
    /// si ninguna captura está activa (§4.E).
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> Result<(), ScanLoopError> {
        while !self.scheduler.scan_loop_may_proceed().await {
            tokio::time::sleep(PRECONDITION_RETRY_SLEEP).await;
        }

        self.interface_registry.assert_not_management(&self.roles, &self.monitor_nic)?;

        let base_path = self.scan_results_dir.join(format!("sweep_{}", Utc::now().timestamp()));
        let base_path_str = base_path.to_string_lossy().to_string();
        let csv_path = format!("{base_path_str}-01.csv");

        let argv = vec![
            "airodump-ng".to_string(),
            "--band".to_string(),
            "abg".to_string(),
            "--output-format".to_string(),
            "csv".to_string(),
            "--write".to_string(),
            base_path_str,
            self.monitor_nic.clone(),
        ];
        let process: Arc<dyn SpawnedProcess> = Arc::from(self.exec.spawn(&argv).await?);
        self.scheduler.register_scan_process(Arc::new(SchedulerProcessAdapter(process.clone()))).await;

        for _ in 0..SWEEP_SECONDS {
            tokio::time::sleep(PRECONDITION_POLL_INTERVAL).await;
            if !self.scheduler.scan_loop_may_proceed().await {
                info!("⏭️  [SCAN_LOOP]: preconditions lost mid-sweep, aborting early.");
                break;
            }
        }

        process.terminate(SCAN_TERMINATE_GRACE).await;
        self.scheduler.clear_scan_process().await;

        let raw = tokio::fs::read_to_string(&csv_path).await.unwrap_or_default();
        let (access_points, clients) = airodump::parse_scan_csv(&raw);

        let mut eligible = Vec::new();
        for ap in &access_points {
            let network_id = self.store.upsert_network(&ap.ssid, &ap.bssid, ap.channel, ap.encryption, ap.power).await?;
            let whitelisted = self.whitelist.permits(&ap.ssid);
            self.store.set_whitelisted(&ap.bssid, whitelisted).await?;

            if is_capture_eligible(whitelisted, ap.encryption) {
                if let Some(network) = self.store.get_network(&ap.bssid).await? {
                    let client_count = clients.iter().filter(|client| client.associated_bssid.as_deref() == Some(ap.bssid.as_str())).count();
                    eligible.push(Candidate {
                        network_id,
                        bssid: ap.bssid.clone(),
                        ssid: ap.ssid.clone(),
                        channel: ap.channel,
                        client_count,
                        signal_strength: network.signal_strength,
                        last_seen: network.last_seen,
                    });
                }
            }
        }

        if self.scheduler.current_capture_bssid().await.is_none() {
            if let Some(winner) = select_candidate(&eligible) {
                self.request_capture(winner);
            }
        }

        self.retain_recent_csvs().await?;
        Ok(())
    }

    /// Dispara la captura en segundo plano — el bucle de escaneo nomina,
    /// no espera; la siguiente iteración ve `scan_loop_may_proceed() ==
    /// false` mientras la captura ocupa el NIC de monitor.
    fn request_capture(&self, candidate: Candidate) {
        let engine = self.capture_engine.clone();
        info!("🎯 [SCAN_LOOP]: nominating {} (score {:.1}) for capture.", candidate.bssid, candidate.score());
        tokio::spawn(async move {
            if let Err(error) = engine.run(candidate.network_id, &candidate.bssid, &candidate.ssid, candidate.channel).await {
                warn!("⚠️  [SCAN_LOOP]: capture request for {} failed: {}", candidate.bssid, error);
            }
        });
    }

    /// Conserva solo los 5 CSV de barrida más recientes en disco (§4.E.6).
    async fn retain_recent_csvs(&self) -> Result<(), ScanLoopError> {
        let mut entries = match tokio::fs::read_dir(&self.scan_results_dir).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(error.into()),
        };

        let mut csv_files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("csv") {
                let modified = entry.metadata().await?.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                csv_files.push((modified, path));
            }
        }
        csv_files.sort_by_key(|(modified, _)| *modified);

        if csv_files.len() > RETAINED_CSV_COUNT {
            for (_, path) in &csv_files[..csv_files.len() - RETAINED_CSV_COUNT] {
                tokio::fs::remove_file(path).await?;
            }
        }
        Ok(())
    }
}

/// Un AP solo es nominable si el operador lo whitelisteó y su cifrado es
/// atacable por deauth + captura de 4-way (§4.D "capture-eligible
/// WPA/WPA2 networks").
fn is_capture_eligible(whitelisted: bool, encryption: Encryption) -> bool {
    whitelisted && matches!(encryption, Encryption::Wpa | Encryption::Wpa2 | Encryption::WpaWpa2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pendonn_domain_capture_engine::CaptureEngine;
    use pendonn_infra_tool_adapter::MockExec;
    use tempfile::tempdir;

    #[test]
    fn only_whitelisted_wpa_family_networks_are_capture_eligible() {
        assert!(is_capture_eligible(true, Encryption::Wpa2));
        assert!(is_capture_eligible(true, Encryption::WpaWpa2));
        assert!(!is_capture_eligible(false, Encryption::Wpa2));
        assert!(!is_capture_eligible(true, Encryption::Open));
        assert!(!is_capture_eligible(true, Encryption::Wep));
    }

    async fn memory_store() -> EvidenceStore {
        EvidenceStore::connect("file::memory:?cache=shared&mode=memory").await.unwrap()
    }

    fn test_roles() -> InterfaceRole {
        InterfaceRole { monitor: "wlan0mon".to_string(), attack: "wlan1mon".to_string(), management: "eth0".to_string() }
    }

    async fn test_scan_loop(scan_results_dir: PathBuf) -> ScanLoop<MockExec> {
        let exec = Arc::new(MockExec::new());
        let scheduler = Arc::new(Scheduler::new());
        let store = memory_store().await;
        let interface_registry = Arc::new(InterfaceRegistry::new(exec.clone()));
        let capture_engine = Arc::new(CaptureEngine::new(
            exec.clone(),
            scheduler.clone(),
            store.clone(),
            interface_registry.clone(),
            test_roles(),
            scan_results_dir.clone(),
            60,
        ));
        ScanLoop::new(exec, scheduler, store, capture_engine, interface_registry, test_roles(), WhitelistConfig::default(), scan_results_dir)
    }

    #[tokio::test]
    async fn retain_recent_csvs_keeps_only_the_five_newest() {
        let tmp = tempdir().unwrap();
        for i in 0..8u64 {
            let path = tmp.path().join(format!("sweep_{i}-01.csv"));
            tokio::fs::write(&path, "stub").await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let scan_loop = test_scan_loop(tmp.path().to_path_buf()).await;
        scan_loop.retain_recent_csvs().await.unwrap();

        let mut remaining = Vec::new();
        let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            remaining.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(remaining.len(), 5);
        for kept in ["sweep_3-01.csv", "sweep_4-01.csv", "sweep_5-01.csv", "sweep_6-01.csv", "sweep_7-01.csv"] {
            assert!(remaining.contains(&kept.to_string()), "expected {kept} to survive retention, got {remaining:?}");
        }
    }
}
