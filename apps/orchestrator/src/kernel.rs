// [apps/orchestrator/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR KERNEL (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L4)
 * RESPONSABILIDAD: CABLEADO DE COMPONENTES Y CICLO DE VIDA DE TAREAS
 *
 * Construye la cadena completa de dependencias en el orden que §4
 * exige — registro de interfaces antes que almacén, almacén antes que
 * scheduler, scheduler antes que cualquier aparato que lo arbitre — y
 * luego sostiene cuatro tareas concurrentes (bucle de escaneo, pool de
 * cracking, disparador de enumeración, latido de estado) hasta que el
 * apagado cooperativo las une a todas.
 * =================================================================
 */

use pendonn_core_interface_registry::{InterfaceModeSnapshot, InterfaceRegistry};
use pendonn_domain_capture_engine::CaptureEngine;
use pendonn_domain_crack_pool::CrackPool;
use pendonn_domain_enumeration::{EnumerationOutcome, EnumerationPhase, VulnerabilityPlugin};
use pendonn_domain_models::{Config, InterfaceRole};
use pendonn_domain_scan_loop::ScanLoop;
use pendonn_domain_scheduler::Scheduler;
use pendonn_infra_evidence_store::EvidenceStore;
use pendonn_infra_tool_adapter::Exec;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// El disparador de enumeración sondea en vez de reaccionar a un evento
/// push — no existe un canal de notificación entre el pool de cracking
/// y este aparato. Un intervalo corto mantiene el "scan loop pauses
/// within 1s" del §8 dentro de un margen razonable sin acoplar los dos
/// componentes entre sí.
const ENUMERATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct OrchestratorKernel<E: Exec + 'static> {
    interface_registry: Arc<InterfaceRegistry<E>>,
    store: EvidenceStore,
    roles: InterfaceRole,
    initial_modes: InterfaceModeSnapshot,
    scan_loop: Arc<ScanLoop<E>>,
    crack_pool: Arc<CrackPool<E>>,
    cracking_enabled: bool,
    enumeration: Arc<EnumerationPhase<E>>,
    enumeration_auto_scan: bool,
    heartbeat_interval: Duration,
}

impl<E: Exec + 'static> OrchestratorKernel<E> {
    /// Construye la cadena de dependencias completa sin arrancar ninguna
    /// tarea de fondo todavía — eso es responsabilidad de `run`.
    pub async fn ignite(exec: Arc<E>, config: &Config, plugins: Vec<Arc<dyn VulnerabilityPlugin>>) -> anyhow::Result<Self> {
        info!("🧭 [KERNEL]: resolving interface roles...");
        let interface_registry = Arc::new(InterfaceRegistry::new(exec.clone()));
        let roles = interface_registry.resolve(&config.wifi).await?;
        let initial_modes = interface_registry.snapshot_initial_modes(&roles).await?;
        info!("📌 [KERNEL]: monitor={} attack={} management={}", roles.monitor, roles.attack, roles.management);

        tokio::fs::create_dir_all(&config.general.data_dir).await?;
        tokio::fs::create_dir_all(&config.general.handshake_dir).await?;
        tokio::fs::create_dir_all(&config.general.scan_results_dir).await?;

        let database_path = format!("{}/pendonn.db", config.general.data_dir.trim_end_matches('/'));
        let store = EvidenceStore::connect(&database_path).await?;
        info!("🗄️  [KERNEL]: evidence store connected at {}", database_path);

        let scheduler = Arc::new(Scheduler::new());

        let capture_engine = Arc::new(CaptureEngine::new(
            exec.clone(),
            scheduler.clone(),
            store.clone(),
            interface_registry.clone(),
            roles.clone(),
            Path::new(&config.general.handshake_dir).to_path_buf(),
            config.wifi.handshake_timeout,
        ));

        let scan_loop = Arc::new(ScanLoop::new(
            exec.clone(),
            scheduler.clone(),
            store.clone(),
            capture_engine,
            interface_registry.clone(),
            roles.clone(),
            config.whitelist.clone(),
            Path::new(&config.general.scan_results_dir).to_path_buf(),
        ));

        let crack_pool = Arc::new(CrackPool::new(
            exec.clone(),
            store.clone(),
            config.cracking.engines.clone(),
            config.cracking.wordlist_path.clone(),
            config.cracking.john_format.clone(),
            config.cracking.hashcat_mode,
            config.cracking.max_concurrent_cracks,
        ));

        let enumeration = Arc::new(EnumerationPhase::new(
            exec,
            interface_registry.clone(),
            scheduler,
            store.clone(),
            plugins,
            config.enumeration.nmap_timing.clone(),
            config.enumeration.port_scan_range.clone(),
            Duration::from_secs(config.enumeration.scan_timeout),
        ));

        Ok(Self {
            interface_registry,
            store,
            roles,
            initial_modes,
            scan_loop,
            crack_pool,
            cracking_enabled: config.cracking.enabled,
            enumeration,
            enumeration_auto_scan: config.enumeration.enabled && config.enumeration.auto_scan_on_crack,
            heartbeat_interval: Duration::from_secs(config.general.status_heartbeat_interval_seconds),
        })
    }

    /// Corre hasta que `shutdown` anuncia apagado cooperativo, luego une
    /// cada tarea y audita que ambos radios hayan vuelto al modo que
    /// tenían al arranque (§8 "After any crash or stop...").
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!("🚀 [KERNEL]: launching sovereign operations.");

        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        let scan_loop = self.scan_loop.clone();
        let scan_shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            scan_loop.run(scan_shutdown).await;
        }));

        if self.cracking_enabled {
            let crack_pool = self.crack_pool.clone();
            let crack_shutdown = shutdown.clone();
            handles.push(tokio::spawn(async move {
                crack_pool.run(crack_shutdown).await;
            }));
        } else {
            info!("⏸️  [KERNEL]: cracking.enabled = false, crack pool not started.");
        }

        if self.enumeration_auto_scan {
            handles.push(self.spawn_enumeration_worker(shutdown.clone()));
        } else {
            info!("⏸️  [KERNEL]: enumeration auto-scan disabled, trigger worker not started.");
        }

        handles.push(self.spawn_heartbeat(shutdown));

        for handle in handles {
            let _ = handle.await;
        }

        info!("🛑 [KERNEL]: all tasks joined, verifying interface restoration.");
        match self.interface_registry.assert_restored(&self.roles, &self.initial_modes).await {
            Ok(()) => info!("✅ [KERNEL]: both radios restored to their pre-flight modes."),
            Err(error) => warn!("⚠️  [KERNEL]: interface mode restoration audit failed: {}", error),
        }

        Ok(())
    }

    fn spawn_enumeration_worker(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let store = self.store.clone();
        let roles = self.roles.clone();
        let enumeration = self.enumeration.clone();

        tokio::spawn(async move {
            loop {
                if *shutdown.borrow() {
                    info!("🛑 [KERNEL]: enumeration-trigger worker stopping.");
                    return;
                }

                if let Err(error) = trigger_pending_enumerations(&store, &roles, &enumeration).await {
                    warn!("⚠️  [KERNEL]: enumeration-trigger sweep failed: {}", error);
                }

                tokio::select! {
                    _ = tokio::time::sleep(ENUMERATION_POLL_INTERVAL) => {}
                    _ = shutdown.changed() => {}
                }
            }
        })
    }

    fn spawn_heartbeat(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let store = self.store.clone();
        let interval = self.heartbeat_interval;

        tokio::spawn(async move {
            loop {
                if *shutdown.borrow() {
                    return;
                }
                match store.statistics().await {
                    Ok(stats) => info!(
                        "💓 [HEARTBEAT]: networks={} (whitelisted={}) handshakes(pending={} cracking={} cracked={} failed={}) keys={} scans(running={} completed={} failed={}) vulns={}",
                        stats.networks_total,
                        stats.networks_whitelisted,
                        stats.handshakes_pending,
                        stats.handshakes_cracking,
                        stats.handshakes_cracked,
                        stats.handshakes_failed,
                        stats.cracked_keys_total,
                        stats.scans_running,
                        stats.scans_completed,
                        stats.scans_failed,
                        stats.vulnerabilities_total,
                    ),
                    Err(error) => warn!("⚠️  [HEARTBEAT]: failed to read statistics: {}", error),
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown.changed() => {}
                }
            }
        })
    }
}

/// Revisa cada clave recuperada y dispara la fase de enumeración contra
/// su red. Los guardas de idempotencia propios de la fase
/// (`has_completed_scan`, `is_enumeration_active`) hacen que repetir
/// esto en cada sondeo sea un no-op seguro para redes ya procesadas.
async fn trigger_pending_enumerations<E: Exec + 'static>(
    store: &EvidenceStore,
    roles: &InterfaceRole,
    enumeration: &Arc<EnumerationPhase<E>>,
) -> anyhow::Result<()> {
    for cracked in store.list_cracked_keys().await? {
        let Some(network) = store.get_network(&cracked.bssid).await? else { continue };
        match enumeration.run(roles, network.id, &cracked.bssid, &cracked.ssid, &cracked.password).await? {
            EnumerationOutcome::Completed(scan_id) => info!("🗺️  [KERNEL]: enumeration #{} completed for {}.", scan_id, cracked.bssid),
            EnumerationOutcome::Failed(scan_id) => warn!("⚠️  [KERNEL]: enumeration #{} failed for {}.", scan_id, cracked.bssid),
            EnumerationOutcome::Skipped => {}
        }
    }
    Ok(())
}
