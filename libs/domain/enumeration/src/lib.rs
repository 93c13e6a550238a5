// [libs/domain/enumeration/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ENUMERATION PHASE (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L1)
 * RESPONSABILIDAD: ENUMERACIÓN POST-COMPROMISO DE LA RED RECUPERADA
 *
 * VISION HIPER-HOLÍSTICA:
 * Corre a lo sumo un escaneo a la vez (§4.G). Ocho fases —
 * Safety, Seize, Associate, Discover, Scan hosts, reglas incorporadas,
 * plugins, Release — donde cualquier fallo entre Seize y Release
 * registra el resultado parcial y marca el Scan fallido, pero la
 * restauración del modo monitor en Release nunca se salta.
 * =================================================================
 */

pub mod errors;
pub mod plugin;
pub mod rules;

pub use errors::EnumerationError;
pub use plugin::{PluginDescriptor, PluginOutcome, VulnerabilityPlugin};

use pendonn_core_interface_registry::InterfaceRegistry;
use pendonn_domain_models::{InterfaceRole, ScanStatus, ScanType};
use pendonn_domain_scheduler::Scheduler;
use pendonn_infra_evidence_store::EvidenceStore;
use pendonn_infra_tool_adapter::parsers::{net_control, nmap};
use pendonn_infra_tool_adapter::Exec;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

const TOOL_TIMEOUT: Duration = Duration::from_secs(30);
const DHCP_TIMEOUT: Duration = Duration::from_secs(30);

/// Resultado terminal de una corrida de la fase de enumeración.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumerationOutcome {
    /// Las ocho fases corrieron limpio; trae el id del Scan completado.
    Completed(i64),
    /// Una fase posterior a Seize falló; el Scan quedó marcado `failed`
    /// con el resultado parcial, pero el NIC de ataque ya fue restaurado.
    Failed(i64),
    /// Ya hay un Scan completado para este BSSID, o una enumeración ya
    /// está en curso — no es un fallo, el llamador simplemente espera.
    Skipped,
}

#[derive(Debug, Default)]
struct PhaseResults {
    live_hosts: Vec<String>,
    hosts_scanned: usize,
    vulnerabilities_found: i64,
    failed_phase: Option<String>,
}

impl PhaseResults {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "live_hosts": self.live_hosts,
            "hosts_scanned": self.hosts_scanned,
            "vulnerabilities_found": self.vulnerabilities_found,
            "failed_phase": self.failed_phase,
        })
    }
}

pub struct EnumerationPhase<E: Exec> {
    exec: Arc<E>,
    interface_registry: Arc<InterfaceRegistry<E>>,
    scheduler: Arc<Scheduler>,
    store: EvidenceStore,
    plugins: Vec<Arc<dyn VulnerabilityPlugin>>,
    nmap_timing: String,
    port_scan_range: String,
    scan_timeout: Duration,
}

impl<E: Exec + 'static> EnumerationPhase<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exec: Arc<E>,
        interface_registry: Arc<InterfaceRegistry<E>>,
        scheduler: Arc<Scheduler>,
        store: EvidenceStore,
        plugins: Vec<Arc<dyn VulnerabilityPlugin>>,
        nmap_timing: impl Into<String>,
        port_scan_range: impl Into<String>,
        scan_timeout: Duration,
    ) -> Self {
        Self {
            exec,
            interface_registry,
            scheduler,
            store,
            plugins: plugins.into_iter().filter(|plugin| plugin.descriptor().enabled).collect(),
            nmap_timing: nmap_timing.into(),
            port_scan_range: port_scan_range.into(),
            scan_timeout,
        }
    }

    /// Corre la fase completa contra la red identificada por
    /// `(network_id, bssid, ssid)` con la clave recuperada `psk`.
    /// Es responsabilidad del llamador invocar esto solo tras una
    /// `CrackedKey` insertada (§4.G).
    #[instrument(skip(self, roles, psk), fields(bssid = %bssid))]
    pub async fn run(&self, roles: &InterfaceRole, network_id: i64, bssid: &str, ssid: &str, psk: &str) -> Result<EnumerationOutcome, EnumerationError> {
        if self.store.has_completed_scan(bssid, ScanType::LanEnumeration).await? {
            info!("⏭️  [ENUMERATION]: {} already has a completed scan.", bssid);
            return Ok(EnumerationOutcome::Skipped);
        }
        if self.scheduler.is_enumeration_active().await {
            info!("⏭️  [ENUMERATION]: another enumeration is already in progress.");
            return Ok(EnumerationOutcome::Skipped);
        }

        let scan_id = self.store.insert_scan(network_id, bssid, ssid, ScanType::LanEnumeration).await?;

        // Phase 1: Safety.
        if let Err(error) = self.safety_check(roles, ssid).await {
            self.fail_scan(scan_id, "safety", &error).await?;
            return Ok(EnumerationOutcome::Failed(scan_id));
        }

        // Phase 2: Seize.
        self.scheduler.pause_for_enumeration().await;

        let phase_outcome = self.run_seized_phases(roles, scan_id, ssid, psk).await;

        // Phase 8: Release — unconditional, regardless of how the
        // phases above concluded.
        self.release(roles).await;

        match phase_outcome {
            Ok(results) => {
                self.store.update_scan(scan_id, ScanStatus::Completed, Some(results.to_json()), results.vulnerabilities_found).await?;
                info!("🎉 [ENUMERATION]: scan #{} completed, {} vulnerabilities found.", scan_id, results.vulnerabilities_found);
                Ok(EnumerationOutcome::Completed(scan_id))
            }
            Err((error, mut results)) => {
                results.failed_phase = Some(error.to_string());
                self.store.update_scan(scan_id, ScanStatus::Failed, Some(results.to_json()), results.vulnerabilities_found).await?;
                warn!("⚠️  [ENUMERATION]: scan #{} failed: {}", scan_id, error);
                Ok(EnumerationOutcome::Failed(scan_id))
            }
        }
    }

    /// Fases 3 a 7, corridas con los recursos de radio ya seizados.
    /// Cualquier fallo devuelve el resultado parcial acumulado hasta
    /// ese punto junto con el error — nunca entra en pánico.
    async fn run_seized_phases(&self, roles: &InterfaceRole, scan_id: i64, ssid: &str, psk: &str) -> Result<PhaseResults, (EnumerationError, PhaseResults)> {
        let mut results = PhaseResults::default();

        if let Err(error) = self.associate(roles, ssid, psk).await {
            return Err((error, results));
        }

        let cidr = match self.discover_cidr(roles).await {
            Ok(cidr) => cidr,
            Err(error) => return Err((error, results)),
        };

        let live_hosts = match self.discover_live_hosts(&cidr).await {
            Ok(hosts) => hosts,
            Err(error) => return Err((error, results)),
        };
        results.live_hosts = live_hosts.clone();

        let host_records = match self.scan_hosts(&live_hosts).await {
            Ok(records) => records,
            Err(error) => return Err((error, results)),
        };
        results.hosts_scanned = live_hosts.len();

        let builtin_count = match self.apply_builtin_rules(scan_id, &host_records).await {
            Ok(count) => count,
            Err(error) => return Err((error, results)),
        };
        results.vulnerabilities_found += builtin_count;

        results.vulnerabilities_found += self.run_plugins(scan_id, &host_records).await;

        Ok(results)
    }

    async fn fail_scan(&self, scan_id: i64, phase: &str, error: &EnumerationError) -> Result<(), EnumerationError> {
        warn!("⚠️  [ENUMERATION]: scan #{} aborted in phase '{}': {}", scan_id, phase, error);
        self.store
            .update_scan(scan_id, ScanStatus::Failed, Some(serde_json::json!({ "failed_phase": phase, "error": error.to_string() })), 0)
            .await?;
        Ok(())
    }

    /// Rechaza la enumeración si la NIC de gestión está actualmente
    /// asociada al SSID objetivo — la tercera topología donde el SSH del
    /// operador podría interrumpirse (§4.G.1).
    async fn safety_check(&self, roles: &InterfaceRole, ssid: &str) -> Result<(), EnumerationError> {
        let output = self.exec.run(&["iwgetid".to_string(), roles.management.clone(), "-r".to_string()], TOOL_TIMEOUT, None).await?;
        if net_control::parse_iwgetid_ssid(&output.stdout).as_deref() == Some(ssid) {
            return Err(EnumerationError::SafetyCheck(format!("management nic is currently associated to the target ssid '{ssid}'")));
        }
        Ok(())
    }

    /// Escribe una configuración `wpa_supplicant` mínima, la asocia, y
    /// arrienda DHCP vía `dhcpcd` con `dhclient` como respaldo (§4.G.3).
    async fn associate(&self, roles: &InterfaceRole, ssid: &str, psk: &str) -> Result<(), EnumerationError> {
        self.interface_registry.set_mode(roles, &roles.attack, "managed").await?;

        let config_path = format!("/tmp/pendonn_wpa_{}.conf", roles.attack);
        let config_contents = format!("network={{\n    ssid=\"{ssid}\"\n    psk=\"{psk}\"\n}}\n");
        tokio::fs::write(&config_path, config_contents).await?;

        self.exec
            .run(&["wpa_supplicant".to_string(), "-B".to_string(), "-i".to_string(), roles.attack.clone(), "-c".to_string(), config_path], TOOL_TIMEOUT, None)
            .await?;

        let dhcp_result = self.exec.run(&["dhcpcd".to_string(), roles.attack.clone()], DHCP_TIMEOUT, None).await;
        if dhcp_result.is_err() {
            self.exec.run(&["dhclient".to_string(), roles.attack.clone()], DHCP_TIMEOUT, None).await?;
        }

        let address_output = self.exec.run(&["ip".to_string(), "addr".to_string(), "show".to_string(), roles.attack.clone()], TOOL_TIMEOUT, None).await?;
        if net_control::parse_inet_cidr(&address_output.stdout).is_none() {
            return Err(EnumerationError::AssociationFailed(roles.attack.clone()));
        }
        Ok(())
    }

    async fn discover_cidr(&self, roles: &InterfaceRole) -> Result<String, EnumerationError> {
        let output = self.exec.run(&["ip".to_string(), "addr".to_string(), "show".to_string(), roles.attack.clone()], TOOL_TIMEOUT, None).await?;
        net_control::parse_inet_cidr(&output.stdout).ok_or_else(|| EnumerationError::AssociationFailed(roles.attack.clone()))
    }

    async fn discover_live_hosts(&self, cidr: &str) -> Result<Vec<String>, EnumerationError> {
        let output = self
            .exec
            .run(&["nmap".to_string(), "-sn".to_string(), self.nmap_timing.clone(), "-oG".to_string(), "-".to_string(), cidr.to_string()], self.scan_timeout, None)
            .await?;
        Ok(nmap::parse_live_hosts(&output.stdout))
    }

    async fn scan_hosts(&self, live_hosts: &[String]) -> Result<Vec<nmap::HostPortRecord>, EnumerationError> {
        let mut records = Vec::new();
        for host in live_hosts {
            let output = self
                .exec
                .run(
                    &["nmap".to_string(), "-sV".to_string(), self.nmap_timing.clone(), "-p".to_string(), self.port_scan_range.clone(), "-oG".to_string(), "-".to_string(), host.clone()],
                    self.scan_timeout,
                    None,
                )
                .await?;
            records.extend(nmap::parse_host_port_records(&output.stdout));
        }
        Ok(records)
    }

    /// Emite una `Vulnerability` por cada puerto cubierto por una regla
    /// incorporada; un puerto 21 recibe, además, una sonda de login
    /// anónimo (§4.G.6).
    async fn apply_builtin_rules(&self, scan_id: i64, host_records: &[nmap::HostPortRecord]) -> Result<i64, EnumerationError> {
        let mut count = 0i64;
        for record in host_records {
            let Some(rule) = rules::rule_for_port(record.port) else { continue };
            self.store
                .insert_vulnerability(scan_id, &record.host, Some(record.port), rule.service, rule.vuln_type, rule.severity, rule.description, rules::BUILTIN_PLUGIN_NAME)
                .await?;
            count += 1;

            if record.port == 21 && self.probe_anonymous_ftp(&record.host).await {
                self.store
                    .insert_vulnerability(
                        scan_id,
                        &record.host,
                        Some(21),
                        "ftp",
                        "ftp-anonymous-login",
                        pendonn_domain_models::Severity::Critical,
                        "Anonymous FTP login succeeded.",
                        rules::BUILTIN_PLUGIN_NAME,
                    )
                    .await?;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn probe_anonymous_ftp(&self, host: &str) -> bool {
        self.exec
            .run(&["curl".to_string(), "--max-time".to_string(), "5".to_string(), "-s".to_string(), format!("ftp://anonymous:anonymous@{host}/")], Duration::from_secs(6), None)
            .await
            .map(|output| output.success())
            .unwrap_or(false)
    }

    /// Corre cada plugin habilitado; un panic-free error de plugin se
    /// registra y se ignora — nunca es fatal para la corrida (§6).
    async fn run_plugins(&self, scan_id: i64, host_records: &[nmap::HostPortRecord]) -> i64 {
        let mut total = 0i64;
        for plugin in &self.plugins {
            match plugin.run(scan_id, host_records, &self.store).await {
                Ok(outcome) => total += outcome.vulnerabilities as i64,
                Err(error) => warn!("⚠️  [ENUMERATION]: plugin '{}' failed: {}", plugin.descriptor().name, error),
            }
        }
        total
    }

    /// Desconecta, libera el arrendamiento DHCP, y restaura la NIC de
    /// ataque a modo monitor; si la ruta normal falla, intenta un
    /// camino de emergencia con `ifconfig`/`iwconfig` heredados antes de
    /// liberar el scheduler. Nunca entra en pánico y nunca se salta
    /// (§4.G.8).
    async fn release(&self, roles: &InterfaceRole) {
        let _ = self.exec.run(&["pkill".to_string(), "-f".to_string(), format!("wpa_supplicant.*-i {}", roles.attack)], TOOL_TIMEOUT, None).await;
        let _ = self.exec.run(&["dhcpcd".to_string(), "-k".to_string(), roles.attack.clone()], TOOL_TIMEOUT, None).await;

        if self.interface_registry.set_mode(roles, &roles.attack, "monitor").await.is_err() {
            warn!("⚠️  [ENUMERATION]: normal mode restoration failed for {}, falling back to legacy ifconfig/iwconfig.", roles.attack);
            let _ = self.exec.run(&["ifconfig".to_string(), roles.attack.clone(), "down".to_string()], TOOL_TIMEOUT, None).await;
            let _ = self.exec.run(&["iwconfig".to_string(), roles.attack.clone(), "mode".to_string(), "monitor".to_string()], TOOL_TIMEOUT, None).await;
            let _ = self.exec.run(&["ifconfig".to_string(), roles.attack.clone(), "up".to_string()], TOOL_TIMEOUT, None).await;
        }

        self.scheduler.resume_from_enumeration().await;
        info!("▶️  [ENUMERATION]: radio resources released.");
    }
}
