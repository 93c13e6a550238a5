// [libs/domain/models/src/config.rs]
/*!
 * Árbol de configuración, leído una sola vez al arranque (§6). Se
 * construye desde TOML + variables de entorno + banderas de CLI en
 * `apps/orchestrator`, y luego se congela (`Arc<Config>`) y se pasa
 * explícitamente a cada constructor — nunca se lee desde un singleton
 * global dentro de la lógica de un componente (§9 "Global-singleton
 * config").
 */

use serde::Deserialize;

const KNOWN_ENGINES: [&str; 3] = ["john", "hashcat", "aircrack-ng"];

/// Identidad de rol de interfaz. Se prefiere la resolución por MAC (las
/// placas USB se renumeran de forma impredecible entre reinicios); el
/// nombre de interfaz es un fallback heredado que el registro de
/// interfaces debe registrar con una advertencia si se usa.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub monitor_mac: Option<String>,
    pub attack_mac: Option<String>,
    pub management_mac: Option<String>,
    pub monitor_interface: Option<String>,
    pub attack_interface: Option<String>,
    pub management_interface: Option<String>,
    pub channel_hop_interval: u64,
    pub handshake_timeout: u64,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            monitor_mac: None,
            attack_mac: None,
            management_mac: None,
            monitor_interface: None,
            attack_interface: None,
            management_interface: None,
            channel_hop_interval: 5,
            handshake_timeout: 120,
        }
    }
}

/// Lista de SSIDs atacables; la lista vacía permite cualquiera (política
/// dejada al operador, ver GLOSARIO).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WhitelistConfig {
    pub ssids: Vec<String>,
}

impl WhitelistConfig {
    pub fn permits(&self, ssid: &str) -> bool {
        self.ssids.is_empty() || self.ssids.iter().any(|entry| entry == ssid)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrackingConfig {
    pub enabled: bool,
    pub engines: Vec<String>,
    pub wordlist_path: String,
    pub auto_start_cracking: bool,
    pub max_concurrent_cracks: usize,
    pub john_format: String,
    pub hashcat_mode: u32,
}

impl Default for CrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engines: vec!["john".to_string(), "hashcat".to_string(), "aircrack-ng".to_string()],
            wordlist_path: "./wordlists/rockyou.txt".to_string(),
            auto_start_cracking: true,
            max_concurrent_cracks: 2,
            john_format: "wpapsk-opencl".to_string(),
            hashcat_mode: 22000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    pub enabled: bool,
    pub auto_scan_on_crack: bool,
    pub nmap_timing: String,
    pub port_scan_range: String,
    pub scan_timeout: u64,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_scan_on_crack: true,
            nmap_timing: "-T4".to_string(),
            port_scan_range: "1-1000".to_string(),
            scan_timeout: 600,
        }
    }
}

/// Sección ambiental ausente de la tabla §6 de configuración pero
/// presente en `original_source/main.py`: rutas de filesystem y cadencia
/// del latido de estado. No es una característica excluida por los
/// Non-goals — es andamiaje operacional ambiental.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub data_dir: String,
    pub handshake_dir: String,
    pub scan_results_dir: String,
    pub status_heartbeat_interval_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            handshake_dir: "./handshakes".to_string(),
            scan_results_dir: "./scan_results".to_string(),
            status_heartbeat_interval_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub wifi: WifiConfig,
    pub whitelist: WhitelistConfig,
    pub cracking: CrackingConfig,
    pub enumeration: EnumerationConfig,
    /// No es una sección de TOML; puesto por la CLI para enrutar el
    /// adaptador de herramientas hacia el generador de respuestas
    /// simulado en vez de `tokio::process::Command` real (ver §1.4).
    #[serde(skip)]
    pub dry_run: bool,
}

impl Config {
    /// Ejecuta una sola vez al arranque. Un fallo aquí es un error de
    /// arranque duro (`std::process::exit`), siguiendo el patrón de
    /// ignición del orquestador.
    pub fn validate(&self) -> Result<(), String> {
        for engine in &self.cracking.engines {
            if !KNOWN_ENGINES.contains(&engine.as_str()) {
                return Err(format!(
                    "unrecognized cracking engine '{engine}', expected one of {KNOWN_ENGINES:?}"
                ));
            }
        }

        if self.wifi.monitor_mac.is_none() && self.wifi.monitor_interface.is_none() {
            return Err("wifi.monitor_mac or wifi.monitor_interface must be set".to_string());
        }
        if self.wifi.attack_mac.is_none() && self.wifi.attack_interface.is_none() {
            return Err("wifi.attack_mac or wifi.attack_interface must be set".to_string());
        }
        if self.wifi.management_mac.is_none() && self.wifi.management_interface.is_none() {
            return Err("wifi.management_mac or wifi.management_interface must be set".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_whitelist_permits_any_ssid() {
        let whitelist = WhitelistConfig::default();
        assert!(whitelist.permits("AnythingGoes"));
    }

    #[test]
    fn non_empty_whitelist_is_exact_match_only() {
        let whitelist = WhitelistConfig { ssids: vec!["TestNet".to_string()] };
        assert!(whitelist.permits("TestNet"));
        assert!(!whitelist.permits("OtherNet"));
    }

    #[test]
    fn validate_rejects_unknown_engine_names() {
        let mut config = Config {
            wifi: WifiConfig { monitor_mac: Some("aa:bb:cc:dd:ee:01".into()), ..Default::default() },
            ..Default::default()
        };
        config.wifi.attack_mac = Some("aa:bb:cc:dd:ee:02".into());
        config.wifi.management_mac = Some("aa:bb:cc:dd:ee:03".into());
        config.cracking.engines = vec!["john".to_string(), "pyrit".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_some_identity_for_every_role() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_a_fully_specified_config() {
        let mut config = Config::default();
        config.wifi.monitor_mac = Some("aa:bb:cc:dd:ee:01".into());
        config.wifi.attack_mac = Some("aa:bb:cc:dd:ee:02".into());
        config.wifi.management_mac = Some("aa:bb:cc:dd:ee:03".into());
        assert!(config.validate().is_ok());
    }
}
