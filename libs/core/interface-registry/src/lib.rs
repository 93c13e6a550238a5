// [libs/core/interface-registry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: INTERFACE REGISTRY (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: CORE SAFETY GATE (ESTRATO L1)
 * RESPONSABILIDAD: RESOLUCIÓN DE ROLES DE NIC Y GOBERNANZA DE MODO
 *
 * VISION HIPER-HOLÍSTICA:
 * El único aparato autorizado a abortar el proceso (§7, §9). Toda
 * mutación de una interfaz física pasa por `assert_not_management`
 * primero — esa es la compuerta de seguridad no negociable.
 * =================================================================
 */

pub mod errors;
pub mod parsing;

pub use errors::InterfaceRegistryError;

use pendonn_domain_models::{InterfaceRole, WifiConfig};
use pendonn_infra_tool_adapter::Exec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

const TOOL_TIMEOUT: Duration = Duration::from_secs(5);

/// Instantánea del modo de cada NIC no-gestión al arranque, usada para
/// verificar la restauración en el apagado (§8 "After any crash or
/// stop...").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceModeSnapshot {
    pub monitor_mode: String,
    pub attack_mode: String,
}

pub struct InterfaceRegistry<E: Exec> {
    exec: Arc<E>,
}

impl<E: Exec> InterfaceRegistry<E> {
    pub fn new(exec: Arc<E>) -> Self {
        Self { exec }
    }

    /// Resuelve los tres roles lógicos a nombres de NIC físicos vigentes
    /// (§4.A). Prioriza identidad por MAC; cae a nombre de interfaz
    /// heredado con una advertencia si la MAC no está configurada.
    #[instrument(skip(self, config))]
    pub async fn resolve(&self, config: &WifiConfig) -> Result<InterfaceRole, InterfaceRegistryError> {
        let mac_to_name = self.enumerate_mac_to_name_mapping().await?;

        let monitor = self.resolve_role(
            "monitor",
            config.monitor_mac.as_deref(),
            config.monitor_interface.as_deref(),
            &mac_to_name,
        )?;
        let attack = self.resolve_role(
            "attack",
            config.attack_mac.as_deref(),
            config.attack_interface.as_deref(),
            &mac_to_name,
        )?;
        let management = self.resolve_role(
            "management",
            config.management_mac.as_deref(),
            config.management_interface.as_deref(),
            &mac_to_name,
        )?;

        if monitor == attack || monitor == management || attack == management {
            let colliding = if monitor == attack { &monitor } else if monitor == management { &monitor } else { &attack };
            return Err(InterfaceRegistryError::DuplicateRole { nic: colliding.clone() });
        }

        Ok(InterfaceRole { monitor, attack, management })
    }

    fn resolve_role(
        &self,
        role_name: &str,
        mac: Option<&str>,
        legacy_name: Option<&str>,
        mapping: &HashMap<String, String>,
    ) -> Result<String, InterfaceRegistryError> {
        if let Some(mac) = mac {
            return mapping
                .get(&mac.to_lowercase())
                .cloned()
                .ok_or_else(|| InterfaceRegistryError::MacNotFound(mac.to_string()));
        }
        if let Some(name) = legacy_name {
            warn!(
                "⚠️  [LEGACY_FALLBACK]: role '{}' resolved via configured interface name '{}' instead of MAC identity.",
                role_name, name
            );
            return Ok(name.to_string());
        }
        Err(InterfaceRegistryError::RoleUnresolved(role_name.to_string()))
    }

    async fn enumerate_mac_to_name_mapping(&self) -> Result<HashMap<String, String>, InterfaceRegistryError> {
        let output = self
            .exec
            .run(&["ip".into(), "-o".into(), "link".into(), "show".into()], TOOL_TIMEOUT, None)
            .await?;
        Ok(parsing::parse_ip_link_show(&output.stdout))
    }

    /// La compuerta de seguridad no negociable: falla con `HostSafety`
    /// si `nic` coincide con la interfaz de gestión bajo cualquier rol.
    pub fn assert_not_management(&self, roles: &InterfaceRole, nic: &str) -> Result<(), InterfaceRegistryError> {
        if roles.is_management(nic) {
            return Err(InterfaceRegistryError::ManagementNicViolation(nic.to_string()));
        }
        Ok(())
    }

    async fn current_mode(&self, nic: &str) -> Result<String, InterfaceRegistryError> {
        let output = self
            .exec
            .run(&["iw".into(), "dev".into(), nic.into(), "info".into()], TOOL_TIMEOUT, None)
            .await?;
        Ok(parsing::parse_iw_dev_mode(&output.stdout).unwrap_or_else(|| "unknown".to_string()))
    }

    /// Cambia el modo de `nic` (`monitor`/`managed`), pasando siempre
    /// primero por `assert_not_management`.
    #[instrument(skip(self, roles))]
    pub async fn set_mode(&self, roles: &InterfaceRole, nic: &str, mode: &str) -> Result<(), InterfaceRegistryError> {
        self.assert_not_management(roles, nic)?;
        self.exec.run(&["ip".into(), "link".into(), "set".into(), nic.into(), "down".into()], TOOL_TIMEOUT, None).await?;
        self.exec
            .run(&["iw".into(), "dev".into(), nic.into(), "set".into(), "type".into(), mode.into()], TOOL_TIMEOUT, None)
            .await?;
        self.exec.run(&["ip".into(), "link".into(), "set".into(), nic.into(), "up".into()], TOOL_TIMEOUT, None).await?;
        Ok(())
    }

    /// Registra el modo de arranque de las NICs monitor/ataque. La NIC de
    /// gestión nunca se consulta aquí — ni siquiera en modo lectura hace
    /// falta, y el invariante es que nunca se la toca en absoluto.
    pub async fn snapshot_initial_modes(&self, roles: &InterfaceRole) -> Result<InterfaceModeSnapshot, InterfaceRegistryError> {
        Ok(InterfaceModeSnapshot {
            monitor_mode: self.current_mode(&roles.monitor).await?,
            attack_mode: self.current_mode(&roles.attack).await?,
        })
    }

    /// Verifica que ambas NICs hayan vuelto al modo que tenían al
    /// arranque (§8 invariant). No aborta el proceso por sí mismo — el
    /// llamador decide cómo registrar una discrepancia durante el apagado.
    pub async fn assert_restored(
        &self,
        roles: &InterfaceRole,
        snapshot: &InterfaceModeSnapshot,
    ) -> Result<(), InterfaceRegistryError> {
        let monitor_now = self.current_mode(&roles.monitor).await?;
        if monitor_now != snapshot.monitor_mode {
            return Err(InterfaceRegistryError::ModeNotRestored {
                nic: roles.monitor.clone(),
                expected: snapshot.monitor_mode.clone(),
                actual: monitor_now,
            });
        }

        let attack_now = self.current_mode(&roles.attack).await?;
        if attack_now != snapshot.attack_mode {
            return Err(InterfaceRegistryError::ModeNotRestored {
                nic: roles.attack.clone(),
                expected: snapshot.attack_mode.clone(),
                actual: attack_now,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pendonn_infra_tool_adapter::{CommandOutput, MockExec};

    fn config_with(monitor_mac: &str, attack_mac: &str, management_mac: &str) -> WifiConfig {
        let mut config = WifiConfig::default();
        config.monitor_mac = Some(monitor_mac.to_string());
        config.attack_mac = Some(attack_mac.to_string());
        config.management_mac = Some(management_mac.to_string());
        config
    }

    fn mock_with_link_show() -> Arc<MockExec> {
        let mock = Arc::new(MockExec::new());
        mock.set_response(
            "ip",
            CommandOutput {
                exit_code: 0,
                stdout: concat!(
                    "2: eth0: <UP> mtu 1500\\    link/ether aa:bb:cc:dd:ee:03 brd ff:ff:ff:ff:ff:ff\n",
                    "3: wlan0: <UP> mtu 1500\\    link/ether aa:bb:cc:dd:ee:01 brd ff:ff:ff:ff:ff:ff\n",
                    "4: wlan1: <UP> mtu 1500\\    link/ether aa:bb:cc:dd:ee:02 brd ff:ff:ff:ff:ff:ff\n",
                )
                .to_string(),
                stderr: String::new(),
                elapsed: Duration::from_millis(1),
            },
        );
        mock
    }

    #[tokio::test]
    async fn resolve_maps_configured_macs_to_current_interface_names() {
        let exec = mock_with_link_show();
        let registry = InterfaceRegistry::new(exec);
        let config = config_with("aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:02", "aa:bb:cc:dd:ee:03");

        let roles = registry.resolve(&config).await.unwrap();
        assert_eq!(roles.monitor, "wlan0");
        assert_eq!(roles.attack, "wlan1");
        assert_eq!(roles.management, "eth0");
    }

    #[tokio::test]
    async fn resolve_fails_hard_when_a_mac_is_not_present_on_the_host() {
        let exec = mock_with_link_show();
        let registry = InterfaceRegistry::new(exec);
        let config = config_with("aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:02", "aa:bb:cc:dd:ee:99");

        let result = registry.resolve(&config).await;
        assert!(matches!(result, Err(InterfaceRegistryError::MacNotFound(_))));
    }

    #[tokio::test]
    async fn resolve_rejects_a_config_where_two_roles_collide_on_the_same_nic() {
        let exec = mock_with_link_show();
        let registry = InterfaceRegistry::new(exec);
        // monitor and attack both configured to the same physical MAC.
        let config = config_with("aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:03");

        let result = registry.resolve(&config).await;
        assert!(matches!(result, Err(InterfaceRegistryError::DuplicateRole { .. })));
    }

    #[tokio::test]
    async fn assert_not_management_refuses_the_management_nic() {
        let exec = mock_with_link_show();
        let registry = InterfaceRegistry::new(exec);
        let config = config_with("aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:02", "aa:bb:cc:dd:ee:03");
        let roles = registry.resolve(&config).await.unwrap();

        assert!(registry.assert_not_management(&roles, "wlan0").is_ok());
        assert!(matches!(
            registry.assert_not_management(&roles, "eth0"),
            Err(InterfaceRegistryError::ManagementNicViolation(_))
        ));
    }
}
