// [libs/domain/models/src/interface.rs]
use serde::{Deserialize, Serialize};

/// Rol lógico asignado a una interfaz física. La interfaz de gestión
/// nunca aparece en otro rol y ninguna operación del núcleo puede
/// tocar su estado de enlace, modo o dirección (ver `assert_not_management`
/// en el registro de interfaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NicRole {
    Monitor,
    Attack,
    Management,
}

impl NicRole {
    pub fn as_str(self) -> &'static str {
        match self {
            NicRole::Monitor => "monitor",
            NicRole::Attack => "attack",
            NicRole::Management => "management",
        }
    }
}

impl std::fmt::Display for NicRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapeo resuelto una sola vez al arranque: rol lógico -> nombre de NIC
/// físico vigente. Transitorio, nunca persistido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRole {
    pub monitor: String,
    pub attack: String,
    pub management: String,
}

impl InterfaceRole {
    pub fn nic_for(&self, role: NicRole) -> &str {
        match role {
            NicRole::Monitor => &self.monitor,
            NicRole::Attack => &self.attack,
            NicRole::Management => &self.management,
        }
    }

    /// Verdadero si `nic` coincide con la interfaz de gestión bajo
    /// cualquier rol conocido. Todo sitio de llamada que reciba un nombre
    /// de NIC externo debe consultar esto antes de mutarlo.
    pub fn is_management(&self, nic: &str) -> bool {
        nic == self.management
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InterfaceRole {
        InterfaceRole {
            monitor: "wlan0mon".to_string(),
            attack: "wlan1".to_string(),
            management: "eth0".to_string(),
        }
    }

    #[test]
    fn management_nic_is_recognized_regardless_of_role_queried() {
        let roles = sample();
        assert!(roles.is_management("eth0"));
        assert!(!roles.is_management("wlan0mon"));
        assert!(!roles.is_management("wlan1"));
    }

    #[test]
    fn nic_for_returns_the_current_mapping() {
        let roles = sample();
        assert_eq!(roles.nic_for(NicRole::Monitor), "wlan0mon");
        assert_eq!(roles.nic_for(NicRole::Attack), "wlan1");
        assert_eq!(roles.nic_for(NicRole::Management), "eth0");
    }
}
