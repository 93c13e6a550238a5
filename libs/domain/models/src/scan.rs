// [libs/domain/models/src/scan.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "running" => Some(ScanStatus::Running),
            "completed" => Some(ScanStatus::Completed),
            "failed" => Some(ScanStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tipo de escaneo de enumeración. Hoy el núcleo solo corre el tipo
/// `LanEnumeration` (host discovery + port scan + plugins), pero el tipo
/// es un sum type abierto para que la capa de dashboard pueda distinguir
/// variantes futuras sin tocar el núcleo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    LanEnumeration,
}

impl ScanType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanType::LanEnumeration => "lan_enumeration",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "lan_enumeration" => Some(ScanType::LanEnumeration),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Una ejecución de la fase de enumeración contra una red con llave
/// recuperada. A lo sumo un Scan por (bssid, scan_type) completado con
/// éxito (ver invariante de `should_trigger_new_scan` en el repositorio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: i64,
    pub network_id: i64,
    pub ssid: String,
    pub scan_type: ScanType,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: ScanStatus,
    /// Blob JSON opaco escrito en la finalización; puede contener un
    /// resultado parcial si una fase intermedia falló.
    pub results: Option<serde_json::Value>,
    pub vulnerabilities_found: i64,
}
