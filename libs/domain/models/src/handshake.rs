// [libs/domain/models/src/handshake.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estado de un handshake capturado. Las transiciones forman un DAG sin
/// ciclos: `pending -> cracking -> {cracked, failed}`. Cualquier otra
/// transición es un `StoreConflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeStatus {
    Pending,
    Cracking,
    Cracked,
    Failed,
}

impl HandshakeStatus {
    /// Verdadero si la transición `self -> next` está permitida por el DAG
    /// de estados del §4.B.
    pub fn can_transition_to(self, next: HandshakeStatus) -> bool {
        matches!(
            (self, next),
            (HandshakeStatus::Pending, HandshakeStatus::Cracking)
                | (HandshakeStatus::Cracking, HandshakeStatus::Cracked)
                | (HandshakeStatus::Cracking, HandshakeStatus::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandshakeStatus::Pending => "pending",
            HandshakeStatus::Cracking => "cracking",
            HandshakeStatus::Cracked => "cracked",
            HandshakeStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(HandshakeStatus::Pending),
            "cracking" => Some(HandshakeStatus::Cracking),
            "cracked" => Some(HandshakeStatus::Cracked),
            "failed" => Some(HandshakeStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for HandshakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calidad asignada al artefacto de captura en el momento de su inserción.
/// No es una garantía de contenido criptográfico — solo una nota heurística
/// del capturador (p.ej. si la segunda ráfaga de deauth llegó a enviarse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeQuality {
    Good,
    Unknown,
}

impl HandshakeQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            HandshakeQuality::Good => "good",
            HandshakeQuality::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "good" => HandshakeQuality::Good,
            _ => HandshakeQuality::Unknown,
        }
    }
}

/// Un handshake WPA/WPA2 de cuatro vías capturado contra un BSSID.
/// Invariante: el archivo referenciado debe existir y pesar ≥ 1024 bytes
/// cuando el estado transiciona fuera de `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handshake {
    pub id: i64,
    pub network_id: i64,
    pub bssid: String,
    pub ssid: String,
    /// Ruta absoluta al artefacto `.cap`.
    pub file_path: String,
    pub capture_date: DateTime<Utc>,
    pub status: HandshakeStatus,
    pub quality: HandshakeQuality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dag_permits_only_the_documented_edges() {
        use HandshakeStatus::*;
        let all = [Pending, Cracking, Cracked, Failed];
        let mut allowed_edges = Vec::new();
        for &from in &all {
            for &to in &all {
                if from.can_transition_to(to) {
                    allowed_edges.push((from, to));
                }
            }
        }
        assert_eq!(
            allowed_edges,
            vec![(Pending, Cracking), (Cracking, Cracked), (Cracking, Failed)]
        );
    }

    #[test]
    fn terminal_states_accept_no_further_transition() {
        use HandshakeStatus::*;
        for terminal in [Cracked, Failed] {
            for &to in &[Pending, Cracking, Cracked, Failed] {
                assert!(!terminal.can_transition_to(to));
            }
        }
    }
}
