// [libs/domain/models/src/statistics.rs]
use serde::{Deserialize, Serialize};

/// Instantánea de conteos agregados emitida por `statistics()` del
/// almacén de evidencia. Sirve tanto al latido de estado (§4.H, cada 30s)
/// como al export/reset JSON (§6) y a la API de solo lectura hacia el
/// dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub networks_total: i64,
    pub networks_whitelisted: i64,
    pub handshakes_pending: i64,
    pub handshakes_cracking: i64,
    pub handshakes_cracked: i64,
    pub handshakes_failed: i64,
    pub cracked_keys_total: i64,
    pub scans_running: i64,
    pub scans_completed: i64,
    pub scans_failed: i64,
    pub vulnerabilities_total: i64,
}
