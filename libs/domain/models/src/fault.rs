// [libs/domain/models/src/fault.rs]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Taxonomía de fallos transversal (§7). Los errores tipados
/// específicos de cada crate (`InterfaceRegistryError`, `ToolAdapterError`,
/// etc.) se convierten en, o se envuelven alrededor de, una de estas
/// variantes para que el orquestador pueda clasificar cualquier fallo
/// sin hacer match sobre tipos privados de otro crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum OperationalFault {
    /// La única categoría fatal: un intento de mutar el NIC de gestión, o
    /// de enumerar el SSID actualmente asociado. Sin recuperación; el
    /// único sitio autorizado a abortar el proceso sobre esta variante es
    /// el registro de interfaces.
    #[error("host safety violation: {0}")]
    HostSafety(String),

    /// Binario externo requerido ausente. Acotado al motor afectado; el
    /// orquestador continúa con los motores restantes.
    #[error("required external tool missing: {0}")]
    ToolMissing(String),

    /// Salida de herramienta con código distinto de cero o malformada.
    /// `benign = true` marca fallos reintentables conocidos (p.ej.
    /// `ioctl(SIOCSIWMODE) failed`); se registran a nivel debug en vez de
    /// warning y nunca abortan el componente.
    #[error("tool invocation failed (benign={benign}): {message}")]
    ToolFailure { benign: bool, message: String },

    /// Aún no hay handshake. Normal; continuar sondeando.
    #[error("verification negative: {0}")]
    VerificationNegative(String),

    /// Operación excedió su presupuesto de tiempo.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Conflicto de estado en el almacén, p.ej. una transición ilegal.
    /// Clase de bug; abortar la operación y registrar a nivel error.
    #[error("store conflict: {0}")]
    StoreConflict(String),

    /// Apagado cooperativo solicitado. No es un error; se propaga en
    /// silencio.
    #[error("operation cancelled")]
    Cancelled,
}

impl OperationalFault {
    /// Verdadero solo para `HostSafety` — la única variante autorizada a
    /// abortar el proceso (§7, §9).
    pub fn is_fatal(&self) -> bool {
        matches!(self, OperationalFault::HostSafety(_))
    }

    pub fn is_benign(&self) -> bool {
        matches!(self, OperationalFault::ToolFailure { benign: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_host_safety_is_fatal() {
        assert!(OperationalFault::HostSafety("test".into()).is_fatal());
        assert!(!OperationalFault::ToolMissing("john".into()).is_fatal());
        assert!(!OperationalFault::Timeout("capture".into()).is_fatal());
        assert!(!OperationalFault::Cancelled.is_fatal());
    }
}
