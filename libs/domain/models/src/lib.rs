// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L1)
 * RESPONSABILIDAD: SINGLE SOURCE OF TRUTH DE ENTIDADES Y CONFIGURACIÓN
 *
 * Ningún dato de dominio cruza una frontera de componente como cadena
 * libre: toda enumeración (cifrado, estado, severidad, motor) es un
 * sum type exhaustivo definido aquí.
 * =================================================================
 */

pub mod capture_session;
pub mod config;
pub mod fault;
pub mod handshake;
pub mod interface;
pub mod network;
pub mod scan;
pub mod statistics;
pub mod vulnerability;

pub use capture_session::{CaptureSession, CaptureState, DeauthOutcome};
pub use config::{
    Config, CrackingConfig, EnumerationConfig, GeneralConfig, WhitelistConfig, WifiConfig,
};
pub use fault::OperationalFault;
pub use handshake::{Handshake, HandshakeQuality, HandshakeStatus};
pub use interface::{InterfaceRole, NicRole};
pub use network::{Encryption, Network};
pub use scan::{Scan, ScanStatus, ScanType};
pub use statistics::Statistics;
pub use vulnerability::{Severity, Vulnerability};
