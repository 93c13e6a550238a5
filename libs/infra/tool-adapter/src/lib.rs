// [libs/infra/tool-adapter/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TOOL ADAPTER (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L2)
 * RESPONSABILIDAD: FACHADA DE SUBPROCESOS Y PARSERS DE SALIDA
 *
 * Fachada uniforme sobre cada binario externo que el núcleo invoca
 * (airodump-ng, aireplay-ng, hcxpcapngtool, hcx2john, john, hashcat,
 * aircrack-ng, wpa_supplicant, dhclient/dhcpcd, iw, ip, nmap). Nunca
 * hace pánico; toda clasificación de fallo se traduce a
 * `OperationalFault` (§7) en la frontera del componente que la invoca.
 * =================================================================
 */

pub mod errors;
pub mod exec;
pub mod parsers;

pub use errors::ToolAdapterError;
pub use exec::{CommandOutput, DefaultExec, Exec, MockExec, MockSpawnedProcess, SpawnedProcess};
