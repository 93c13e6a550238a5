// [libs/domain/enumeration/src/plugin.rs]
/*!
 * Contrato de plugins de vulnerabilidad (§6 "Plugin contract"). El
 * núcleo solo orquesta: descubre hosts, corre las reglas incorporadas
 * (§4.G.6), y entrega el mismo conjunto de hosts a cada plugin
 * habilitado con una manija de capacidad hacia el almacén de evidencia.
 * Las implementaciones concretas de plugin están fuera de este árbol.
 */

use crate::errors::EnumerationError;
use pendonn_infra_evidence_store::EvidenceStore;
use pendonn_infra_tool_adapter::parsers::nmap::HostPortRecord;

/// Metadatos declarados junto a cada plugin; el cargador solo conserva
/// los que declaran `enabled = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PluginOutcome {
    pub vulnerabilities: u32,
}

/// Un escáner de vulnerabilidad fuera-del-árbol. Recibe el conjunto de
/// hosts descubiertos y una manija hacia el almacén para insertar sus
/// propios hallazgos bajo su propio `plugin_name`.
#[async_trait::async_trait]
pub trait VulnerabilityPlugin: Send + Sync {
    fn descriptor(&self) -> &PluginDescriptor;

    async fn run(&self, scan_id: i64, hosts: &[HostPortRecord], store: &EvidenceStore) -> Result<PluginOutcome, EnumerationError>;
}
