// [libs/domain/enumeration/src/errors.rs]
use pendonn_core_interface_registry::InterfaceRegistryError;
use pendonn_domain_models::OperationalFault;
use pendonn_infra_evidence_store::EvidenceStoreError;
use pendonn_infra_tool_adapter::ToolAdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("interface registry refused the operation: {0}")]
    Interface(#[from] InterfaceRegistryError),

    #[error("tool invocation failed: {0}")]
    Tool(#[from] ToolAdapterError),

    #[error("evidence store write failed: {0}")]
    Store(#[from] EvidenceStoreError),

    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("safety check refused enumeration: {0}")]
    SafetyCheck(String),

    #[error("association to {0} did not yield a DHCP lease")]
    AssociationFailed(String),
}

impl From<EnumerationError> for OperationalFault {
    fn from(error: EnumerationError) -> Self {
        match error {
            EnumerationError::Interface(e) => e.into(),
            EnumerationError::Tool(e) => e.into(),
            EnumerationError::Store(e) => e.into(),
            EnumerationError::Io(e) => OperationalFault::ToolFailure { benign: false, message: e.to_string() },
            EnumerationError::SafetyCheck(detail) => OperationalFault::HostSafety(detail),
            EnumerationError::AssociationFailed(detail) => OperationalFault::ToolFailure { benign: false, message: detail },
        }
    }
}
