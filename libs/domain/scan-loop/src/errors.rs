// [libs/domain/scan-loop/src/errors.rs]
use pendonn_core_interface_registry::InterfaceRegistryError;
use pendonn_domain_models::OperationalFault;
use pendonn_infra_evidence_store::EvidenceStoreError;
use pendonn_infra_tool_adapter::ToolAdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanLoopError {
    #[error("tool invocation failed: {0}")]
    Tool(#[from] ToolAdapterError),

    #[error("interface safety gate refused this operation: {0}")]
    InterfaceRegistry(#[from] InterfaceRegistryError),

    #[error("evidence store write failed: {0}")]
    Store(#[from] EvidenceStoreError),

    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ScanLoopError> for OperationalFault {
    fn from(error: ScanLoopError) -> Self {
        match error {
            ScanLoopError::Tool(e) => e.into(),
            ScanLoopError::InterfaceRegistry(e) => e.into(),
            ScanLoopError::Store(e) => e.into(),
            ScanLoopError::Io(e) => OperationalFault::ToolFailure { benign: false, message: e.to_string() },
        }
    }
}
