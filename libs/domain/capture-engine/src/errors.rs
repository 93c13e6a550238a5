// [libs/domain/capture-engine/src/errors.rs]
use pendonn_core_interface_registry::InterfaceRegistryError;
use pendonn_domain_models::OperationalFault;
use pendonn_domain_scheduler::SchedulerError;
use pendonn_infra_evidence_store::EvidenceStoreError;
use pendonn_infra_tool_adapter::ToolAdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureEngineError {
    #[error("scheduler refused this capture: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("interface safety gate refused this operation: {0}")]
    InterfaceRegistry(#[from] InterfaceRegistryError),

    #[error("tool invocation failed: {0}")]
    Tool(#[from] ToolAdapterError),

    #[error("evidence store write failed: {0}")]
    Store(#[from] EvidenceStoreError),

    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture for {0} timed out without a verified handshake")]
    TimedOut(String),
}

impl From<CaptureEngineError> for OperationalFault {
    fn from(error: CaptureEngineError) -> Self {
        match error {
            CaptureEngineError::Scheduler(e) => OperationalFault::ToolFailure { benign: true, message: e.to_string() },
            CaptureEngineError::InterfaceRegistry(e) => e.into(),
            CaptureEngineError::Tool(e) => e.into(),
            CaptureEngineError::Store(e) => e.into(),
            CaptureEngineError::Io(e) => OperationalFault::ToolFailure { benign: false, message: e.to_string() },
            CaptureEngineError::TimedOut(bssid) => OperationalFault::Timeout(format!("handshake capture against {bssid}")),
        }
    }
}
