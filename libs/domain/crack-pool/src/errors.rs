// [libs/domain/crack-pool/src/errors.rs]
use pendonn_domain_models::OperationalFault;
use pendonn_infra_evidence_store::EvidenceStoreError;
use pendonn_infra_tool_adapter::ToolAdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrackPoolError {
    #[error("tool invocation failed: {0}")]
    Tool(#[from] ToolAdapterError),

    #[error("evidence store write failed: {0}")]
    Store(#[from] EvidenceStoreError),

    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CrackPoolError> for OperationalFault {
    fn from(error: CrackPoolError) -> Self {
        match error {
            CrackPoolError::Tool(e) => e.into(),
            CrackPoolError::Store(e) => e.into(),
            CrackPoolError::Io(e) => OperationalFault::ToolFailure { benign: false, message: e.to_string() },
        }
    }
}
