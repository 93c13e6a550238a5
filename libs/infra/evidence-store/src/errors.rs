// [libs/infra/evidence-store/src/errors.rs]
use pendonn_domain_models::OperationalFault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvidenceStoreError {
    #[error("[L3_DB_NET_FAULT]: database link could not be established -> {0}")]
    ConnectionError(String),

    #[error("[L3_DB_QUERY_FAULT]: query rejected by the storage engine -> {0}")]
    QueryError(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT]: row could not be mapped to a domain type -> {0}")]
    MappingError(String),

    #[error("[L3_HANDSHAKE_FAULT]: no handshake row with id {0}")]
    HandshakeNotFound(i64),

    #[error("[L3_HANDSHAKE_FAULT]: status transition {from} -> {to} is not permitted")]
    InvalidStatusTransition { from: String, to: String },

    #[error("[L3_IO_FAULT]: {0}")]
    Io(#[from] std::io::Error),

    #[error("[L3_JSON_FAULT]: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<EvidenceStoreError> for OperationalFault {
    fn from(error: EvidenceStoreError) -> Self {
        match error {
            EvidenceStoreError::InvalidStatusTransition { .. } => {
                OperationalFault::StoreConflict(error.to_string())
            }
            other => OperationalFault::StoreConflict(other.to_string()),
        }
    }
}
