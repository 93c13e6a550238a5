// [libs/infra/tool-adapter/src/errors.rs]
use pendonn_domain_models::OperationalFault;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolAdapterError {
    #[error("io failure spawning process: {0}")]
    Io(#[from] std::io::Error),

    #[error("tool '{0}' is not installed or not on PATH")]
    ToolMissing(String),

    #[error("tool invocation exceeded its timeout: {0}")]
    Timeout(String),

    #[error("tool '{tool}' exited with code {code}: {stderr}")]
    NonZeroExit { tool: String, code: i32, stderr: String },

    #[error("could not parse tool output: {0}")]
    ParseError(String),
}

impl From<ToolAdapterError> for OperationalFault {
    fn from(error: ToolAdapterError) -> Self {
        match error {
            ToolAdapterError::ToolMissing(tool) => OperationalFault::ToolMissing(tool),
            ToolAdapterError::Timeout(detail) => OperationalFault::Timeout(detail),
            ToolAdapterError::NonZeroExit { tool, code, stderr } => OperationalFault::ToolFailure {
                benign: is_benign_stderr(&stderr),
                message: format!("{tool} exited {code}: {stderr}"),
            },
            ToolAdapterError::Io(io_error) => OperationalFault::ToolFailure {
                benign: false,
                message: io_error.to_string(),
            },
            ToolAdapterError::ParseError(detail) => OperationalFault::ToolFailure {
                benign: false,
                message: detail,
            },
        }
    }
}

/// Phrases known to indicate a retry-able, non-terminal tool failure
/// (§7 `ToolFailure { benign }`), e.g. a transient wireless-extensions
/// ioctl raciness rather than a genuine capability failure.
pub fn is_benign_stderr(stderr: &str) -> bool {
    stderr.contains("Operation not permitted") || stderr.contains("ioctl(SIOCSIWMODE) failed")
}
