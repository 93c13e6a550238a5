// [libs/core/interface-registry/src/errors.rs]
use pendonn_domain_models::OperationalFault;
use pendonn_infra_tool_adapter::ToolAdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterfaceRegistryError {
    #[error(transparent)]
    ToolAdapter(#[from] ToolAdapterError),

    #[error("no network interface currently carries MAC address {0}")]
    MacNotFound(String),

    #[error("role '{0}' has neither a MAC nor a legacy interface name configured")]
    RoleUnresolved(String),

    #[error("refused: operation targeted the management NIC '{0}'")]
    ManagementNicViolation(String),

    #[error("interface '{nic}' resolved to more than one role (at least 'monitor'/'attack'/'management' collide)")]
    DuplicateRole { nic: String },

    #[error("interface '{nic}' was not restored to its startup mode '{expected}' (currently '{actual}')")]
    ModeNotRestored { nic: String, expected: String, actual: String },
}

impl From<InterfaceRegistryError> for OperationalFault {
    fn from(error: InterfaceRegistryError) -> Self {
        match error {
            InterfaceRegistryError::ManagementNicViolation(nic) => {
                OperationalFault::HostSafety(format!("attempted operation on management NIC '{nic}'"))
            }
            InterfaceRegistryError::DuplicateRole { nic } => {
                OperationalFault::HostSafety(format!("monitor/attack/management roles are not mutually distinct, '{nic}' is shared"))
            }
            // §4.A: "If any lookup fails, return a hard error" — an
            // unresolved role is escalated to the same fatal category as
            // a management-NIC violation, since continuing would risk
            // guessing wrong about which physical NIC is safe to touch.
            InterfaceRegistryError::MacNotFound(mac) => {
                OperationalFault::HostSafety(format!("could not resolve configured MAC '{mac}' to a live interface"))
            }
            InterfaceRegistryError::RoleUnresolved(role) => {
                OperationalFault::HostSafety(format!("interface role '{role}' has no identity configured"))
            }
            InterfaceRegistryError::ToolAdapter(tool_error) => tool_error.into(),
            InterfaceRegistryError::ModeNotRestored { nic, expected, actual } => OperationalFault::ToolFailure {
                benign: false,
                message: format!("interface '{nic}' was not restored to '{expected}' (currently '{actual}')"),
            },
        }
    }
}
