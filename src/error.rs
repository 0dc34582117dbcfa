//! Error types for the provisioning workflow.
//!
//! No `anyhow` leakage. Explicit, typed errors.

use crate::types::{BackendError, ReversalReport};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Principal resolution produced zero or multiple matches. Fatal, no retry.
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// The backend reported success but one or more expected outputs are
    /// missing. Indicates a template/contract mismatch and must never be
    /// papered over.
    #[error("deployment reported success but required outputs are missing: {0}")]
    DeploymentIncomplete(String),

    #[error("base deployment failed: {0}")]
    BaseDeploymentFailed(BackendError),

    #[error("dependent deployment failed: {0}")]
    DependentDeploymentFailed(BackendError),

    /// Caller-specified deadline exceeded. Distinct from a backend-reported
    /// failure: resources may have been created and must be reconciled on
    /// the next run.
    #[error("provisioning timed out after {0:?}")]
    ProvisioningTimeout(Duration),

    /// One or more dependent-resource deletions failed. The scope deletion
    /// was still attempted; the report lists every failed item.
    #[error("reversal completed with {} failed deletion(s)", .0.failures.len())]
    ReversalPartialFailure(ReversalReport),

    #[error("invalid workflow state: {0}")]
    InvalidState(String),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("parameter error: {0}")]
    Parameter(String),
}

impl ProvisionError {
    /// Whether this error might be recoverable by retry.
    ///
    /// A dependent-deployment name collision is retryable with a freshly
    /// generated name; transport-level backend errors and timeouts may
    /// succeed on a later run after reconciliation.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProvisionError::DependentDeploymentFailed(err) => err.is_name_collision(),
            ProvisionError::Backend(_) | ProvisionError::ProvisioningTimeout(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_err(code: &str, message: &str) -> BackendError {
        BackendError {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ProvisionError::IdentityNotFound("no match for 'alice'".to_string());
        assert_eq!(err.to_string(), "identity not found: no match for 'alice'");

        let err = ProvisionError::DeploymentIncomplete("primarySubnetId".to_string());
        assert!(err.to_string().contains("primarySubnetId"));
        assert!(err.to_string().contains("required outputs are missing"));

        let err = ProvisionError::BaseDeploymentFailed(backend_err("Quota", "vnet quota hit"));
        assert!(err.to_string().contains("base deployment failed"));
        assert!(err.to_string().contains("vnet quota hit"));

        let err = ProvisionError::ProvisioningTimeout(Duration::from_secs(30));
        assert!(err.to_string().contains("timed out"));

        let err = ProvisionError::InvalidState("bad transition".to_string());
        assert_eq!(err.to_string(), "invalid workflow state: bad transition");

        let err = ProvisionError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn test_error_is_retryable() {
        let collision =
            ProvisionError::DependentDeploymentFailed(backend_err("Conflict", "name in use"));
        assert!(collision.is_retryable());

        let other =
            ProvisionError::DependentDeploymentFailed(backend_err("PolicyInvalid", "bad subnet"));
        assert!(!other.is_retryable());

        assert!(
            ProvisionError::Backend(backend_err("Transport", "connection reset")).is_retryable()
        );
        assert!(ProvisionError::ProvisioningTimeout(Duration::from_secs(1)).is_retryable());

        assert!(!ProvisionError::IdentityNotFound("x".to_string()).is_retryable());
        assert!(!ProvisionError::DeploymentIncomplete("x".to_string()).is_retryable());
        assert!(!ProvisionError::InvalidState("x".to_string()).is_retryable());
    }
}
