//! Minimal domain types for the provisioning workflow.
//!
//! These are the types the workflow engine needs. Nothing more.
//! If you're adding types here, ask yourself if the workflow
//! actually needs them or if you're just being clever.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Deployment parameters and outputs, keyed by the template's contract names.
pub type ParameterMap = BTreeMap<String, String>;

/// The addressable boundary under which resources are created, listed and
/// deleted as a unit. Passed explicitly to every backend call — there is no
/// ambient "current subscription" state to cross-contaminate runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub subscription_id: String,
    pub resource_group: String,
}

impl Scope {
    pub fn new(subscription_id: impl Into<String>, resource_group: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subscription_id, self.resource_group)
    }
}

/// Opaque reference to a deployment template known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef(String);

impl TemplateRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deployment submission. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub template: TemplateRef,
    pub scope: Scope,
    pub parameters: ParameterMap,
    /// Caller deadline. `None` leaves timeouts to the backend.
    pub timeout: Option<Duration>,
}

/// Final state of a deployment as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    Succeeded,
    Failed,
    Canceled,
}

/// Structured error from the provisioning backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct BackendError {
    pub code: String,
    pub message: String,
}

/// Error codes the backend uses when a resource name is already taken.
/// The backend's "already exists" error is the authoritative collision
/// signal — there is no client-side uniqueness tracking.
const NAME_COLLISION_CODES: &[&str] = &["Conflict", "AlreadyExists", "ResourceAlreadyExists"];

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_name_collision(&self) -> bool {
        NAME_COLLISION_CODES.contains(&self.code.as_str())
    }
}

/// Outcome of a deployment. Produced exactly once per request, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub status: DeploymentStatus,
    pub outputs: ParameterMap,
    pub error: Option<BackendError>,
}

impl DeploymentResult {
    pub fn succeeded(outputs: ParameterMap) -> Self {
        Self {
            status: DeploymentStatus::Succeeded,
            outputs,
            error: None,
        }
    }

    pub fn failed(error: BackendError) -> Self {
        Self {
            status: DeploymentStatus::Failed,
            outputs: ParameterMap::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DeploymentStatus::Succeeded
    }

    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }
}

/// A provisioned entity. Owned by the backend; the orchestrator and the
/// record store only ever hold references to its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub resource_type: String,
    pub name: String,
    /// Opaque backend-assigned identifier.
    pub id: String,
    pub region: String,
}

/// Poll handle for an asynchronous scope deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionHandle {
    pub operation_id: String,
}

/// Stable identifier of an acting principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dependent-resource deletion that failed during reversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReversalFailure {
    pub handle: ResourceHandle,
    pub error: BackendError,
}

/// Per-item results of the dependent-resource deletion pass. A single
/// un-deletable resource must not block deletion of the rest, so failures
/// accumulate here instead of aborting the reversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReversalReport {
    pub deleted: Vec<ResourceHandle>,
    pub failures: Vec<ReversalFailure>,
}

impl ReversalReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What `reverse` hands back: the per-item report plus the handle for the
/// asynchronous scope deletion still running at the backend.
#[derive(Debug, Clone)]
pub struct ReversalOutcome {
    pub report: ReversalReport,
    pub scope_deletion: DeletionHandle,
}

/// Result of re-querying the backend for a record's actual state after an
/// interrupted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub scope_present: bool,
    /// Logical roles whose recorded resources were found in the scope.
    pub present: Vec<String>,
    /// Logical roles whose recorded resources were not found.
    pub missing: Vec<String>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.scope_present && self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_collision_codes() {
        assert!(BackendError::new("Conflict", "name in use").is_name_collision());
        assert!(BackendError::new("AlreadyExists", "dup").is_name_collision());
        assert!(BackendError::new("ResourceAlreadyExists", "dup").is_name_collision());

        assert!(!BackendError::new("Quota", "limit reached").is_name_collision());
        assert!(!BackendError::new("conflict", "codes are case-sensitive").is_name_collision());
    }

    #[test]
    fn test_deployment_result_constructors() {
        let mut outputs = ParameterMap::new();
        outputs.insert("resourceGroupName".to_string(), "rg-pp-vnet".to_string());

        let ok = DeploymentResult::succeeded(outputs);
        assert!(ok.is_success());
        assert_eq!(ok.output("resourceGroupName"), Some("rg-pp-vnet"));
        assert_eq!(ok.output("absent"), None);
        assert!(ok.error.is_none());

        let failed = DeploymentResult::failed(BackendError::new("Quota", "limit reached"));
        assert!(!failed.is_success());
        assert!(failed.outputs.is_empty());
        assert_eq!(failed.error.as_ref().map(|e| e.code.as_str()), Some("Quota"));
    }

    #[test]
    fn test_scope_display() {
        let scope = Scope::new("sub-1", "rg-pp-vnet");
        assert_eq!(scope.to_string(), "sub-1/rg-pp-vnet");
    }

    #[test]
    fn test_serialization_golden() {
        let handle = ResourceHandle {
            resource_type: "enterprisePolicy".to_string(),
            name: "pp-vnet-policy-4821".to_string(),
            id: "/subscriptions/sub-1/resourceGroups/rg-pp-vnet/providers/enterprisePolicies/pp-vnet-policy-4821".to_string(),
            region: "westeurope".to_string(),
        };

        let json = serde_json::to_string(&handle).unwrap();

        // Golden test: verify exact JSON structure
        let expected = r#"{"resource_type":"enterprisePolicy","name":"pp-vnet-policy-4821","id":"/subscriptions/sub-1/resourceGroups/rg-pp-vnet/providers/enterprisePolicies/pp-vnet-policy-4821","region":"westeurope"}"#;
        assert_eq!(json, expected, "JSON structure changed - record compatibility broken");

        let deserialized: ResourceHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, handle);
    }

    #[test]
    fn test_reversal_report_is_clean() {
        let mut report = ReversalReport::default();
        assert!(report.is_clean());

        report.failures.push(ReversalFailure {
            handle: ResourceHandle {
                resource_type: "enterprisePolicy".to_string(),
                name: "pp-vnet-policy-1000".to_string(),
                id: "id-1".to_string(),
                region: "westeurope".to_string(),
            },
            error: BackendError::new("Locked", "resource lock present"),
        });
        assert!(!report.is_clean());
    }
}
