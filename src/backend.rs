//! The One Trait: ProvisioningBackend
//!
//! This is the single abstraction point for all external dependencies.
//! The workflow engine is pure logic — it doesn't know about REST,
//! vendor SDKs, or token plumbing. That's YOUR problem when you
//! implement this trait.

use crate::types::{
    BackendError, DeletionHandle, DeploymentRequest, DeploymentResult, PrincipalId, ResourceHandle,
    Scope,
};
use std::future::Future;

/// The single trait consumers implement to use the provisioning workflow.
///
/// Abstracts:
/// - Template deployments at resource-group scope
/// - Resource enumeration and deletion
/// - Scope (resource-group) existence and cascading deletion
/// - Identity-service lookups for the acting principal
///
/// Contract notes:
/// - `deploy` is synchronous in the workflow's sense — it returns the
///   final state or an error, never an in-flight handle.
/// - `delete_scope` is asynchronous at the backend; callers poll the
///   returned handle.
/// - `list_resources` ordering is unspecified. Don't rely on it.
pub trait ProvisioningBackend: Send + Sync {
    // ═══════════════════════════════════════════════════════════════
    // DEPLOYMENTS
    // ═══════════════════════════════════════════════════════════════

    /// Execute a named template against the request's scope.
    ///
    /// `Err` is a transport-level failure; a deployment the backend
    /// accepted but which did not succeed comes back as an `Ok` result
    /// with `Failed`/`Canceled` status and a populated `error` field.
    fn deploy(
        &self,
        request: &DeploymentRequest,
    ) -> impl Future<Output = Result<DeploymentResult, BackendError>> + Send;

    // ═══════════════════════════════════════════════════════════════
    // RESOURCES
    // ═══════════════════════════════════════════════════════════════

    /// Enumerate resources of a type within a scope.
    fn list_resources(
        &self,
        scope: &Scope,
        resource_type: &str,
    ) -> impl Future<Output = Result<Vec<ResourceHandle>, BackendError>> + Send;

    /// Delete a single resource by its backend-assigned identifier.
    fn delete_resource(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Whether a named resource of a type exists within a scope.
    fn resource_exists(
        &self,
        scope: &Scope,
        resource_type: &str,
        name: &str,
    ) -> impl Future<Output = Result<bool, BackendError>> + Send;

    // ═══════════════════════════════════════════════════════════════
    // SCOPES
    // ═══════════════════════════════════════════════════════════════

    /// Whether the scope container itself exists.
    fn scope_exists(
        &self,
        scope: &Scope,
    ) -> impl Future<Output = Result<bool, BackendError>> + Send;

    /// Delete the scope container and everything in it. Long-running and
    /// asynchronous at the backend — returns a handle to poll, not a
    /// completion.
    fn delete_scope(
        &self,
        scope: &Scope,
    ) -> impl Future<Output = Result<DeletionHandle, BackendError>> + Send;

    // ═══════════════════════════════════════════════════════════════
    // IDENTITY
    // ═══════════════════════════════════════════════════════════════

    /// Principal identifier embedded in the current authenticated session,
    /// if the session carries one. No directory round-trip.
    fn current_principal(
        &self,
    ) -> impl Future<Output = Result<Option<PrincipalId>, BackendError>> + Send;

    /// Query the identity service for principals matching an identifier
    /// such as an email/UPN.
    fn find_principals(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Vec<PrincipalId>, BackendError>> + Send;
}
