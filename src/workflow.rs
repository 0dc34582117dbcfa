//! Provisioning workflow engine.
//!
//! The orchestration logic that drives a run. It's dumb — it submits
//! deployments, checks outputs, and transitions phases. No storage,
//! no transport, no prompting. Just logic.

use crate::backend::ProvisioningBackend;
use crate::error::ProvisionError;
use crate::naming::UniqueName;
use crate::params::{DependentParameters, NETWORK_RESOURCE_TYPE};
use crate::state::{Phase, ProvisionRun};
use crate::store::ProvisioningRecord;
use crate::types::{
    BackendError, DeploymentRequest, DeploymentResult, ReconcileReport, ReversalFailure,
    ReversalOutcome, ReversalReport, Scope, TemplateRef,
};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Workflow configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Template the dependent (injection policy) deployment runs.
    pub dependent_template: TemplateRef,
    /// Resource type tag the dependent deployment creates; reversal
    /// enumerates by this tag rather than by recorded name.
    pub dependent_resource_type: String,
    /// Prefix for generated dependent-resource names.
    pub dependent_name_prefix: String,
    /// Max attempts when the generated name collides.
    pub max_name_attempts: u32,
    /// How long to wait after a directory-lookup principal resolution
    /// before the identifier is safe to use in a deployment.
    pub directory_settle: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            dependent_template: TemplateRef::new("vnet-injection-policy"),
            dependent_resource_type: "enterprisePolicy".to_string(),
            dependent_name_prefix: "pp-vnet-policy".to_string(),
            max_name_attempts: 3,
            directory_settle: Duration::from_secs(10), // directory replication lag
        }
    }
}

/// Options for [`ProvisionWorkflow::reverse`].
///
/// Confirmation of the destructive path is the caller's concern — the
/// workflow itself never prompts.
#[derive(Debug, Clone, Default)]
pub struct ReversalOptions {
    /// Delete dependent-type resources before removing the scope.
    pub include_dependent: bool,
}

/// The provisioning workflow engine.
///
/// Parameterized by the backend — you provide the implementation.
pub struct ProvisionWorkflow<'a, B: ProvisioningBackend> {
    backend: &'a B,
    config: WorkflowConfig,
}

impl<'a, B: ProvisioningBackend> ProvisionWorkflow<'a, B> {
    /// Create a new workflow engine.
    pub fn new(backend: &'a B, config: WorkflowConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Submit the run's base deployment and build the provisioning record
    /// from its outputs.
    ///
    /// Only callable on an idle run. A backend-reported failure is fatal to
    /// the run; a nominally successful result missing any required output
    /// surfaces [`ProvisionError::DeploymentIncomplete`] instead of a
    /// record with silently absent fields.
    pub async fn provision_base(
        &self,
        run: &mut ProvisionRun,
    ) -> Result<ProvisioningRecord, ProvisionError> {
        if !matches!(run.phase, Phase::Idle) {
            return Err(ProvisionError::InvalidState(format!(
                "provision_base requires an idle run, found {}",
                run.phase.name()
            )));
        }

        info!(template = %run.base_request.template, scope = %run.scope, "submitting base deployment");
        run.transition(Phase::BaseSubmitted);

        let result = match self.submit(&run.base_request).await {
            Ok(result) => result,
            Err(err) => {
                run.fail_base(err.to_string());
                return Err(err);
            }
        };

        if !result.is_success() {
            let backend_err = deployment_error(&result);
            run.fail_base(backend_err.to_string());
            return Err(ProvisionError::BaseDeploymentFailed(backend_err));
        }

        let record = match ProvisioningRecord::from_outputs(&result.outputs) {
            Ok(record) => record,
            Err(err) => {
                run.fail_base(err.to_string());
                return Err(err);
            }
        };

        run.base_result = Some(result);
        run.transition(Phase::BaseSucceeded);
        info!(resource_group = %record.resource_group_name, "base deployment succeeded");
        Ok(record)
    }

    /// Deploy the dependent resource under a freshly generated name,
    /// retrying on name collision up to the configured bound.
    ///
    /// Only reachable from a successful base deployment — anything else is
    /// a precondition error and never touches the backend. The record
    /// gains its dependent name only once the backend confirms success.
    pub async fn provision_dependent(
        &self,
        run: &mut ProvisionRun,
        record: &mut ProvisioningRecord,
    ) -> Result<UniqueName, ProvisionError> {
        if !matches!(run.phase, Phase::BaseSucceeded) {
            return Err(ProvisionError::InvalidState(format!(
                "provision_dependent requires a successful base deployment, found {}",
                run.phase.name()
            )));
        }
        if self.config.max_name_attempts == 0 {
            return Err(ProvisionError::Parameter(
                "max_name_attempts must be at least 1".to_string(),
            ));
        }

        let outputs = match &run.base_result {
            Some(result) => result.outputs.clone(),
            None => {
                return Err(ProvisionError::InvalidState(
                    "base result missing on a succeeded run".to_string(),
                ))
            }
        };

        run.transition(Phase::DependentSubmitted);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let name = UniqueName::generate(&self.config.dependent_name_prefix);
            let parameters = match DependentParameters::from_outputs(&outputs, &name) {
                Ok(params) => params.into_map(),
                Err(err) => {
                    run.fail_dependent(err.to_string());
                    return Err(err);
                }
            };
            let request = DeploymentRequest {
                template: self.config.dependent_template.clone(),
                scope: run.scope.clone(),
                parameters,
                timeout: run.base_request.timeout,
            };

            debug!(%name, attempt, "submitting dependent deployment");
            let result = match self.submit(&request).await {
                Ok(result) => result,
                Err(err) => {
                    run.fail_dependent(err.to_string());
                    return Err(err);
                }
            };

            if result.is_success() {
                record.dependent_resource_name = Some(name.to_string());
                run.transition(Phase::Complete);
                info!(%name, "dependent deployment succeeded");
                return Ok(name);
            }

            let backend_err = deployment_error(&result);
            if backend_err.is_name_collision() && attempt < self.config.max_name_attempts {
                warn!(%name, code = %backend_err.code, "generated name collided, retrying with a fresh name");
                continue;
            }

            run.fail_dependent(backend_err.to_string());
            return Err(ProvisionError::DependentDeploymentFailed(backend_err));
        }
    }

    /// Tear down provisioned resources.
    ///
    /// Dependent resources are enumerated by type tag — the record may be
    /// stale or absent, so name matching is not trusted. Per-item deletion
    /// failures are collected, never fatal to the rest of the pass. The
    /// scope deletion is asynchronous at the backend; the returned outcome
    /// carries its poll handle rather than blocking on completion.
    pub async fn reverse(
        &self,
        record: Option<&ProvisioningRecord>,
        scope: &Scope,
        options: &ReversalOptions,
    ) -> Result<ReversalOutcome, ProvisionError> {
        let mut report = ReversalReport::default();

        if options.include_dependent {
            let handles = self
                .backend
                .list_resources(scope, &self.config.dependent_resource_type)
                .await?;

            if let Some(recorded) = record.and_then(|r| r.dependent_resource_name.as_deref()) {
                if !handles.iter().any(|h| h.name == recorded) {
                    warn!(name = recorded, "recorded dependent resource not found in scope, record was stale");
                }
            }

            for handle in handles {
                match self.backend.delete_resource(&handle.id).await {
                    Ok(()) => {
                        info!(name = %handle.name, "deleted dependent resource");
                        report.deleted.push(handle);
                    }
                    Err(error) => {
                        warn!(name = %handle.name, %error, "failed to delete dependent resource");
                        report.failures.push(ReversalFailure { handle, error });
                    }
                }
            }
        }

        let scope_deletion = self.backend.delete_scope(scope).await?;
        info!(
            operation = %scope_deletion.operation_id,
            %scope,
            "scope deletion accepted, completing asynchronously"
        );

        Ok(ReversalOutcome {
            report,
            scope_deletion,
        })
    }

    /// Re-query the backend for a record's actual state.
    ///
    /// An interrupted run cannot assume its deployment failed; this checks
    /// scope existence and whether each recorded resource is still present
    /// (subnet ids are nested under their network's id, so prefix matching
    /// against the network listing covers both).
    pub async fn reconcile(
        &self,
        record: &ProvisioningRecord,
        scope: &Scope,
    ) -> Result<ReconcileReport, ProvisionError> {
        if !self.backend.scope_exists(scope).await? {
            return Ok(ReconcileReport {
                scope_present: false,
                present: Vec::new(),
                missing: record.base_resource_ids.keys().cloned().collect(),
            });
        }

        let networks = self
            .backend
            .list_resources(scope, NETWORK_RESOURCE_TYPE)
            .await?;
        let network_ids: HashSet<&str> = networks.iter().map(|h| h.id.as_str()).collect();

        let mut present = Vec::new();
        let mut missing = Vec::new();
        for (role, id) in &record.base_resource_ids {
            let found = network_ids.contains(id.as_str())
                || network_ids.iter().any(|nid| id.starts_with(nid));
            if found {
                present.push(role.clone());
            } else {
                missing.push(role.clone());
            }
        }

        Ok(ReconcileReport {
            scope_present: true,
            present,
            missing,
        })
    }

    /// Submit a deployment, applying the request's deadline if it has one.
    /// A deadline miss is reported distinctly from backend failures; a
    /// transport-level backend error is normalized into a failed result so
    /// both failure shapes take one code path.
    async fn submit(
        &self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentResult, ProvisionError> {
        let deploy = self.backend.deploy(request);
        let result = match request.timeout {
            Some(limit) => tokio::time::timeout(limit, deploy)
                .await
                .map_err(|_| ProvisionError::ProvisioningTimeout(limit))?,
            None => deploy.await,
        };

        Ok(match result {
            Ok(result) => result,
            Err(err) => DeploymentResult::failed(err),
        })
    }
}

/// Pull the structured error out of a non-success result, tolerating a
/// backend that failed without detail.
fn deployment_error(result: &DeploymentResult) -> BackendError {
    result.error.clone().unwrap_or_else(|| {
        BackendError::new("Unknown", "backend reported failure without detail")
    })
}
