//! Provisioning run state machine definition.
//!
//! The run is the complete snapshot of one provisioning attempt. It's
//! serializable and restorable; the workflow engine doesn't care how you
//! persist it.

use crate::types::{DeploymentRequest, DeploymentResult, Scope};
use serde::{Deserialize, Serialize};

/// Phases of a provisioning run — the state machine's nodes.
///
/// Base failure is terminal. Dependent failure is terminal too, but the
/// base resources it left behind stay valid and usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    /// Starting point.
    Idle,
    /// Base deployment handed to the backend.
    BaseSubmitted,
    /// Base deployment succeeded with all required outputs present.
    BaseSucceeded,
    /// Base deployment failed. Terminal.
    BaseFailed { reason: String },
    /// Dependent deployment handed to the backend.
    DependentSubmitted,
    /// Done.
    Complete,
    /// Dependent deployment failed. Terminal, base preserved.
    DependentFailed { reason: String },
}

impl Phase {
    /// Human-readable phase name for logging/display.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::BaseSubmitted => "base_submitted",
            Phase::BaseSucceeded => "base_succeeded",
            Phase::BaseFailed { .. } => "base_failed",
            Phase::DependentSubmitted => "dependent_submitted",
            Phase::Complete => "complete",
            Phase::DependentFailed { .. } => "dependent_failed",
        }
    }
}

/// Full run state — serializable, restorable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRun {
    /// Scope every backend call in this run targets.
    pub scope: Scope,
    /// Current phase.
    pub phase: Phase,
    /// The base deployment submission.
    pub base_request: DeploymentRequest,
    /// Base result, once the backend confirmed success.
    pub base_result: Option<DeploymentResult>,
    /// Unix timestamp of creation.
    pub created_at: u64,
    /// Unix timestamp of last update.
    pub updated_at: u64,
}

impl ProvisionRun {
    pub fn new(scope: Scope, base_request: DeploymentRequest) -> Self {
        let now = current_unix_time();

        Self {
            scope,
            phase: Phase::Idle,
            base_request,
            base_result: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Is this run in a terminal phase?
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.phase,
            Phase::Complete | Phase::BaseFailed { .. } | Phase::DependentFailed { .. }
        )
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    /// Transition to a new phase.
    pub fn transition(&mut self, phase: Phase) {
        self.phase = phase;
        self.updated_at = current_unix_time();
    }

    /// Fail the run before the base deployment completed.
    pub fn fail_base(&mut self, reason: impl Into<String>) {
        self.transition(Phase::BaseFailed {
            reason: reason.into(),
        });
    }

    /// Fail the dependent stage, preserving the base deployment.
    pub fn fail_dependent(&mut self, reason: impl Into<String>) {
        self.transition(Phase::DependentFailed {
            reason: reason.into(),
        });
    }
}

pub(crate) fn current_unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParameterMap, TemplateRef};

    fn make_run() -> ProvisionRun {
        let scope = Scope::new("sub-1", "rg-pp-vnet");
        let request = DeploymentRequest {
            template: TemplateRef::new("dual-region-vnet"),
            scope: scope.clone(),
            parameters: ParameterMap::new(),
            timeout: None,
        };
        ProvisionRun::new(scope, request)
    }

    #[test]
    fn test_new_run() {
        let run = make_run();
        assert!(matches!(run.phase, Phase::Idle));
        assert!(run.base_result.is_none());
        assert!(!run.is_terminal());
    }

    #[test]
    fn test_terminal_phases() {
        let mut run = make_run();
        run.transition(Phase::BaseSubmitted);
        assert!(!run.is_terminal());

        run.fail_base("quota exceeded");
        assert!(run.is_terminal());
        assert!(!run.is_complete());
        assert_eq!(run.phase.name(), "base_failed");

        let mut run = make_run();
        run.transition(Phase::Complete);
        assert!(run.is_terminal());
        assert!(run.is_complete());
    }

    #[test]
    fn test_dependent_failure_is_terminal_but_named() {
        let mut run = make_run();
        run.transition(Phase::BaseSucceeded);
        run.transition(Phase::DependentSubmitted);
        run.fail_dependent("policy rejected");

        assert!(run.is_terminal());
        match &run.phase {
            Phase::DependentFailed { reason } => assert_eq!(reason, "policy rejected"),
            other => panic!("unexpected phase {:?}", other),
        }
    }
}
