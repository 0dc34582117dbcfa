//! Acting-principal resolution.
//!
//! Two strategies: the authenticated session may embed the principal
//! identifier directly (fast path, no directory round-trip), otherwise an
//! explicit identifier (email/UPN) is looked up through the backend's
//! identity service. Zero or multiple matches fail — the workflow never
//! guesses which principal to grant access to.

use crate::backend::ProvisioningBackend;
use crate::error::ProvisionError;
use crate::types::PrincipalId;
use tracing::debug;

/// A resolved principal plus how it was resolved.
///
/// `via_directory` tells the caller to wait out directory replication
/// (`WorkflowConfig::directory_settle`) before using the identifier in a
/// dependent operation — directory writes and reads are not immediately
/// consistent. The delay belongs to the caller; resolution itself never
/// sleeps.
#[derive(Debug, Clone)]
pub struct ResolvedPrincipal {
    pub id: PrincipalId,
    pub via_directory: bool,
}

/// Resolve the acting principal's stable identifier.
pub async fn resolve_principal<B: ProvisioningBackend>(
    backend: &B,
    explicit_identifier: Option<&str>,
) -> Result<ResolvedPrincipal, ProvisionError> {
    if let Some(id) = backend.current_principal().await? {
        debug!(%id, "principal embedded in session");
        return Ok(ResolvedPrincipal {
            id,
            via_directory: false,
        });
    }

    let identifier = explicit_identifier.ok_or_else(|| {
        ProvisionError::IdentityNotFound(
            "session carries no principal and no identifier was supplied".to_string(),
        )
    })?;

    let mut matches = backend.find_principals(identifier).await?;
    if matches.len() > 1 {
        return Err(ProvisionError::IdentityNotFound(format!(
            "identifier '{}' is ambiguous ({} matches)",
            identifier,
            matches.len()
        )));
    }

    match matches.pop() {
        Some(id) => {
            debug!(%id, identifier, "principal resolved via directory lookup");
            Ok(ResolvedPrincipal {
                id,
                via_directory: true,
            })
        }
        None => Err(ProvisionError::IdentityNotFound(format!(
            "no principal matches '{}'",
            identifier
        ))),
    }
}
