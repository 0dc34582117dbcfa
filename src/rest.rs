//! REST adapter for resource-manager-style provisioning APIs.
//!
//! Implements [`ProvisioningBackend`] over HTTP. The wire shapes are the
//! generic resource-manager ones: deployments are PUT under the scope,
//! resources are listed/deleted by identifier, scope deletion returns an
//! accepted operation id, and the identity service lives under
//! `/identity`. Service errors are expected as a JSON `{"error": {code,
//! message}}` body; anything less structured degrades to the HTTP status.

use crate::backend::ProvisioningBackend;
use crate::types::{
    BackendError, DeletionHandle, DeploymentRequest, DeploymentResult, DeploymentStatus,
    ParameterMap, PrincipalId, ResourceHandle, Scope,
};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HTTP implementation of [`ProvisioningBackend`].
pub struct RestBackend {
    base_url: String,
    client: Client,
}

#[derive(Serialize)]
struct DeployBody<'a> {
    template: &'a str,
    parameters: &'a ParameterMap,
}

#[derive(Deserialize)]
struct DeployResponse {
    status: DeploymentStatus,
    #[serde(default)]
    outputs: ParameterMap,
    #[serde(default)]
    error: Option<BackendError>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: BackendError,
}

#[derive(Deserialize)]
struct OperationAccepted {
    operation_id: String,
}

#[derive(Deserialize)]
struct PrincipalDto {
    id: String,
}

impl RestBackend {
    /// Create a backend against a base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn scope_url(&self, scope: &Scope) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}",
            self.base_url, scope.subscription_id, scope.resource_group
        )
    }

    /// Map a non-success response to the service's structured error,
    /// falling back to the bare HTTP status.
    async fn service_error(response: Response) -> BackendError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => BackendError::new(
                status.as_str(),
                format!("backend returned HTTP {}", status),
            ),
        }
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    BackendError::new("Transport", err.to_string())
}

impl ProvisioningBackend for RestBackend {
    async fn deploy(
        &self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentResult, BackendError> {
        let url = format!(
            "{}/deployments/{}",
            self.scope_url(&request.scope),
            request.template
        );
        debug!(%url, "submitting deployment");

        let body = DeployBody {
            template: request.template.as_str(),
            parameters: &request.parameters,
        };
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }

        let parsed: DeployResponse = response.json().await.map_err(transport_error)?;
        Ok(DeploymentResult {
            status: parsed.status,
            outputs: parsed.outputs,
            error: parsed.error,
        })
    }

    async fn list_resources(
        &self,
        scope: &Scope,
        resource_type: &str,
    ) -> Result<Vec<ResourceHandle>, BackendError> {
        let url = format!("{}/resources", self.scope_url(scope));
        let response = self
            .client
            .get(&url)
            .query(&[("type", resource_type)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }

        response.json().await.map_err(transport_error)
    }

    async fn delete_resource(&self, id: &str) -> Result<(), BackendError> {
        let url = format!("{}/resources", self.base_url);
        let response = self
            .client
            .delete(&url)
            .query(&[("id", id)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Ok(())
    }

    async fn resource_exists(
        &self,
        scope: &Scope,
        resource_type: &str,
        name: &str,
    ) -> Result<bool, BackendError> {
        let url = format!(
            "{}/resources/{}/{}",
            self.scope_url(scope),
            resource_type,
            name
        );
        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::service_error(response).await),
        }
    }

    async fn scope_exists(&self, scope: &Scope) -> Result<bool, BackendError> {
        let url = self.scope_url(scope);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::service_error(response).await),
        }
    }

    async fn delete_scope(&self, scope: &Scope) -> Result<DeletionHandle, BackendError> {
        let url = self.scope_url(scope);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }

        let accepted: OperationAccepted = response.json().await.map_err(transport_error)?;
        Ok(DeletionHandle {
            operation_id: accepted.operation_id,
        })
    }

    async fn current_principal(&self) -> Result<Option<PrincipalId>, BackendError> {
        let url = format!("{}/identity/me", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        match response.status() {
            status if status.is_success() => {
                let dto: PrincipalDto = response.json().await.map_err(transport_error)?;
                Ok(Some(PrincipalId::new(dto.id)))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::service_error(response).await),
        }
    }

    async fn find_principals(&self, identifier: &str) -> Result<Vec<PrincipalId>, BackendError> {
        let url = format!("{}/identity/principals", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("identifier", identifier)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }

        let dtos: Vec<PrincipalDto> = response.json().await.map_err(transport_error)?;
        Ok(dtos.into_iter().map(|d| PrincipalId::new(d.id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = RestBackend::new("http://localhost:8080/");
        let scope = Scope::new("sub-1", "rg-pp-vnet");
        assert_eq!(
            backend.scope_url(&scope),
            "http://localhost:8080/subscriptions/sub-1/resourceGroups/rg-pp-vnet"
        );
    }
}
