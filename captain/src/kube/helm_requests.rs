//! HelmRequest API

use async_trait::async_trait;

use helm_crds::{HelmRequest, HelmRequestStatus, ResourceId, APP_API_VERSION};

use crate::errors::CaptainError;
use crate::kube::api::{RequestStore, StatusAccessor};
use crate::kube::client::{collection_path, KubeClient};

fn helm_request_path(namespace: &str, name: &str) -> String {
    format!(
        "{}/{}",
        collection_path(APP_API_VERSION, namespace, "helmrequests"),
        name
    )
}

#[async_trait]
impl RequestStore for KubeClient {
    async fn get_helm_request(&self, id: &ResourceId) -> Result<HelmRequest, CaptainError> {
        self.get(&helm_request_path(&id.namespace, &id.name), &[])
            .await
            .map_err(|e| match e {
                CaptainError::NotFound(_) => {
                    CaptainError::NotFound(format!("helmrequest {} not found", id))
                }
                other => other,
            })
    }

    async fn create_helm_request(&self, request: &HelmRequest) -> Result<HelmRequest, CaptainError> {
        let path = collection_path(APP_API_VERSION, &request.metadata.namespace, "helmrequests");
        self.post(&path, request).await
    }

    async fn update_helm_request(&self, request: &HelmRequest) -> Result<HelmRequest, CaptainError> {
        let path = helm_request_path(&request.metadata.namespace, &request.metadata.name);
        self.put(&path, request).await
    }
}

#[async_trait]
impl StatusAccessor for KubeClient {
    async fn fetch_status(&self, id: &ResourceId) -> Result<HelmRequestStatus, CaptainError> {
        let request = self.get_helm_request(id).await?;
        Ok(request.status.unwrap_or_default())
    }

    async fn fetch_diagnostics(&self, id: &ResourceId) -> Result<Vec<String>, CaptainError> {
        let events = self.search_events(HelmRequest::KIND, id).await?;
        Ok(events.into_iter().map(|event| event.message).collect())
    }
}
