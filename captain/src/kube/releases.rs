//! Release API

use async_trait::async_trait;

use helm_crds::{Release, ReleaseList, ResourceId, APP_API_VERSION};

use crate::errors::CaptainError;
use crate::kube::api::ReleaseStore;
use crate::kube::client::{collection_path, KubeClient};

#[async_trait]
impl ReleaseStore for KubeClient {
    // there should be only one deployed release for each helmrequest
    async fn get_deployed_release(&self, id: &ResourceId) -> Result<Release, CaptainError> {
        let path = collection_path(APP_API_VERSION, &id.namespace, "releases");
        let selector = format!("name={},status=deployed", id.name);
        let list: ReleaseList = self.get(&path, &[("labelSelector", selector.as_str())]).await?;

        list.items
            .into_iter()
            .next()
            .ok_or_else(|| CaptainError::NotFound(format!("cannot find deployed release {}", id)))
    }
}
