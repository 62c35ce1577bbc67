//! ConfigMap API

use async_trait::async_trait;

use helm_crds::{ConfigMap, ResourceId};

use crate::errors::CaptainError;
use crate::kube::api::ValueSourceStore;
use crate::kube::client::{collection_path, KubeClient};

#[async_trait]
impl ValueSourceStore for KubeClient {
    async fn get_config_map(&self, id: &ResourceId) -> Result<ConfigMap, CaptainError> {
        let path = format!("{}/{}", collection_path("v1", &id.namespace, "configmaps"), id.name);
        self.get(&path, &[]).await
    }
}
