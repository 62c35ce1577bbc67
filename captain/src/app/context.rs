//! Cluster connection shared by the commands

use tracing::debug;

use helm_crds::ResourceId;

use crate::errors::CaptainError;
use crate::kube::{KubeClient, KubeconfigOptions, DEFAULT_NAMESPACE};

/// Client plus the namespace commands operate in
pub struct CaptainContext {
    pub client: KubeClient,
    pub namespace: String,
}

impl CaptainContext {
    /// Connect using the kubeconfig; `namespace` wins over the context's one
    pub async fn new(
        kubeconfig: &KubeconfigOptions,
        namespace: Option<String>,
    ) -> Result<Self, CaptainError> {
        let config = kubeconfig.load().await?;
        let namespace = namespace
            .filter(|ns| !ns.is_empty())
            .or_else(|| config.namespace.clone())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        debug!("Using cluster {} in namespace {}", config.server, namespace);

        Ok(Self {
            client: KubeClient::new(&config)?,
            namespace,
        })
    }

    /// Id of an object in the context namespace
    pub fn id(&self, name: &str) -> ResourceId {
        ResourceId::new(&self.namespace, name)
    }
}
