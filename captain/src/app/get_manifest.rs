//! `get-manifest` command

use tracing::debug;

use helm_crds::{HelmRequest, ResourceId};

use crate::errors::CaptainError;
use crate::kube::api::Cluster;
use crate::release::decode_release;

/// Release a request deploys: `spec.releaseName` in `spec.namespace`, each
/// falling back to the request's own name and namespace
pub fn release_id(request: &HelmRequest) -> ResourceId {
    let name = match request.spec.release_name.as_str() {
        "" => request.metadata.name.as_str(),
        name => name,
    };
    let namespace = match request.spec.namespace.as_str() {
        "" => request.metadata.namespace.as_str(),
        namespace => namespace,
    };
    ResourceId::new(namespace, name)
}

/// Rendered manifest of the release currently deployed for a request
pub async fn run<C: Cluster>(cluster: &C, id: &ResourceId) -> Result<String, CaptainError> {
    let request = cluster.get_helm_request(id).await?;
    let release_id = release_id(&request);
    debug!("Looking up deployed release {} of helmrequest {}", release_id, id);

    let release = cluster.get_deployed_release(&release_id).await?;
    let record = decode_release(&release)?;
    Ok(record.manifest)
}
