//! `create` command

use tracing::info;

use helm_crds::HelmRequest;

use crate::app::options::{apply_config_map, CreateOptions};
use crate::app::wait::wait_for_sync;
use crate::errors::CaptainError;
use crate::kube::api::Cluster;
use crate::watch::{Clock, RequestAction, WatchTarget};

/// Build the HelmRequest `create` would submit
pub async fn build_request<C: Cluster>(
    cluster: &C,
    name: &str,
    namespace: &str,
    options: &CreateOptions,
) -> Result<HelmRequest, CaptainError> {
    let mut request = HelmRequest::new(name, namespace);
    request.spec.chart = options.chart.clone();
    request.spec.version = options.version.clone();

    if let Some(config_map) = &options.config_map {
        apply_config_map(cluster, namespace, config_map, &mut request.spec).await?;
    }

    request.spec.values = options.values.merge_values().await?;
    request.spec.namespace = namespace.to_string();
    options.source.apply(&mut request.spec)?;

    Ok(request)
}

/// Create a HelmRequest, then wait for it if asked to
pub async fn run<C: Cluster>(
    cluster: &C,
    clock: &dyn Clock,
    name: &str,
    namespace: &str,
    options: &CreateOptions,
) -> Result<HelmRequest, CaptainError> {
    let request = build_request(cluster, name, namespace, options).await?;
    let created = cluster.create_helm_request(&request).await?;
    info!("Create helmrequest: {}", created.id());

    if options.wait.wait {
        let target = WatchTarget::new(&created, RequestAction::Created, options.values.values.clone());
        wait_for_sync(cluster, clock, &target, &options.wait).await?;
    }

    Ok(created)
}
