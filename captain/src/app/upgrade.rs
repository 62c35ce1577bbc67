//! `upgrade` command

use chrono::Utc;
use tracing::{debug, info};

use helm_crds::{HelmRequest, ResourceId};

use crate::app::options::{apply_config_map, UpgradeOptions};
use crate::app::wait::wait_for_sync;
use crate::errors::CaptainError;
use crate::kube::api::Cluster;
use crate::values::merge_values;
use crate::watch::{Clock, RequestAction, WatchTarget};

/// Annotation holding the spec as it was before the upgrade
pub const LAST_SPEC_ANNOTATION: &str = "last-spec";

/// Annotation touched on every upgrade so the controller resyncs
pub const RESYNC_ANNOTATION: &str = "kubectl-captain.resync";

/// Replace the repo part of a `<repo>/<chart>` reference
pub fn rewrite_repo(chart: &str, repo: &str) -> Result<String, CaptainError> {
    let (_, name) = chart.split_once('/').ok_or_else(|| {
        CaptainError::ConfigError(format!(
            "chart {chart} has no repo part, expected <repo>/<chart>"
        ))
    })?;
    Ok(format!("{repo}/{name}"))
}

/// Apply the upgrade options to `request` in place
pub async fn apply<C: Cluster>(
    cluster: &C,
    request: &mut HelmRequest,
    options: &UpgradeOptions,
) -> Result<(), CaptainError> {
    let old = serde_json::to_string(&request.spec)?;
    let annotations = &mut request.metadata.annotations;
    annotations.insert(LAST_SPEC_ANNOTATION.to_string(), old);
    annotations.insert(RESYNC_ANNOTATION.to_string(), Utc::now().to_rfc3339());

    if let Some(version) = options.version.as_deref().filter(|v| !v.is_empty()) {
        request.spec.version = version.to_string();
    }

    if let Some(repo) = options.repo.as_deref().filter(|r| !r.is_empty()) {
        request.spec.chart = rewrite_repo(&request.spec.chart, repo)?;
    }

    if let Some(config_map) = &options.config_map {
        let namespace = request.metadata.namespace.clone();
        apply_config_map(cluster, &namespace, config_map, &mut request.spec).await?;
    }

    let values = options.values.merge_values().await?;
    request.spec.values = if options.replace_values {
        values
    } else {
        merge_values(&request.spec.values, &values)
    };

    options.source.apply(&mut request.spec)?;
    Ok(())
}

/// Update a HelmRequest, then wait for it if asked to
pub async fn run<C: Cluster>(
    cluster: &C,
    clock: &dyn Clock,
    id: &ResourceId,
    options: &UpgradeOptions,
) -> Result<HelmRequest, CaptainError> {
    let mut request = cluster.get_helm_request(id).await?;
    apply(cluster, &mut request, options).await?;
    debug!("Updating helmrequest {} to {:?}", id, request.spec);

    let updated = cluster.update_helm_request(&request).await?;
    info!("Updated helmrequest: {}", updated.id());

    if options.wait.wait {
        let target = WatchTarget::new(&updated, RequestAction::Updated, options.values.values.clone());
        wait_for_sync(cluster, clock, &target, &options.wait).await?;
    }

    Ok(updated)
}
