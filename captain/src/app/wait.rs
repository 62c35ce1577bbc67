//! Waiting for a request to be synced

use tracing::info;

use crate::app::options::WaitOptions;
use crate::errors::CaptainError;
use crate::kube::api::Cluster;
use crate::watch::{Clock, WatchTarget, Watcher};

/// Watch `target` until it settles
///
/// A failed watch surfaces as [`CaptainError::ReconcileError`] whose message
/// matches the event recorded on the request.
pub async fn wait_for_sync<C: Cluster>(
    cluster: &C,
    clock: &dyn Clock,
    target: &WatchTarget,
    options: &WaitOptions,
) -> Result<(), CaptainError> {
    let watcher = Watcher::new(cluster, cluster, clock, options.watch_options());

    match watcher.watch(target).await {
        Ok(()) => {
            info!("{}", target.describe(None));
            Ok(())
        }
        Err(e) => Err(CaptainError::ReconcileError {
            summary: target.describe(Some(&e)),
            source: e,
        }),
    }
}
