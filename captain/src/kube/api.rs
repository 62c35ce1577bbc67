//! Collaborator traits over the cluster API
//!
//! Commands and the watcher only see these traits, so tests can run them
//! against in-memory stores.

use async_trait::async_trait;

use helm_crds::{
    ConfigMap, EventType, HelmRequest, HelmRequestStatus, ObjectReference, Release, ResourceId,
};

use crate::errors::CaptainError;

/// Reads the controller-reported state of a HelmRequest
#[async_trait]
pub trait StatusAccessor: Send + Sync {
    /// Current status; a request with no status yet reads as pending
    async fn fetch_status(&self, id: &ResourceId) -> Result<HelmRequestStatus, CaptainError>;

    /// Event messages recorded for the request, oldest first
    async fn fetch_diagnostics(&self, id: &ResourceId) -> Result<Vec<String>, CaptainError>;
}

/// Create, update and read HelmRequests
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn get_helm_request(&self, id: &ResourceId) -> Result<HelmRequest, CaptainError>;

    async fn create_helm_request(&self, request: &HelmRequest) -> Result<HelmRequest, CaptainError>;

    async fn update_helm_request(&self, request: &HelmRequest) -> Result<HelmRequest, CaptainError>;
}

/// Source of externally stored values
#[async_trait]
pub trait ValueSourceStore: Send + Sync {
    async fn get_config_map(&self, id: &ResourceId) -> Result<ConfigMap, CaptainError>;
}

/// Stored releases
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// The single release of `id` labelled as deployed
    async fn get_deployed_release(&self, id: &ResourceId) -> Result<Release, CaptainError>;
}

/// Records events about a HelmRequest
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(
        &self,
        event_type: EventType,
        reason: &str,
        message: &str,
        subject: &ObjectReference,
    ) -> Result<(), CaptainError>;
}

/// Everything the commands need from the cluster
pub trait Cluster: RequestStore + ValueSourceStore + ReleaseStore + StatusAccessor + EventSink {}

impl<T> Cluster for T where
    T: RequestStore + ValueSourceStore + ReleaseStore + StatusAccessor + EventSink
{
}
