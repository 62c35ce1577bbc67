//! Resource models

mod core;
mod helm_request;
mod meta;
mod release;

pub use self::core::{ConfigMap, Event, EventList, EventSource, EventType};
pub use helm_request::{
    ChartSource, ChartSourceHttp, ChartSourceOci, ConfigMapKeySelector, HelmRequest,
    HelmRequestPhase, HelmRequestSpec, HelmRequestStatus, ValuesFromSource,
};
pub use meta::{ObjectMeta, ObjectReference, ResourceId};
pub use release::{Release, ReleaseList, ReleaseSpec, ReleaseStatus};

/// API group/version served for the custom resources
pub const APP_API_VERSION: &str = "app.alauda.io/v1";

/// Configuration value tree
///
/// Nested mapping of string keys to scalars, sequences and further mappings.
pub type Values = serde_json::Map<String, serde_json::Value>;
