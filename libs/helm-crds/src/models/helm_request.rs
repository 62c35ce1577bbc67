//! HelmRequest resource

use serde::{Deserialize, Serialize};

use super::meta::{ObjectMeta, ObjectReference, ResourceId};
use super::{Values, APP_API_VERSION};

/// Desired deployment of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmRequest {
    pub api_version: String,

    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: HelmRequestSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<HelmRequestStatus>,
}

impl HelmRequest {
    pub const KIND: &'static str = "HelmRequest";

    /// Create an empty request with the given identity
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_version: APP_API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata: ObjectMeta::named(name, namespace),
            spec: HelmRequestSpec::default(),
            status: None,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.metadata.id()
    }

    /// Current phase, `Pending` when the controller has not reported yet
    pub fn phase(&self) -> HelmRequestPhase {
        self.status
            .as_ref()
            .map(|s| s.phase.clone())
            .unwrap_or_default()
    }

    /// Reference used as the subject of events
    pub fn object_reference(&self) -> ObjectReference {
        ObjectReference {
            // the API server leaves kind empty on some responses
            kind: Self::KIND.to_string(),
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
            uid: self.metadata.uid.clone(),
            api_version: APP_API_VERSION.to_string(),
            resource_version: self.metadata.resource_version.clone(),
        }
    }
}

/// HelmRequest spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmRequestSpec {
    /// Release name, defaults to the request name when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_name: String,

    /// Chart reference, `<repo>/<chart>`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chart: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Namespace the release is installed into
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values_from: Vec<ValuesFromSource>,

    #[serde(default, skip_serializing_if = "Values::is_empty")]
    pub values: Values,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ChartSource>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// External source of values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesFromSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<ConfigMapKeySelector>,
}

/// Selects a key of a ConfigMap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapKeySelector {
    pub name: String,

    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// Where the chart is fetched from when not a chart repo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<ChartSourceHttp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci: Option<ChartSourceOci>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSourceHttp {
    pub url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSourceOci {
    pub repo: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_ref: String,
}

/// Lifecycle phase reported by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelmRequestPhase {
    #[default]
    Pending,

    /// Controller is installing or upgrading
    Syncing,

    Synced,

    Failed,

    /// Anything this client does not know about
    #[serde(other)]
    Unknown,
}

impl HelmRequestPhase {
    /// Whether the controller has stopped working on the request
    pub fn is_terminal(&self) -> bool {
        matches!(self, HelmRequestPhase::Synced | HelmRequestPhase::Failed)
    }
}

/// HelmRequest status, written only by the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmRequestStatus {
    #[serde(default)]
    pub phase: HelmRequestPhase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
