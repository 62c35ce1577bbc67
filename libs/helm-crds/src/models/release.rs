//! Release resource, the stored record of a deployed chart

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;

/// Stored release
///
/// The `*_data` fields of the spec are independently encoded payloads, see
/// the release codec in the plugin crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ReleaseSpec,

    #[serde(default)]
    pub status: ReleaseStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: i32,

    #[serde(default)]
    pub chart_data: String,

    #[serde(default)]
    pub config_data: String,

    #[serde(default)]
    pub hooks_data: String,

    #[serde(default)]
    pub manifest_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_deployed: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deployed: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Release status such as `deployed` or `superseded`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseList {
    #[serde(default)]
    pub items: Vec<Release>,
}
