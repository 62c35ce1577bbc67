//! Decoded release record

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use helm_crds::{ReleaseStatus, Values};

/// A previously deployed chart, as decoded from a stored release
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageRecord {
    pub name: String,
    pub namespace: String,
    pub version: i32,
    pub info: ReleaseInfo,
    pub chart: Chart,
    /// Values supplied by the user at deploy time
    pub config: Values,
    pub hooks: Vec<Hook>,
    /// Rendered manifest
    pub manifest: String,
}

/// Deployment bookkeeping copied from the stored release status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub first_deployed: Option<DateTime<Utc>>,
    pub last_deployed: Option<DateTime<Utc>>,
    pub deleted: Option<DateTime<Utc>>,
    pub description: String,
    pub status: String,
    pub notes: String,
}

impl From<&ReleaseStatus> for ReleaseInfo {
    fn from(status: &ReleaseStatus) -> Self {
        Self {
            first_deployed: status.first_deployed,
            last_deployed: status.last_deployed,
            deleted: status.deleted,
            description: status.description.clone(),
            status: status.status.clone(),
            notes: status.notes.clone(),
        }
    }
}

impl From<&ReleaseInfo> for ReleaseStatus {
    fn from(info: &ReleaseInfo) -> Self {
        Self {
            first_deployed: info.first_deployed,
            last_deployed: info.last_deployed,
            deleted: info.deleted,
            description: info.description.clone(),
            status: info.status.clone(),
            notes: info.notes.clone(),
        }
    }
}

/// Chart definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ChartMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub templates: Vec<ChartFile>,

    /// Default values shipped with the chart
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Values,

    #[serde(default, with = "bytes_base64")]
    pub schema: Vec<u8>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<ChartFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Fields not interpreted here (maintainers, dependencies, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A file inside the chart archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartFile {
    pub name: String,

    #[serde(default, with = "bytes_base64")]
    pub data: Vec<u8>,
}

/// Lifecycle hook descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub manifest: String,

    /// Events such as `pre-install` or `post-upgrade`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,

    #[serde(default)]
    pub last_run: HookExecution,

    #[serde(default)]
    pub weight: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete_policies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookExecution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phase: String,
}

/// Go encodes nil slices and maps as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Byte slices travel as standard base64 strings
mod bytes_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => STANDARD.decode(s).map_err(de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
