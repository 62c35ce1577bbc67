//! Core objects read or written by the plugin

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::{ObjectMeta, ObjectReference};

/// ConfigMap holding external values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMap {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Normal,
    Warning,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Normal => write!(f, "Normal"),
            EventType::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub component: String,
}

/// Core `v1.Event`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub involved_object: ObjectReference,

    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub message: String,

    /// `Normal` or `Warning`, kept as text so unknown types still parse
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub event_type: String,

    #[serde(default)]
    pub source: EventSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<Event>,
}
