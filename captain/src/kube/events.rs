//! Event API

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use helm_crds::{Event, EventList, EventSource, EventType, ObjectMeta, ObjectReference, ResourceId};

use crate::errors::CaptainError;
use crate::kube::api::EventSink;
use crate::kube::client::{collection_path, KubeClient};
use crate::utils::short_id;

/// Component recorded as the source of emitted events
pub const EVENT_COMPONENT: &str = "kubectl-captain";

impl KubeClient {
    /// Events recorded for an object, ordered as the API server returns them
    pub async fn search_events(&self, kind: &str, id: &ResourceId) -> Result<Vec<Event>, CaptainError> {
        let path = collection_path("v1", &id.namespace, "events");
        let selector = format!("involvedObject.kind={},involvedObject.name={}", kind, id.name);
        let list: EventList = self.get(&path, &[("fieldSelector", selector.as_str())]).await?;
        Ok(list.items)
    }
}

/// Build the event recorded about `subject`
pub fn new_event(
    event_type: EventType,
    reason: &str,
    message: &str,
    subject: &ObjectReference,
) -> Event {
    let now = Utc::now();
    Event {
        metadata: ObjectMeta::named(
            format!("{}.{}", subject.name, short_id()),
            subject.namespace.clone(),
        ),
        involved_object: subject.clone(),
        reason: reason.to_string(),
        message: message.to_string(),
        event_type: event_type.to_string(),
        source: EventSource {
            component: EVENT_COMPONENT.to_string(),
        },
        first_timestamp: Some(now),
        last_timestamp: Some(now),
    }
}

#[async_trait]
impl EventSink for KubeClient {
    async fn emit(
        &self,
        event_type: EventType,
        reason: &str,
        message: &str,
        subject: &ObjectReference,
    ) -> Result<(), CaptainError> {
        let event = new_event(event_type, reason, message, subject);
        debug!("Recording {} event {} for {}", event_type, reason, subject.id());

        let path = collection_path("v1", &subject.namespace, "events");
        let _: serde_json::Value = self.post(&path, &event).await?;
        Ok(())
    }
}
