//! In-memory cluster used by the integration tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use captain::errors::CaptainError;
use captain::kube::{EventSink, ReleaseStore, RequestStore, StatusAccessor, ValueSourceStore};
use helm_crds::{
    ConfigMap, EventType, HelmRequest, HelmRequestPhase, HelmRequestStatus, ObjectMeta,
    ObjectReference, Release, ResourceId,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
    pub subject: ResourceId,
}

#[derive(Default)]
struct State {
    requests: HashMap<ResourceId, HelmRequest>,
    config_maps: HashMap<ResourceId, ConfigMap>,
    releases: HashMap<ResourceId, Release>,
    /// Scripted fetch results; the last one repeats once the script runs out
    phases: VecDeque<Result<HelmRequestPhase, String>>,
    last_phase: Option<Result<HelmRequestPhase, String>>,
    fetches: usize,
    diagnostics: Option<Vec<String>>,
    events: Vec<RecordedEvent>,
    fail_events: bool,
}

#[derive(Default)]
pub struct InMemoryCluster {
    state: Mutex<State>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phases(phases: Vec<HelmRequestPhase>) -> Self {
        let cluster = Self::new();
        cluster.script(phases.into_iter().map(Ok).collect());
        cluster
    }

    pub fn script(&self, phases: Vec<Result<HelmRequestPhase, String>>) {
        let mut state = self.state.lock().unwrap();
        state.phases = phases.into();
    }

    pub fn set_diagnostics(&self, messages: Option<Vec<String>>) {
        self.state.lock().unwrap().diagnostics = messages;
    }

    pub fn fail_events(&self) {
        self.state.lock().unwrap().fail_events = true;
    }

    pub fn insert_request(&self, request: HelmRequest) {
        self.state
            .lock()
            .unwrap()
            .requests
            .insert(request.id(), request);
    }

    pub fn request(&self, id: &ResourceId) -> Option<HelmRequest> {
        self.state.lock().unwrap().requests.get(id).cloned()
    }

    pub fn insert_config_map(&self, namespace: &str, name: &str) {
        let config_map = ConfigMap {
            metadata: ObjectMeta::named(name, namespace),
            data: [("values.yaml".to_string(), "a: b\n".to_string())].into(),
        };
        self.state
            .lock()
            .unwrap()
            .config_maps
            .insert(ResourceId::new(namespace, name), config_map);
    }

    /// Store `release` as the deployed release of `id`
    pub fn insert_release(&self, id: ResourceId, release: Release) {
        self.state.lock().unwrap().releases.insert(id, release);
    }

    pub fn fetches(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().unwrap().events.clone()
    }
}

#[async_trait]
impl StatusAccessor for InMemoryCluster {
    async fn fetch_status(&self, id: &ResourceId) -> Result<HelmRequestStatus, CaptainError> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;

        let next = match state.phases.pop_front() {
            Some(next) => {
                state.last_phase = Some(next.clone());
                next
            }
            None => state
                .last_phase
                .clone()
                .unwrap_or(Ok(HelmRequestPhase::Pending)),
        };

        match next {
            Ok(phase) => Ok(HelmRequestStatus {
                phase,
                ..Default::default()
            }),
            Err(message) => Err(CaptainError::ApiError {
                status: 500,
                body: format!("{id}: {message}"),
            }),
        }
    }

    async fn fetch_diagnostics(&self, id: &ResourceId) -> Result<Vec<String>, CaptainError> {
        self.state
            .lock()
            .unwrap()
            .diagnostics
            .clone()
            .ok_or_else(|| CaptainError::NotFound(format!("events of {id}")))
    }
}

#[async_trait]
impl RequestStore for InMemoryCluster {
    async fn get_helm_request(&self, id: &ResourceId) -> Result<HelmRequest, CaptainError> {
        self.request(id)
            .ok_or_else(|| CaptainError::NotFound(format!("helmrequest {id} not found")))
    }

    async fn create_helm_request(&self, request: &HelmRequest) -> Result<HelmRequest, CaptainError> {
        let mut state = self.state.lock().unwrap();
        if state.requests.contains_key(&request.id()) {
            return Err(CaptainError::ApiError {
                status: 409,
                body: "already exists".to_string(),
            });
        }
        state.requests.insert(request.id(), request.clone());
        Ok(request.clone())
    }

    async fn update_helm_request(&self, request: &HelmRequest) -> Result<HelmRequest, CaptainError> {
        let mut state = self.state.lock().unwrap();
        if !state.requests.contains_key(&request.id()) {
            return Err(CaptainError::NotFound(format!(
                "helmrequest {} not found",
                request.id()
            )));
        }
        state.requests.insert(request.id(), request.clone());
        Ok(request.clone())
    }
}

#[async_trait]
impl ValueSourceStore for InMemoryCluster {
    async fn get_config_map(&self, id: &ResourceId) -> Result<ConfigMap, CaptainError> {
        self.state
            .lock()
            .unwrap()
            .config_maps
            .get(id)
            .cloned()
            .ok_or_else(|| CaptainError::NotFound(format!("configmap {id}")))
    }
}

#[async_trait]
impl ReleaseStore for InMemoryCluster {
    async fn get_deployed_release(&self, id: &ResourceId) -> Result<Release, CaptainError> {
        self.state
            .lock()
            .unwrap()
            .releases
            .get(id)
            .cloned()
            .ok_or_else(|| CaptainError::NotFound(format!("cannot find deployed release {id}")))
    }
}

#[async_trait]
impl EventSink for InMemoryCluster {
    async fn emit(
        &self,
        event_type: EventType,
        reason: &str,
        message: &str,
        subject: &ObjectReference,
    ) -> Result<(), CaptainError> {
        let mut state = self.state.lock().unwrap();
        // recorded even when failing, so tests can count attempts
        state.events.push(RecordedEvent {
            event_type,
            reason: reason.to_string(),
            message: message.to_string(),
            subject: subject.id(),
        });
        if state.fail_events {
            return Err(CaptainError::ApiError {
                status: 403,
                body: "events is forbidden".to_string(),
            });
        }
        Ok(())
    }
}
